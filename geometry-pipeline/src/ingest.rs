//! Point cloud ingestion orchestrating decode, sampling and normalization.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use constants::{NORMALIZED_EXTENT, PROGRESS_UPDATE_INTERVAL};
use indicatif::{ProgressBar, ProgressStyle};

use crate::bounds::CloudBounds;
use crate::cloud::PointCloud;
use crate::error::{CloudError, CloudResult};
use crate::las::LasReader;

/// Decoded, normalized cloud plus everything the caller may want to report.
#[derive(Debug)]
pub struct IngestOutcome {
    /// Normalized points, ready to become a point-only mesh.
    pub cloud: PointCloud,
    /// Bounding box of the decoded coordinates before normalization.
    pub raw_bounds: CloudBounds,
    /// Decode and sampling statistics.
    pub stats: IngestStats,
}

/// Ingestion statistics tracker.
/// Counts record totals, sampling results and colour availability.
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub total_records: u64,
    pub loaded_points: usize,
    pub colour_points: usize,
    pub sampling_ratio: f64,
}

/// Loads a binary point cloud file into a normalized point set.
/// Owns path validation, progress reporting and the sampling policy.
#[derive(Debug)]
pub struct CloudIngestor {
    cloud_path: PathBuf,
    max_points: Option<usize>,
}

impl CloudIngestor {
    /// Create an ingestor after validating the source path.
    pub fn new<P: AsRef<Path>>(path: P) -> CloudResult<Self> {
        let cloud_path = path.as_ref().to_path_buf();

        if !cloud_path.exists() {
            return Err(CloudError::FileNotFound { path: cloud_path });
        }
        if !cloud_path.is_file() {
            return Err(CloudError::NotAFile { path: cloud_path });
        }

        Ok(Self {
            cloud_path,
            max_points: None,
        })
    }

    /// Cap the number of loaded points; the decoder then subsamples the
    /// stream evenly instead of truncating its tail.
    pub fn with_point_cap(mut self, max_points: usize) -> Self {
        self.max_points = Some(max_points);
        self
    }

    /// Executes the full ingestion pipeline: decode, sample, normalize.
    pub fn ingest(&self) -> CloudResult<IngestOutcome> {
        let file = File::open(&self.cloud_path)?;
        let mut reader = LasReader::new(BufReader::new(file))?;

        self.log_file_info(&reader);

        let total_records = reader.header().number_of_point_records;
        let sampling_ratio = match self.max_points {
            Some(cap) if (total_records as usize) > cap => cap as f64 / total_records as f64,
            _ => 1.0,
        };
        if sampling_ratio < 1.0 {
            println!(
                "Sampling ratio: {:.3} ({:.1}% of points)",
                sampling_ratio,
                sampling_ratio * 100.0
            );
        }

        let pb = ProgressBar::new(total_records);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} points ({percent}%) {msg}")
                .unwrap()
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Decoding points");

        let mut stats = IngestStats {
            total_records,
            sampling_ratio,
            ..IngestStats::default()
        };
        let mut points = Vec::new();
        let mut expected_loaded = 0.0;

        for (record_idx, point_result) in reader.points().enumerate() {
            if record_idx % PROGRESS_UPDATE_INTERVAL == 0 {
                pb.set_position(record_idx as u64);
            }

            let point = point_result?;
            expected_loaded += sampling_ratio;

            // Skip records until the sampling ratio earns the next slot.
            if (stats.loaded_points as f64) >= expected_loaded {
                continue;
            }
            if let Some(cap) = self.max_points
                && stats.loaded_points >= cap
            {
                continue;
            }

            if point.color.is_some() {
                stats.colour_points += 1;
            }
            points.push([point.x, point.y, point.z]);
            stats.loaded_points += 1;
        }
        pb.finish_with_message("Points decoded");

        let mut cloud = PointCloud::new(points);
        let raw_bounds = cloud.normalize()?;

        self.print_bounds(&raw_bounds);
        self.print_stats(&stats);

        Ok(IngestOutcome {
            cloud,
            raw_bounds,
            stats,
        })
    }

    /// Ingestion summary as JSON for manifests and debugging.
    pub fn metadata(&self, outcome: &IngestOutcome) -> serde_json::Value {
        let bounds = &outcome.raw_bounds;
        serde_json::json!({
            "source": self.cloud_path.display().to_string(),
            "total_records": outcome.stats.total_records,
            "loaded_points": outcome.stats.loaded_points,
            "sampling_ratio": outcome.stats.sampling_ratio,
            "has_colour": outcome.stats.colour_points > 0,
            "colour_points": outcome.stats.colour_points,
            "normalized_extent": NORMALIZED_EXTENT,
            "bounds": {
                "min_x": bounds.min_x, "max_x": bounds.max_x,
                "min_y": bounds.min_y, "max_y": bounds.max_y,
                "min_z": bounds.min_z, "max_z": bounds.max_z
            }
        })
    }

    /// Log file structure information for debugging.
    fn log_file_info<R: std::io::Read + std::io::Seek>(&self, reader: &LasReader<R>) {
        let header = reader.header();

        println!("Point cloud file information:");
        println!("  File: {}", self.cloud_path.display());
        println!(
            "  Version: {}.{}",
            header.version_major, header.version_minor
        );
        println!("  Points: {}", header.number_of_point_records);
        println!("  Point format: {}", header.point_format);
        println!(
            "  Scale factors: X={}, Y={}, Z={}",
            header.scale[0], header.scale[1], header.scale[2]
        );
        println!(
            "  Offsets: X={}, Y={}, Z={}",
            header.offset[0], header.offset[1], header.offset[2]
        );
    }

    /// Print decoded coordinate bounds for verification.
    fn print_bounds(&self, bounds: &CloudBounds) {
        println!("Decoded bounds:");
        println!("  X: {:.2} to {:.2}", bounds.min_x, bounds.max_x);
        println!("  Y: {:.2} to {:.2}", bounds.min_y, bounds.max_y);
        println!(
            "  Z: {:.2} to {:.2} (elevation)",
            bounds.min_z, bounds.max_z
        );
    }

    /// Print ingestion statistics.
    fn print_stats(&self, stats: &IngestStats) {
        println!("Ingestion complete:");
        println!(
            "  Loaded: {} of {} records",
            stats.loaded_points, stats.total_records
        );
        if stats.colour_points > 0 {
            println!(
                "  Colour points: {} ({:.1}%)",
                stats.colour_points,
                (stats.colour_points as f32 / stats.loaded_points as f32) * 100.0
            );
        }
    }
}
