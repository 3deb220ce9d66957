//! Versioned binary point-cloud decoder.
//!
//! Decodes LAS files: a fixed signature, a version-selected header variant
//! and a format-selected stream of fixed-size point records. All decoding
//! is explicit field-by-field little-endian reads from byte buffers;
//! nothing relies on compiler struct layout.

pub mod header;
pub mod record;

use std::io::{Read, Seek, SeekFrom};

use crate::error::{CloudError, CloudResult};

pub use header::LasHeader;
pub use record::{PointRecord, parse_record};

/// The 4-byte ASCII magic leading every LAS file.
pub const FILE_SIGNATURE: &[u8; 4] = b"LASF";

pub(crate) fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(buf[offset..offset + 2].try_into().unwrap())
}

pub(crate) fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
}

pub(crate) fn read_u64(buf: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap())
}

pub(crate) fn read_f64(buf: &[u8], offset: usize) -> f64 {
    f64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap())
}

/// One fully decoded point: scaled coordinates plus the scalar
/// auxiliaries its record format carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub intensity: u16,
    pub classification: u8,
    pub return_number: u8,
    pub number_of_returns: u8,
    pub gps_time: Option<f64>,
    pub color: Option<[u16; 3]>,
    pub nir: Option<u16>,
}

/// Streaming LAS decoder over any seekable byte source.
///
/// Construction runs the validation state machine: signature, version
/// probe at the fixed offset, variant-sized header read with the
/// self-reported size check, record format dispatch, then a seek to the
/// declared point-data offset. Iteration yields scaled points in file
/// order.
#[derive(Debug)]
pub struct LasReader<R: Read + Seek> {
    reader: R,
    header: LasHeader,
    record_buf: Vec<u8>,
    records_read: u64,
}

impl<R: Read + Seek> LasReader<R> {
    pub fn new(mut reader: R) -> CloudResult<Self> {
        // (1) Signature.
        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature)?;
        if &signature != FILE_SIGNATURE {
            return Err(CloudError::InvalidSignature { found: signature });
        }

        // (2) Version probe at the fixed offset; the header variant cannot
        // be chosen before these two bytes are known.
        reader.seek(SeekFrom::Start(header::VERSION_OFFSET))?;
        let mut version = [0u8; 2];
        reader.read_exact(&mut version)?;
        let (major, minor) = (version[0], version[1]);

        let expected = match (major, minor) {
            (1, minor) => header::expected_size(minor),
            _ => None,
        }
        .ok_or(CloudError::UnsupportedVersion { major, minor })?;

        // (3) Rewind and read the whole variant, checking the header's own
        // opinion of its size.
        reader.seek(SeekFrom::Start(0))?;
        let mut header_buf = vec![0u8; usize::from(expected)];
        reader.read_exact(&mut header_buf)?;
        let header = LasHeader::parse(&header_buf)?;

        let layout = record::layout_length(header.point_format)
            .ok_or(CloudError::UnsupportedPointFormat {
                format: header.point_format,
            })?;
        if header.record_length < layout {
            return Err(CloudError::RecordLengthTooShort {
                format: header.point_format,
                expected: layout,
                got: header.record_length,
            });
        }

        if header.number_of_point_records == 0 {
            return Err(CloudError::EmptyCloud);
        }

        // (4) Position on the first record.
        reader.seek(SeekFrom::Start(u64::from(header.offset_to_point_data)))?;

        let record_buf = vec![0u8; usize::from(header.record_length)];
        Ok(Self {
            reader,
            header,
            record_buf,
            records_read: 0,
        })
    }

    pub fn header(&self) -> &LasHeader {
        &self.header
    }

    /// Records decoded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Iterator over the remaining point records.
    pub fn points(&mut self) -> Points<'_, R> {
        Points { reader: self }
    }

    /// (5) Read and decode the next record, applying
    /// `raw * scale + offset` per axis.
    fn read_point(&mut self) -> Option<CloudResult<CloudPoint>> {
        if self.records_read >= self.header.number_of_point_records {
            return None;
        }

        if let Err(e) = self.reader.read_exact(&mut self.record_buf) {
            let error = if e.kind() == std::io::ErrorKind::UnexpectedEof {
                CloudError::UnexpectedEof {
                    records_read: self.records_read,
                    records_expected: self.header.number_of_point_records,
                }
            } else {
                CloudError::Io(e)
            };
            // Poison further iteration; the stream position is undefined.
            self.records_read = self.header.number_of_point_records;
            return Some(Err(error));
        }

        let record = parse_record(self.header.point_format, &self.record_buf);
        self.records_read += 1;

        let [sx, sy, sz] = self.header.scale;
        let [ox, oy, oz] = self.header.offset;

        Some(Ok(CloudPoint {
            x: f64::from(record.raw_x) * sx + ox,
            y: f64::from(record.raw_y) * sy + oy,
            z: f64::from(record.raw_z) * sz + oz,
            intensity: record.intensity,
            classification: record.classification,
            return_number: record.return_number,
            number_of_returns: record.number_of_returns,
            gps_time: record.gps_time,
            color: record.rgb,
            nir: record.nir,
        }))
    }
}

/// Borrowing iterator returned by [`LasReader::points`].
pub struct Points<'a, R: Read + Seek> {
    reader: &'a mut LasReader<R>,
}

impl<R: Read + Seek> Iterator for Points<'_, R> {
    type Item = CloudResult<CloudPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_point()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.reader.header.number_of_point_records - self.reader.records_read;
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::io::Cursor;

    fn synthetic_file(minor: u8, raw_points: &[[i32; 3]]) -> Vec<u8> {
        let mut file = synthetic_header(minor, raw_points.len() as u64, 0);
        for &raw in raw_points {
            push_format0_record(&mut file, raw);
        }
        file
    }

    #[test]
    fn scale_and_offset_round_trip() {
        let file = synthetic_file(2, &[[150, -250, 5000]]);
        let mut reader = LasReader::new(Cursor::new(file)).unwrap();
        let point = reader.points().next().unwrap().unwrap();

        // raw * scale + offset, independently per axis.
        assert_eq!(point.x, 150.0 * 0.01 + 1000.0);
        assert_eq!(point.y, -250.0 * 0.01 + 2000.0);
        assert_eq!(point.z, 5000.0 * 0.01 + 100.0);
    }

    #[test]
    fn all_declared_records_are_decoded() {
        let file = synthetic_file(2, &[[0, 0, 0], [1, 1, 1], [2, 2, 2]]);
        let mut reader = LasReader::new(Cursor::new(file)).unwrap();

        let points: CloudResult<Vec<_>> = reader.points().collect();
        assert_eq!(points.unwrap().len(), 3);
        assert_eq!(reader.records_read(), 3);
    }

    #[test]
    fn bad_signature_fails_before_header_read() {
        let mut file = synthetic_file(2, &[[0, 0, 0]]);
        file[0..4].copy_from_slice(b"XXXX");

        let err = LasReader::new(Cursor::new(file)).unwrap_err();
        assert!(matches!(
            err,
            CloudError::InvalidSignature { found: [b'X', b'X', b'X', b'X'] }
        ));
    }

    #[test]
    fn major_version_2_is_rejected() {
        let mut file = synthetic_file(2, &[[0, 0, 0]]);
        file[24] = 2;

        let err = LasReader::new(Cursor::new(file)).unwrap_err();
        assert!(matches!(
            err,
            CloudError::UnsupportedVersion { major: 2, minor: 2 }
        ));
    }

    #[test]
    fn minor_version_5_is_rejected() {
        let mut file = synthetic_file(2, &[[0, 0, 0]]);
        file[25] = 5;

        let err = LasReader::new(Cursor::new(file)).unwrap_err();
        assert!(matches!(
            err,
            CloudError::UnsupportedVersion { major: 1, minor: 5 }
        ));
    }

    #[test]
    fn header_size_off_by_one_is_rejected() {
        let mut file = synthetic_file(2, &[[0, 0, 0]]);
        write_u16_at(&mut file, 94, 228);

        let err = LasReader::new(Cursor::new(file)).unwrap_err();
        assert!(matches!(err, CloudError::HeaderSizeMismatch { .. }));
    }

    #[test]
    fn record_format_11_is_rejected() {
        let mut file = synthetic_file(2, &[[0, 0, 0]]);
        file[104] = 11;

        let err = LasReader::new(Cursor::new(file)).unwrap_err();
        assert!(matches!(
            err,
            CloudError::UnsupportedPointFormat { format: 11 }
        ));
    }

    #[test]
    fn zero_records_is_an_empty_cloud() {
        let file = synthetic_file(2, &[]);
        let err = LasReader::new(Cursor::new(file)).unwrap_err();
        assert!(matches!(err, CloudError::EmptyCloud));
    }

    #[test]
    fn truncated_stream_reports_progress() {
        let mut file = synthetic_file(2, &[[0, 0, 0], [1, 1, 1]]);
        // Chop the final record in half.
        file.truncate(file.len() - 10);

        let mut reader = LasReader::new(Cursor::new(file)).unwrap();
        let results: Vec<_> = reader.points().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(CloudError::UnexpectedEof {
                records_read: 1,
                records_expected: 2,
            })
        ));
    }

    #[test]
    fn extra_record_bytes_are_skipped() {
        let mut file = synthetic_header(2, 2, 0);
        // Four user bytes after every 20-byte format-0 layout.
        write_u16_at(&mut file, 105, 24);
        for raw in [[10, 0, 0], [20, 0, 0]] {
            push_format0_record(&mut file, raw);
            file.extend_from_slice(&[0xAB; 4]);
        }

        let mut reader = LasReader::new(Cursor::new(file)).unwrap();
        let points: Vec<_> = reader.points().map(Result::unwrap).collect();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].x, 20.0 * 0.01 + 1000.0);
    }

    #[test]
    fn record_shorter_than_layout_is_rejected() {
        let mut file = synthetic_header(2, 1, 1);
        // Format 1 needs 28 bytes; the header claims 20.
        write_u16_at(&mut file, 105, 20);

        let err = LasReader::new(Cursor::new(file)).unwrap_err();
        assert!(matches!(
            err,
            CloudError::RecordLengthTooShort {
                format: 1,
                expected: 28,
                got: 20,
            }
        ));
    }

    #[test]
    fn v1_4_file_decodes_format_6_records() {
        let mut file = synthetic_header(4, 1, 6);
        // One format-6 record: coordinates, widened returns, gps time.
        let mut rec = Vec::new();
        for axis in [100i32, 200, 300] {
            rec.extend_from_slice(&axis.to_le_bytes());
        }
        rec.extend_from_slice(&5u16.to_le_bytes()); // intensity
        rec.push(0b0010_0001); // return 1 of 2
        rec.push(0); // flags
        rec.push(6); // classification: building
        rec.push(0); // user data
        rec.extend_from_slice(&0i16.to_le_bytes());
        rec.extend_from_slice(&0u16.to_le_bytes());
        rec.extend_from_slice(&77.0f64.to_le_bytes());
        assert_eq!(rec.len(), 30);
        file.extend_from_slice(&rec);

        let mut reader = LasReader::new(Cursor::new(file)).unwrap();
        assert_eq!(reader.header().version_minor, 4);

        let point = reader.points().next().unwrap().unwrap();
        assert_eq!(point.classification, 6);
        assert_eq!(point.return_number, 1);
        assert_eq!(point.number_of_returns, 2);
        assert_eq!(point.gps_time, Some(77.0));
    }
}
