//! LAS header decoding.
//!
//! Five header variants are recognized, selected by the minor version
//! byte. Each is a fixed-size little-endian block read from offset 0:
//!
//! ```text
//! offset  size  field
//!      0     4  file signature "LASF"
//!      4     2  file source id          (reserved before 1.1)
//!      6     2  global encoding         (reserved before 1.2)
//!      8    16  project GUID
//!     24     1  version major
//!     25     1  version minor
//!     26    32  system identifier
//!     58    32  generating software
//!     90     2  file creation day of year
//!     92     2  file creation year
//!     94     2  header size
//!     96     4  offset to point data
//!    100     4  number of VLRs
//!    104     1  point data record format
//!    105     2  point data record length
//!    107     4  legacy number of point records
//!    111    20  legacy number of points by return (5 × u32)
//!    131    24  x/y/z scale factor (3 × f64)
//!    155    24  x/y/z offset (3 × f64)
//!    179    48  max x, min x, max y, min y, max z, min z (6 × f64)
//!                                        total 227 bytes, versions 1.0-1.2
//!    227     8  start of waveform data packet record
//!                                        total 235 bytes, version 1.3
//!    235     8  start of first EVLR
//!    243     4  number of EVLRs
//!    247     8  number of point records
//!    255   120  number of points by return (15 × u64)
//!                                        total 375 bytes, version 1.4
//! ```

use crate::error::{CloudError, CloudResult};

use super::{read_f64, read_u16, read_u32, read_u64};

/// Header length of the 1.0-1.2 layout.
pub const HEADER_SIZE_V1_2: u16 = 227;
/// Header length of the 1.3 layout.
pub const HEADER_SIZE_V1_3: u16 = 235;
/// Header length of the 1.4 layout.
pub const HEADER_SIZE_V1_4: u16 = 375;

/// Fixed byte offset of the two version bytes.
pub const VERSION_OFFSET: u64 = 24;

/// Expected header length for a recognized minor version.
pub fn expected_size(minor: u8) -> Option<u16> {
    match minor {
        0..=2 => Some(HEADER_SIZE_V1_2),
        3 => Some(HEADER_SIZE_V1_3),
        4 => Some(HEADER_SIZE_V1_4),
        _ => None,
    }
}

/// Decoded header metadata, normalized across the five variants.
#[derive(Debug, Clone)]
pub struct LasHeader {
    pub file_source_id: u16,
    pub global_encoding: u16,
    pub guid: [u8; 16],
    pub version_major: u8,
    pub version_minor: u8,
    pub system_identifier: String,
    pub generating_software: String,
    pub file_creation_day: u16,
    pub file_creation_year: u16,
    pub header_size: u16,
    pub offset_to_point_data: u32,
    pub number_of_vlrs: u32,
    pub point_format: u8,
    pub record_length: u16,
    /// Point count, taken from the 64-bit field on 1.4 headers and the
    /// legacy 32-bit field otherwise.
    pub number_of_point_records: u64,
    pub scale: [f64; 3],
    pub offset: [f64; 3],
    pub max: [f64; 3],
    pub min: [f64; 3],
    /// 1.3 and later.
    pub waveform_data_start: Option<u64>,
    /// 1.4 only.
    pub first_evlr_offset: Option<u64>,
    /// 1.4 only.
    pub number_of_evlrs: Option<u32>,
}

impl LasHeader {
    /// Decode a header from its full variant-sized byte block.
    ///
    /// The caller has already validated the signature and version and read
    /// exactly the variant's expected length; this checks that the
    /// header's self-reported size agrees, which defends against
    /// format-version mismatches.
    pub fn parse(buf: &[u8]) -> CloudResult<Self> {
        let version_major = buf[24];
        let version_minor = buf[25];

        let expected = expected_size(version_minor).ok_or(CloudError::UnsupportedVersion {
            major: version_major,
            minor: version_minor,
        })?;

        let header_size = read_u16(buf, 94);
        if header_size != expected {
            return Err(CloudError::HeaderSizeMismatch {
                major: version_major,
                minor: version_minor,
                expected,
                got: header_size,
            });
        }

        let mut guid = [0u8; 16];
        guid.copy_from_slice(&buf[8..24]);

        let legacy_count = u64::from(read_u32(buf, 107));
        let (waveform_data_start, first_evlr_offset, number_of_evlrs, number_of_point_records) =
            match version_minor {
                3 => (Some(read_u64(buf, 227)), None, None, legacy_count),
                4 => {
                    let extended_count = read_u64(buf, 247);
                    let count = if extended_count != 0 {
                        extended_count
                    } else {
                        legacy_count
                    };
                    (
                        Some(read_u64(buf, 227)),
                        Some(read_u64(buf, 235)),
                        Some(read_u32(buf, 243)),
                        count,
                    )
                }
                _ => (None, None, None, legacy_count),
            };

        Ok(Self {
            file_source_id: read_u16(buf, 4),
            global_encoding: read_u16(buf, 6),
            guid,
            version_major,
            version_minor,
            system_identifier: read_padded_string(&buf[26..58]),
            generating_software: read_padded_string(&buf[58..90]),
            file_creation_day: read_u16(buf, 90),
            file_creation_year: read_u16(buf, 92),
            header_size,
            offset_to_point_data: read_u32(buf, 96),
            number_of_vlrs: read_u32(buf, 100),
            point_format: buf[104],
            record_length: read_u16(buf, 105),
            number_of_point_records,
            scale: [read_f64(buf, 131), read_f64(buf, 139), read_f64(buf, 147)],
            offset: [read_f64(buf, 155), read_f64(buf, 163), read_f64(buf, 171)],
            max: [read_f64(buf, 179), read_f64(buf, 195), read_f64(buf, 211)],
            min: [read_f64(buf, 187), read_f64(buf, 203), read_f64(buf, 219)],
            waveform_data_start,
            first_evlr_offset,
            number_of_evlrs,
        })
    }
}

/// NUL-padded fixed-width ASCII field.
fn read_padded_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .to_string()
}
