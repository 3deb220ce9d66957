//! Point record layouts.
//!
//! Eleven fixed-size little-endian layouts, selected by the header's
//! format byte. Every format leads with the same three signed 32-bit raw
//! coordinates; the auxiliary fields after them differ per format:
//!
//! ```text
//! format  length  after the 14-byte coordinate+intensity prefix
//!      0      20  flags, classification, scan angle, user data, source id
//!      1      28  format 0 + GPS time
//!      2      26  format 0 + RGB
//!      3      34  format 1 + RGB
//!      4      57  format 1 + wave packet
//!      5      63  format 3 + wave packet
//!      6      30  extended flag pair, classification, user data,
//!                 scan angle (i16), source id, GPS time
//!      7      36  format 6 + RGB
//!      8      38  format 7 + NIR
//!      9      59  format 6 + wave packet
//!     10      67  format 8 + wave packet
//! ```
//!
//! Formats 0-5 pack return number (3 bits), number of returns (3 bits),
//! scan direction (1 bit) and edge-of-flight (1 bit) into the byte at
//! offset 14. Formats 6-10 widen the return fields to 4 bits each in the
//! byte at offset 14 and move classification flags (4 bits), scanner
//! channel (2 bits), scan direction and edge-of-flight into offset 15.
//! Wave-packet fields are not decoded; this pipeline only needs the
//! coordinates and the scalar auxiliaries.

use super::{read_f64, read_u16};

/// Fixed record length per format byte.
pub const RECORD_LENGTHS: [u16; 11] = [20, 28, 26, 34, 57, 63, 30, 36, 38, 59, 67];

/// Layout length for a format byte, `None` for formats above 10.
pub fn layout_length(format: u8) -> Option<u16> {
    RECORD_LENGTHS.get(usize::from(format)).copied()
}

/// One decoded point record before coordinate scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord {
    pub raw_x: i32,
    pub raw_y: i32,
    pub raw_z: i32,
    pub intensity: u16,
    pub return_number: u8,
    pub number_of_returns: u8,
    pub scan_direction: bool,
    pub edge_of_flight_line: bool,
    pub classification: u8,
    /// Formats 6-10.
    pub classification_flags: Option<u8>,
    /// Formats 6-10.
    pub scanner_channel: Option<u8>,
    /// Formats 1, 3-10.
    pub gps_time: Option<f64>,
    /// Formats 2, 3, 5, 7, 8, 10.
    pub rgb: Option<[u16; 3]>,
    /// Formats 8 and 10.
    pub nir: Option<u16>,
}

fn read_i32(buf: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
}

fn read_rgb(buf: &[u8], offset: usize) -> [u16; 3] {
    [
        read_u16(buf, offset),
        read_u16(buf, offset + 2),
        read_u16(buf, offset + 4),
    ]
}

/// Decode one record of a recognized format.
///
/// `buf` must hold at least the format's layout length; trailing extra
/// bytes (user-defined per-point data) are ignored.
pub fn parse_record(format: u8, buf: &[u8]) -> PointRecord {
    debug_assert!(usize::from(format) < RECORD_LENGTHS.len());

    let raw_x = read_i32(buf, 0);
    let raw_y = read_i32(buf, 4);
    let raw_z = read_i32(buf, 8);
    let intensity = read_u16(buf, 12);

    if format <= 5 {
        let flags = buf[14];
        let gps_time = match format {
            1 | 3 | 4 | 5 => Some(read_f64(buf, 20)),
            _ => None,
        };
        let rgb = match format {
            2 => Some(read_rgb(buf, 20)),
            3 | 5 => Some(read_rgb(buf, 28)),
            _ => None,
        };

        PointRecord {
            raw_x,
            raw_y,
            raw_z,
            intensity,
            return_number: flags & 0b0000_0111,
            number_of_returns: (flags >> 3) & 0b0000_0111,
            scan_direction: flags & 0b0100_0000 != 0,
            edge_of_flight_line: flags & 0b1000_0000 != 0,
            classification: buf[15],
            classification_flags: None,
            scanner_channel: None,
            gps_time,
            rgb,
            nir: None,
        }
    } else {
        let returns = buf[14];
        let flags = buf[15];
        let rgb = match format {
            7 | 8 | 10 => Some(read_rgb(buf, 30)),
            _ => None,
        };
        let nir = match format {
            8 | 10 => Some(read_u16(buf, 36)),
            _ => None,
        };

        PointRecord {
            raw_x,
            raw_y,
            raw_z,
            intensity,
            return_number: returns & 0b0000_1111,
            number_of_returns: (returns >> 4) & 0b0000_1111,
            scan_direction: flags & 0b0100_0000 != 0,
            edge_of_flight_line: flags & 0b1000_0000 != 0,
            classification: buf[16],
            classification_flags: Some(flags & 0b0000_1111),
            scanner_channel: Some((flags >> 4) & 0b0000_0011),
            gps_time: Some(read_f64(buf, 22)),
            rgb,
            nir,
        }
    }
}
