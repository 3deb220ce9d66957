//! Error types for mesh construction and point-cloud decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for mesh construction and model import.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised while building a mesh or importing a text model.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Model file not found.
    #[error("model file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Degenerate tangent-space computation: the triangle's texture
    /// coordinates are colinear, so the UV determinant is zero.
    #[error("degenerate triangle: colinear texture coordinates (zero UV determinant)")]
    DegenerateUv,

    /// A face line referencing fewer than three vertices.
    #[error("line {line}: face with {count} vertex references, at least 3 required")]
    FaceTooShort {
        /// 1-based source line number.
        line: usize,
        /// Number of vertex references found.
        count: usize,
    },

    /// A face token referencing an attribute entry that was never declared.
    #[error("line {line}: {table} reference {index} out of range (have {len})")]
    IndexOutOfRange {
        /// 1-based source line number.
        line: usize,
        /// Which attribute table was dereferenced.
        table: &'static str,
        /// The 1-based index found on the face line.
        index: usize,
        /// Entries available in that table.
        len: usize,
    },

    /// A line that matched a known tag but failed to tokenize.
    #[error("line {line}: {message}")]
    MalformedLine {
        /// 1-based source line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for point-cloud decoding.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors raised while decoding a binary point-cloud file.
#[derive(Debug, Error)]
pub enum CloudError {
    /// Cloud file not found.
    #[error("point cloud file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Path exists but is not a regular file.
    #[error("not a file: {path}")]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// The leading 4-byte signature was not `LASF`.
    #[error("invalid file signature {found:?}, expected \"LASF\"")]
    InvalidSignature {
        /// The bytes actually read.
        found: [u8; 4],
    },

    /// Version outside the recognized 1.0-1.4 range.
    #[error("unsupported version {major}.{minor}, supported versions are 1.0 through 1.4")]
    UnsupportedVersion {
        /// Major version byte.
        major: u8,
        /// Minor version byte.
        minor: u8,
    },

    /// The header's self-reported size disagrees with its version's layout.
    #[error("header size mismatch: version {major}.{minor} headers are {expected} bytes, header claims {got}")]
    HeaderSizeMismatch {
        /// Major version byte.
        major: u8,
        /// Minor version byte.
        minor: u8,
        /// Size the layout requires.
        expected: u16,
        /// Size the header reported.
        got: u16,
    },

    /// Point record format byte outside the recognized 0-10 range.
    #[error("unsupported point record format {format}, supported formats are 0 through 10")]
    UnsupportedPointFormat {
        /// The format byte found in the header.
        format: u8,
    },

    /// The header's declared record length is shorter than the format's
    /// fixed layout.
    #[error("record length {got} shorter than the {expected}-byte layout of format {format}")]
    RecordLengthTooShort {
        /// The format byte found in the header.
        format: u8,
        /// Bytes the layout requires.
        expected: u16,
        /// Bytes the header declared per record.
        got: u16,
    },

    /// The file ended before the declared record count was read.
    #[error("unexpected end of file after {records_read} of {records_expected} records")]
    UnexpectedEof {
        /// Records successfully decoded.
        records_read: u64,
        /// Records the header promised.
        records_expected: u64,
    },

    /// Decoding finished with no points.
    #[error("point cloud contains no points")]
    EmptyCloud,

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
