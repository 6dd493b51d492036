//! Error types for the data center reader.

use thiserror::Error;

use super::address::Address;

/// The primary error type for all operations in this crate.
///
/// Structural variants carry the offending index, address, or name so the
/// message pinpoints the corrupt record. The enum is `Clone` (the image is
/// memory-resident, so no variant wraps an I/O error), which lets lazy
/// realization cells cache a structural error and replay it on every access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataCenterError {
    /// An element or attribute record referenced a name index outside the
    /// name table. Indices are 1-based on disk; 0 marks a placeholder and
    /// is invalid for attributes.
    #[error("name index {index} out of range (valid range 1..={len})")]
    BadNameIndex { index: u16, len: usize },

    /// An element's extension word referenced a descriptor outside the
    /// element-extension table.
    #[error("extension index {index} out of range (table holds {len} descriptors)")]
    BadExtensionIndex { index: u16, len: usize },

    /// The low 4 bits of an element's extension word must be zero.
    #[error("non-zero extension flags {flags:#x} in element record at {address}")]
    NonZeroFlags { address: Address, flags: u16 },

    /// An attribute's packed type word does not decode to a known type.
    #[error("unknown type encoding (type {type_code}, ext {ext_code}) for attribute \"{name}\"")]
    UnknownTypeCode {
        name: String,
        type_code: u16,
        ext_code: u16,
    },

    /// Two attribute records of one element share the same name.
    #[error("duplicate attribute \"{name}\" on element \"{element}\"")]
    DuplicateAttribute { element: String, name: String },

    /// A string-typed attribute's address is absent from the value table.
    #[error("no string value at address {address}")]
    MissingValue { address: Address },

    /// The loader handed over an image that violates its contract.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// An address referenced a record outside its heap.
    #[error("address {address} out of bounds in {heap} heap ({segments} segments, {records} records in target segment)")]
    OutOfBounds {
        heap: &'static str,
        address: Address,
        segments: usize,
        records: usize,
    },

    /// An operation was attempted on a closed data center.
    #[error("data center has been closed")]
    UseAfterDispose,

    /// `close` was attempted while the data center is frozen.
    #[error("data center is frozen and cannot be closed")]
    FrozenViolation,
}

/// A convenience `Result` type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, DataCenterError>;
