//! Segmented record heaps and the cursor over packed records.
//!
//! A heap is a sequence of segments, each a flat array of fixed-stride
//! records. Addresses are dereferenced with bounds checks on both parts;
//! the returned cursor performs byte-wise little-endian reads (the records
//! are packed and unaligned, so raw pointer reinterpretation is off the
//! table).

use byteorder::{ByteOrder, LittleEndian};

use super::address::Address;
use super::error::{DataCenterError, Result};

/// One contiguous array of fixed-stride records.
#[derive(Debug)]
struct Segment {
    bytes: Vec<u8>,
    count: usize,
}

/// A collection of fixed-stride segments addressed by `(segment, element)`.
#[derive(Debug)]
pub struct SegmentedHeap {
    kind: &'static str,
    stride: usize,
    segments: Vec<Segment>,
}

impl SegmentedHeap {
    /// Create an empty heap. `kind` names the heap in error messages.
    pub fn new(kind: &'static str, stride: usize) -> Self {
        assert!(stride > 0, "record stride must be non-zero");
        SegmentedHeap {
            kind,
            stride,
            segments: Vec::new(),
        }
    }

    /// Append a segment. The record count is derived from the byte length;
    /// a trailing partial record means the loader broke its contract.
    pub fn push_segment(&mut self, bytes: Vec<u8>) -> Result<()> {
        if bytes.len() % self.stride != 0 {
            return Err(DataCenterError::InvalidImage(format!(
                "{} heap segment of {} bytes is not a multiple of the {}-byte stride",
                self.kind,
                bytes.len(),
                self.stride
            )));
        }
        let count = bytes.len() / self.stride;
        self.segments.push(Segment { bytes, count });
        Ok(())
    }

    /// A cursor positioned at the first byte of the record at `address`.
    pub fn reader_at(&self, address: Address) -> Result<HeapCursor<'_>> {
        let segment = self
            .segments
            .get(address.segment as usize)
            .ok_or_else(|| self.out_of_bounds(address))?;
        let index = address.element as usize;
        if index >= segment.count {
            return Err(self.out_of_bounds(address));
        }
        let start = index * self.stride;
        Ok(HeapCursor {
            record: &segment.bytes[start..start + self.stride],
            pos: 0,
        })
    }

    /// The `OutOfBounds` error for `address` against this heap's shape.
    pub(crate) fn out_of_bounds(&self, address: Address) -> DataCenterError {
        let records = self
            .segments
            .get(address.segment as usize)
            .map(|s| s.count)
            .unwrap_or(0);
        DataCenterError::OutOfBounds {
            heap: self.kind,
            address,
            segments: self.segments.len(),
            records,
        }
    }

    /// Bytes per record.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total number of records across all segments.
    pub fn record_count(&self) -> usize {
        self.segments.iter().map(|s| s.count).sum()
    }
}

/// Cursor positioned inside one record of a segmented heap.
///
/// Reads are little-endian and advance the position. The slice is exactly
/// one record long; reading past its end is a programmer error, since every
/// parser here consumes a fixed layout that fits the stride.
#[derive(Debug)]
pub struct HeapCursor<'a> {
    record: &'a [u8],
    pos: usize,
}

impl<'a> HeapCursor<'a> {
    pub fn read_u16(&mut self) -> u16 {
        let v = LittleEndian::read_u16(&self.record[self.pos..]);
        self.pos += 2;
        v
    }

    pub fn read_i32(&mut self) -> i32 {
        let v = LittleEndian::read_i32(&self.record[self.pos..]);
        self.pos += 4;
        v
    }

    pub fn read_u32(&mut self) -> u32 {
        let v = LittleEndian::read_u32(&self.record[self.pos..]);
        self.pos += 4;
        v
    }

    /// Consume 4 bytes as an address: segment index first, then element
    /// index, both little-endian.
    pub fn read_address(&mut self) -> Address {
        let segment = self.read_u16();
        let element = self.read_u16();
        Address::new(segment, element)
    }

    /// Move the position back `n` bytes. Needed when a 4-byte primitive
    /// turns out to be an address and must be re-read as one.
    pub fn rewind(&mut self, n: usize) {
        assert!(n <= self.pos, "rewind past record start");
        self.pos -= n;
    }
}
