//! Reader for the "data center" binary container.
//!
//! A data center ships a large read-mostly dataset as a segmented heap of
//! fixed-stride records with two-part cross-segment addresses, interned
//! name and string-value tables, and type information packed into 16-bit
//! words. This crate consumes the already-decompressed byte image produced
//! by a loader and exposes a lazily materialized tree of named elements
//! with typed attributes and structural queries (ancestors, siblings,
//! children, descendants).
//!
//! ```no_run
//! # use std::collections::HashMap;
//! use datacenter_reader::{
//!     DataCenter, DataCenterImage, ExtensionTable, NameTable, SegmentedHeap, ValueTable,
//!     ATTRIBUTE_STRIDE, ELEMENT_STRIDE,
//! };
//!
//! # fn main() -> datacenter_reader::Result<()> {
//! # let (element_bytes, attribute_bytes) = (Vec::new(), Vec::new());
//! let mut elements = SegmentedHeap::new("element", ELEMENT_STRIDE);
//! elements.push_segment(element_bytes)?;
//! let mut attributes = SegmentedHeap::new("attribute", ATTRIBUTE_STRIDE);
//! attributes.push_segment(attribute_bytes)?;
//!
//! let center = DataCenter::new(DataCenterImage {
//!     elements,
//!     attributes,
//!     names: NameTable::new(vec!["Settings".into(), "volume".into()]),
//!     values: ValueTable::new(HashMap::new()),
//!     extensions: ExtensionTable::new(vec![]),
//! })?;
//!
//! let root = center.root()?;
//! for child in root.children_named("Settings") {
//!     let child = child?;
//!     println!("volume = {:?}", child.attr("volume")?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod datacenter;

pub use datacenter::{
    Address, Ancestors, AttributeMap, AttributeValue, Children, DataCenter, DataCenterError,
    DataCenterImage, Descendants, Element, ExtensionDescriptor, ExtensionTable, HeapCursor,
    NameTable, Result, SegmentedHeap, Siblings, ValueTable, ATTRIBUTE_STRIDE, ELEMENT_STRIDE,
};
