//! Core data center reader module.

pub mod address;
pub mod center;
pub mod element;
pub mod error;
pub mod heap;
pub mod iter;
pub mod tables;
pub mod value;

pub use address::{decode_extension_word, decode_type_word, extract, Address};
pub use center::{DataCenter, DataCenterImage, ATTRIBUTE_STRIDE, ELEMENT_STRIDE};
pub use element::{AttributeMap, Element};
pub use error::{DataCenterError, Result};
pub use heap::{HeapCursor, SegmentedHeap};
pub use iter::{Ancestors, Children, Descendants, Siblings};
pub use tables::{ExtensionDescriptor, ExtensionTable, NameTable, ValueTable};
pub use value::AttributeValue;
