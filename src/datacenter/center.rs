//! The data center root: owns the record heaps and side tables behind an
//! advisory read/write lock, hands out the cached root element, and carries
//! the freeze/close lifecycle.

use std::sync::Arc;

use log::info;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use super::element::Element;
use super::error::{DataCenterError, Result};
use super::heap::SegmentedHeap;
use super::tables::{ExtensionTable, NameTable, ValueTable};

/// Byte stride of one element record.
pub const ELEMENT_STRIDE: usize = 16;

/// Byte stride of one attribute record.
pub const ATTRIBUTE_STRIDE: usize = 8;

/// The in-memory structure handed over by the loader: already-decompressed
/// record heaps plus decoded side tables. This is the loader's entire
/// contract; the reader owns it from adoption to `close`.
#[derive(Debug)]
pub struct DataCenterImage {
    pub elements: SegmentedHeap,
    pub attributes: SegmentedHeap,
    pub names: NameTable,
    pub values: ValueTable,
    pub extensions: ExtensionTable,
}

#[derive(Debug)]
pub(crate) struct CenterState {
    pub(crate) image: Option<DataCenterImage>,
    pub(crate) frozen: bool,
}

/// Shared core behind every element handle. The lock orders record reads
/// against `freeze`/`close`; the image itself is immutable after load.
#[derive(Debug)]
pub(crate) struct CenterShared {
    pub(crate) state: RwLock<CenterState>,
}

impl CenterShared {
    /// Run `f` as one read-locked critical section over the live image.
    /// Fails with `UseAfterDispose` once the center is closed.
    pub(crate) fn with_image<T>(&self, f: impl FnOnce(&DataCenterImage) -> Result<T>) -> Result<T> {
        let state = self.state.read();
        let image = state
            .image
            .as_ref()
            .ok_or(DataCenterError::UseAfterDispose)?;
        f(image)
    }
}

/// The whole container: a read-only indexed tree of named elements and
/// typed attributes.
///
/// Multiple threads may navigate concurrently; `freeze` and `close` take
/// the write side of the advisory lock. Elements hold weak references back
/// to this root, so their lifetime is bounded by the data center's.
#[derive(Debug)]
pub struct DataCenter {
    shared: Arc<CenterShared>,
    root: OnceCell<Element>,
}

impl DataCenter {
    /// Adopt a loader-produced image.
    ///
    /// The record heaps must carry the fixed element and attribute strides;
    /// anything else is a loader-contract violation.
    pub fn new(image: DataCenterImage) -> Result<Self> {
        if image.elements.stride() != ELEMENT_STRIDE {
            return Err(DataCenterError::InvalidImage(format!(
                "element heap stride is {}, expected {}",
                image.elements.stride(),
                ELEMENT_STRIDE
            )));
        }
        if image.attributes.stride() != ATTRIBUTE_STRIDE {
            return Err(DataCenterError::InvalidImage(format!(
                "attribute heap stride is {}, expected {}",
                image.attributes.stride(),
                ATTRIBUTE_STRIDE
            )));
        }
        info!(
            "data center image adopted: {} elements in {} segments, {} names, {} string values, {} extensions",
            image.elements.record_count(),
            image.elements.segment_count(),
            image.names.len(),
            image.values.len(),
            image.extensions.len()
        );
        Ok(DataCenter {
            shared: Arc::new(CenterShared {
                state: RwLock::new(CenterState {
                    image: Some(image),
                    frozen: false,
                }),
            }),
            root: OnceCell::new(),
        })
    }

    /// The root element, materialized once and cached.
    ///
    /// With an empty name table this is a synthetic dummy root named
    /// `__root__` with no attributes and no children; otherwise it is the
    /// element at address `0:0`.
    pub fn root(&self) -> Result<Element> {
        let root = self
            .root
            .get_or_try_init(|| Element::materialize_root(&self.shared))?;
        Ok(root.clone())
    }

    /// Forbid teardown: after this, `close` fails with `FrozenViolation`.
    /// Reads stay available.
    pub fn freeze(&self) {
        self.shared.state.write().frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.shared.state.read().frozen
    }

    /// Tear down the image. Every element read and `root()` call afterwards
    /// fails with `UseAfterDispose`; elements themselves are dropped
    /// transitively with their parents.
    pub fn close(&self) -> Result<()> {
        let mut state = self.shared.state.write();
        if state.frozen {
            return Err(DataCenterError::FrozenViolation);
        }
        if state.image.take().is_none() {
            return Err(DataCenterError::UseAfterDispose);
        }
        info!("data center closed");
        Ok(())
    }

    /// Total element records across all segments (placeholders included).
    pub fn element_count(&self) -> Result<usize> {
        self.shared.with_image(|image| Ok(image.elements.record_count()))
    }

    /// Number of interned names.
    pub fn name_count(&self) -> Result<usize> {
        self.shared.with_image(|image| Ok(image.names.len()))
    }
}
