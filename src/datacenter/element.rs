//! On-demand element materialization.
//!
//! An [`Element`] is a cheap handle onto a node parsed from the element
//! heap. The header (name, extension word, counts, base addresses) is read
//! under one read-locked critical section at construction; the attribute
//! map and the child list are each realized lazily, at most once, with the
//! result (or the structural error) cached in a one-shot cell.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use log::{debug, trace};
use once_cell::sync::OnceCell;

use super::address::{decode_extension_word, decode_type_word, Address};
use super::center::{CenterShared, DataCenterImage};
use super::error::{DataCenterError, Result};
use super::iter::{Ancestors, Children, Descendants, NameFilter, Siblings};
use super::value::AttributeValue;

/// Realized attribute mapping of one element. Names are unique.
pub type AttributeMap = HashMap<Arc<str>, AttributeValue>;

/// Up-reference from a node: either the data-center boundary or the parent
/// element. Never owning, so parent and child form no cycle.
#[derive(Debug)]
pub(crate) enum Parent {
    Center(Weak<CenterShared>),
    Element(Weak<ElementNode>),
}

#[derive(Debug)]
pub(crate) struct ElementNode {
    center: Weak<CenterShared>,
    parent: Parent,
    address: Address,
    /// `None` marks a placeholder record.
    name: Option<Arc<str>>,
    attribute_count: u16,
    child_count: u16,
    attribute_base: Address,
    child_base: Address,
    attributes: OnceCell<Result<AttributeMap>>,
    children: OnceCell<Result<Vec<Element>>>,
}

impl ElementNode {
    /// A node with no attributes and no children: placeholders and the
    /// synthetic dummy root.
    fn bare(
        shared: &Arc<CenterShared>,
        address: Address,
        parent: Parent,
        name: Option<Arc<str>>,
    ) -> ElementNode {
        ElementNode {
            center: Arc::downgrade(shared),
            parent,
            address,
            name,
            attribute_count: 0,
            child_count: 0,
            attribute_base: Address::ZERO,
            child_base: Address::ZERO,
            attributes: OnceCell::new(),
            children: OnceCell::new(),
        }
    }

    /// Read and validate one 16-byte element record.
    ///
    /// Runs inside the caller's read-locked critical section. A zero name
    /// index yields a placeholder node; its remaining fields are not
    /// consulted.
    fn parse(
        shared: &Arc<CenterShared>,
        image: &DataCenterImage,
        address: Address,
        parent: Parent,
    ) -> Result<ElementNode> {
        let mut cursor = image.elements.reader_at(address)?;
        let name = match image.names.resolve(cursor.read_u16())? {
            Some(name) => name,
            None => {
                trace!("placeholder record at {}", address);
                return Ok(ElementNode::bare(shared, address, parent, None));
            }
        };
        let (flags, ext_index) = decode_extension_word(cursor.read_u16());
        if flags != 0 {
            return Err(DataCenterError::NonZeroFlags { address, flags });
        }
        image.extensions.check(ext_index)?;
        let attribute_count = cursor.read_u16();
        let child_count = cursor.read_u16();
        let attribute_base = cursor.read_address();
        let child_base = cursor.read_address();
        debug!(
            "element \"{}\" at {}: {} attributes, {} children",
            name, address, attribute_count, child_count
        );
        Ok(ElementNode {
            center: Arc::downgrade(shared),
            parent,
            address,
            name: Some(name),
            attribute_count,
            child_count,
            attribute_base,
            child_base,
            attributes: OnceCell::new(),
            children: OnceCell::new(),
        })
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<placeholder>")
    }

    /// Read the element's attribute records as one locked critical section.
    fn realize_attributes(&self) -> Result<AttributeMap> {
        let shared = self
            .center
            .upgrade()
            .ok_or(DataCenterError::UseAfterDispose)?;
        shared.with_image(|image| {
            debug!(
                "realizing {} attributes of \"{}\" from {}",
                self.attribute_count,
                self.display_name(),
                self.attribute_base
            );
            let mut map = AttributeMap::with_capacity(self.attribute_count as usize);
            for i in 0..self.attribute_count {
                let address = self
                    .attribute_base
                    .offset(i)
                    .ok_or_else(|| image.attributes.out_of_bounds(self.attribute_base))?;
                let mut cursor = image.attributes.reader_at(address)?;
                let name = match image.names.resolve(cursor.read_u16())? {
                    Some(name) => name,
                    // Attributes have no placeholder form; index 0 is invalid here.
                    None => {
                        return Err(DataCenterError::BadNameIndex {
                            index: 0,
                            len: image.names.len(),
                        })
                    }
                };
                let type_word = cursor.read_u16();
                let primitive = cursor.read_u32();
                let value = match decode_type_word(type_word) {
                    (1, 0) => AttributeValue::Int(primitive as i32),
                    (1, 1) => AttributeValue::Bool(primitive != 0),
                    (2, 0) => AttributeValue::Float(f32::from_bits(primitive)),
                    (3, _) => {
                        // The primitive doubles as an address into the value heap.
                        cursor.rewind(4);
                        let value_address = cursor.read_address();
                        AttributeValue::Str(image.values.resolve(value_address)?)
                    }
                    (type_code, ext_code) => {
                        return Err(DataCenterError::UnknownTypeCode {
                            name: name.to_string(),
                            type_code,
                            ext_code,
                        })
                    }
                };
                trace!("attribute \"{}\" at {} = {}", name, address, value);
                if map.insert(name.clone(), value).is_some() {
                    return Err(DataCenterError::DuplicateAttribute {
                        element: self.display_name().to_string(),
                        name: name.to_string(),
                    });
                }
            }
            Ok(map)
        })
    }
}

/// A named node of the data center tree.
///
/// Handles are cheap to clone; the node storage itself is owned by the
/// parent's realized child list (the data center owns the root). All reads
/// fail with `UseAfterDispose` once the data center is closed.
#[derive(Debug, Clone)]
pub struct Element {
    node: Arc<ElementNode>,
}

impl Element {
    pub(crate) fn from_node(node: ElementNode) -> Element {
        Element {
            node: Arc::new(node),
        }
    }

    pub(crate) fn from_arc(node: Arc<ElementNode>) -> Element {
        Element { node }
    }

    /// Materialize the tree root: the record at `0:0`, or the synthetic
    /// dummy root when the name table is empty.
    pub(crate) fn materialize_root(shared: &Arc<CenterShared>) -> Result<Element> {
        shared
            .with_image(|image| {
                let parent = Parent::Center(Arc::downgrade(shared));
                if image.names.is_empty() {
                    debug!("name table is empty; synthesizing dummy root");
                    return Ok(ElementNode::bare(
                        shared,
                        Address::ZERO,
                        parent,
                        Some("__root__".into()),
                    ));
                }
                ElementNode::parse(shared, image, Address::ZERO, parent)
            })
            .map(Element::from_node)
    }

    /// The element's name. `None` only for a root record that is itself a
    /// placeholder; placeholder children are never surfaced.
    pub fn name(&self) -> Option<&str> {
        self.node.name.as_deref()
    }

    /// Where this element's record lives in the element heap.
    pub fn address(&self) -> Address {
        self.node.address
    }

    /// The parent element, or `None` at the data-center boundary.
    pub fn parent(&self) -> Option<Element> {
        match &self.node.parent {
            Parent::Center(_) => None,
            Parent::Element(weak) => weak.upgrade().map(Element::from_arc),
        }
    }

    /// Whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// The realized attribute mapping. Computed at most once; a structural
    /// error is cached and replayed on every later access.
    pub fn attributes(&self) -> Result<&AttributeMap> {
        let node = &self.node;
        let result = node.attributes.get_or_init(|| node.realize_attributes());
        result.as_ref().map_err(|e| e.clone())
    }

    /// Look up one attribute. An absent name resolves to `Ok(None)`.
    pub fn attr(&self, name: &str) -> Result<Option<AttributeValue>> {
        Ok(self.attributes()?.get(name).cloned())
    }

    /// Look up one attribute, converting `fallback` when the name is
    /// absent. A stored value always wins; float fallbacks keep their bits.
    pub fn attr_or(&self, name: &str, fallback: impl Into<AttributeValue>) -> Result<AttributeValue> {
        Ok(self
            .attributes()?
            .get(name)
            .cloned()
            .unwrap_or_else(|| fallback.into()))
    }

    /// The realized child list, placeholders filtered, order preserved.
    /// Computed at most once; errors are cached like attribute errors.
    pub(crate) fn realized_children(&self) -> Result<&[Element]> {
        let result = self.node.children.get_or_init(|| self.realize_children());
        match result {
            Ok(children) => Ok(children.as_slice()),
            Err(e) => Err(e.clone()),
        }
    }

    fn realize_children(&self) -> Result<Vec<Element>> {
        let node = &self.node;
        let shared = node
            .center
            .upgrade()
            .ok_or(DataCenterError::UseAfterDispose)?;
        debug!(
            "realizing {} children of \"{}\" from {}",
            node.child_count,
            node.display_name(),
            node.child_base
        );
        let mut out = Vec::with_capacity(node.child_count as usize);
        for i in 0..node.child_count {
            // One locked read per child header.
            let child = shared.with_image(|image| {
                let address = node
                    .child_base
                    .offset(i)
                    .ok_or_else(|| image.elements.out_of_bounds(node.child_base))?;
                ElementNode::parse(
                    &shared,
                    image,
                    address,
                    Parent::Element(Arc::downgrade(&self.node)),
                )
            })?;
            if child.name.is_none() {
                // Placeholder slot: occupies the index range, never surfaced.
                continue;
            }
            out.push(Element::from_node(child));
        }
        Ok(out)
    }

    // --- Navigation ---
    //
    // All iterators are lazy and finite. Realization errors surface as
    // iterator items, after which the iterator fuses.

    /// This element's children, in record order.
    pub fn children(&self) -> Children {
        Children::new(self.clone(), NameFilter::Any)
    }

    /// Children whose name equals `name`.
    pub fn children_named(&self, name: impl Into<String>) -> Children {
        Children::new(self.clone(), NameFilter::one(name))
    }

    /// Children whose name is a member of `names`.
    pub fn children_among<I, S>(&self, names: I) -> Children
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Children::new(self.clone(), NameFilter::among(names))
    }

    /// The parent's children, excluding this element by identity. Empty at
    /// the root.
    pub fn siblings(&self) -> Siblings {
        Siblings::new(self.clone(), NameFilter::Any)
    }

    pub fn siblings_named(&self, name: impl Into<String>) -> Siblings {
        Siblings::new(self.clone(), NameFilter::one(name))
    }

    pub fn siblings_among<I, S>(&self, names: I) -> Siblings
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Siblings::new(self.clone(), NameFilter::among(names))
    }

    /// The parent chain up to (excluding) the data-center boundary,
    /// excluding this element.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors::new(self.clone(), NameFilter::Any)
    }

    pub fn ancestors_named(&self, name: impl Into<String>) -> Ancestors {
        Ancestors::new(self.clone(), NameFilter::one(name))
    }

    pub fn ancestors_among<I, S>(&self, names: I) -> Ancestors
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ancestors::new(self.clone(), NameFilter::among(names))
    }

    /// Breadth-first traversal of the subtree below this element,
    /// excluding this element; each descendant is visited exactly once.
    pub fn descendants(&self) -> Descendants {
        Descendants::new(self.clone(), NameFilter::Any)
    }

    pub fn descendants_named(&self, name: impl Into<String>) -> Descendants {
        Descendants::new(self.clone(), NameFilter::one(name))
    }

    pub fn descendants_among<I, S>(&self, names: I) -> Descendants
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Descendants::new(self.clone(), NameFilter::among(names))
    }
}
