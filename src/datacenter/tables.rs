//! Interned side tables: names, string values, element extensions.

use std::collections::HashMap;
use std::sync::Arc;

use super::address::Address;
use super::error::{DataCenterError, Result};

/// Interned element and attribute names.
///
/// The table is 1-indexed externally: an on-disk value stores `index + 1`,
/// with 0 meaning "placeholder". Names are shared as `Arc<str>` so every
/// element and attribute map referencing a name points at one allocation.
#[derive(Debug, Default)]
pub struct NameTable {
    by_index: Vec<Arc<str>>,
    by_name: HashMap<Arc<str>, usize>,
}

impl NameTable {
    pub fn new(names: Vec<String>) -> Self {
        let mut by_index = Vec::with_capacity(names.len());
        let mut by_name = HashMap::with_capacity(names.len());
        for name in names {
            let name: Arc<str> = name.into();
            // First occurrence wins on duplicate loader input.
            by_name.entry(name.clone()).or_insert(by_index.len());
            by_index.push(name);
        }
        NameTable { by_index, by_name }
    }

    /// Resolve an on-disk `index + 1` value. Zero is the placeholder marker
    /// and resolves to `None`; an index past the table is a structural error.
    pub fn resolve(&self, name_index_plus_one: u16) -> Result<Option<Arc<str>>> {
        if name_index_plus_one == 0 {
            return Ok(None);
        }
        match self.by_index.get(name_index_plus_one as usize - 1) {
            Some(name) => Ok(Some(name.clone())),
            None => Err(DataCenterError::BadNameIndex {
                index: name_index_plus_one,
                len: self.by_index.len(),
            }),
        }
    }

    /// Look up a name by its 0-based internal index.
    pub fn get(&self, index: usize) -> Option<&Arc<str>> {
        self.by_index.get(index)
    }

    /// Reverse lookup: the 0-based index of `name`, if interned.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}

/// Interned element string values keyed by address within the value heap.
#[derive(Debug, Default)]
pub struct ValueTable {
    by_address: HashMap<Address, Arc<str>>,
}

impl ValueTable {
    pub fn new(values: HashMap<Address, String>) -> Self {
        ValueTable {
            by_address: values.into_iter().map(|(a, v)| (a, v.into())).collect(),
        }
    }

    pub fn get(&self, address: Address) -> Option<&Arc<str>> {
        self.by_address.get(&address)
    }

    /// Resolve a string-typed attribute's address. Every such address must
    /// be present; a miss is a structural error naming the address.
    pub fn resolve(&self, address: Address) -> Result<Arc<str>> {
        self.by_address
            .get(&address)
            .cloned()
            .ok_or(DataCenterError::MissingValue { address })
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

/// Raw element-extension descriptor bytes as delivered by the loader.
///
/// Contents are carried opaquely; the reader never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionDescriptor(pub u32);

/// Element-extension descriptors referenced by the packed index in an
/// element's extension word. Only the descriptor count participates in
/// validation.
#[derive(Debug, Default)]
pub struct ExtensionTable {
    descriptors: Vec<ExtensionDescriptor>,
}

impl ExtensionTable {
    pub fn new(descriptors: Vec<ExtensionDescriptor>) -> Self {
        ExtensionTable { descriptors }
    }

    /// Validate that `ext_index` references a descriptor.
    pub fn check(&self, ext_index: u16) -> Result<()> {
        if (ext_index as usize) < self.descriptors.len() {
            Ok(())
        } else {
            Err(DataCenterError::BadExtensionIndex {
                index: ext_index,
                len: self.descriptors.len(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_one_indexed() {
        let table = NameTable::new(vec!["alpha".into(), "beta".into()]);
        assert_eq!(table.resolve(0).unwrap(), None);
        assert_eq!(table.resolve(1).unwrap().as_deref(), Some("alpha"));
        assert_eq!(table.resolve(2).unwrap().as_deref(), Some("beta"));
        assert_eq!(
            table.resolve(3).unwrap_err(),
            DataCenterError::BadNameIndex { index: 3, len: 2 }
        );
    }

    #[test]
    fn names_reverse_lookup() {
        let table = NameTable::new(vec!["alpha".into(), "beta".into()]);
        assert_eq!(table.index_of("beta"), Some(1));
        assert_eq!(table.index_of("gamma"), None);
    }

    #[test]
    fn names_lookup_by_internal_index() {
        let table = NameTable::new(vec!["alpha".into(), "beta".into()]);
        assert_eq!(table.get(1).map(|n| n.as_ref()), Some("beta"));
        assert_eq!(table.get(2), None);
        // `index_of` and `get` round-trip.
        let index = table.index_of("alpha").unwrap();
        assert_eq!(table.get(index).map(|n| n.as_ref()), Some("alpha"));
    }

    #[test]
    fn missing_value_address_is_structural() {
        let table = ValueTable::new(HashMap::new());
        let addr = Address::new(1, 7);
        assert_eq!(
            table.resolve(addr).unwrap_err(),
            DataCenterError::MissingValue { address: addr }
        );
    }

    #[test]
    fn value_lookup_by_address() {
        let mut values = HashMap::new();
        values.insert(Address::new(0, 3), "hi".to_string());
        let table = ValueTable::new(values);
        assert_eq!(
            table.get(Address::new(0, 3)).map(|v| v.as_ref()),
            Some("hi")
        );
        assert_eq!(table.get(Address::new(1, 3)), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn extension_index_must_be_in_range() {
        let table = ExtensionTable::new(vec![ExtensionDescriptor(0)]);
        assert!(table.check(0).is_ok());
        assert_eq!(
            table.check(1).unwrap_err(),
            DataCenterError::BadExtensionIndex { index: 1, len: 1 }
        );
    }
}
