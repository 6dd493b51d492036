//! Navigation iterators over the element tree.
//!
//! All four traversals come in plain, one-name, and name-set forms; the
//! name predicate is applied at yield time, never to steer traversal.
//! Realization errors surface as iterator items, after which the iterator
//! fuses.

use std::collections::{HashSet, VecDeque};
use std::vec;

use super::element::Element;
use super::error::{DataCenterError, Result};

/// Name predicate shared by the navigation iterators.
#[derive(Debug, Clone)]
pub(crate) enum NameFilter {
    Any,
    One(String),
    Among(HashSet<String>),
}

impl NameFilter {
    pub(crate) fn one(name: impl Into<String>) -> Self {
        NameFilter::One(name.into())
    }

    pub(crate) fn among<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NameFilter::Among(names.into_iter().map(Into::into).collect())
    }

    fn matches(&self, name: Option<&str>) -> bool {
        match self {
            NameFilter::Any => true,
            NameFilter::One(want) => name == Some(want.as_str()),
            NameFilter::Among(set) => name.map_or(false, |n| set.contains(n)),
        }
    }
}

/// Iterator over an element's children, in record order.
///
/// Created by [`Element::children`] and its named variants. Realization is
/// deferred to the first `next` call.
#[derive(Debug)]
pub struct Children {
    source: Option<Element>,
    items: vec::IntoIter<Element>,
    filter: NameFilter,
    done: bool,
}

impl Children {
    pub(crate) fn new(source: Element, filter: NameFilter) -> Self {
        Children {
            source: Some(source),
            items: Vec::new().into_iter(),
            filter,
            done: false,
        }
    }
}

impl Iterator for Children {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(parent) = self.source.take() {
            match parent.realized_children() {
                Ok(children) => self.items = children.to_vec().into_iter(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        for element in self.items.by_ref() {
            if self.filter.matches(element.name()) {
                return Some(Ok(element));
            }
        }
        self.done = true;
        None
    }
}

/// Iterator over the parent's children, excluding the origin element by
/// handle identity. Empty at the root.
///
/// Created by [`Element::siblings`] and its named variants.
#[derive(Debug)]
pub struct Siblings {
    origin: Element,
    started: bool,
    items: vec::IntoIter<Element>,
    filter: NameFilter,
    done: bool,
}

impl Siblings {
    pub(crate) fn new(origin: Element, filter: NameFilter) -> Self {
        Siblings {
            origin,
            started: false,
            items: Vec::new().into_iter(),
            filter,
            done: false,
        }
    }
}

impl Iterator for Siblings {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            let parent = match self.origin.parent() {
                Some(parent) => parent,
                None => {
                    self.done = true;
                    return None;
                }
            };
            match parent.realized_children() {
                Ok(children) => self.items = children.to_vec().into_iter(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        for element in self.items.by_ref() {
            if element.ptr_eq(&self.origin) {
                continue;
            }
            if self.filter.matches(element.name()) {
                return Some(Ok(element));
            }
        }
        self.done = true;
        None
    }
}

/// Iterator walking the parent chain up to (excluding) the data-center
/// boundary, excluding the origin element.
///
/// Created by [`Element::ancestors`] and its named variants. Never yields
/// an error; items are `Result` for uniformity with the other traversals.
#[derive(Debug)]
pub struct Ancestors {
    current: Option<Element>,
    filter: NameFilter,
}

impl Ancestors {
    pub(crate) fn new(origin: Element, filter: NameFilter) -> Self {
        Ancestors {
            current: Some(origin),
            filter,
        }
    }
}

impl Iterator for Ancestors {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.current.take()?;
            let parent = current.parent()?;
            self.current = Some(parent.clone());
            if self.filter.matches(parent.name()) {
                return Some(Ok(parent));
            }
        }
    }
}

/// Breadth-first iterator over the subtree below the origin, excluding the
/// origin; each true descendant is visited exactly once.
///
/// Created by [`Element::descendants`] and its named variants. When a
/// node's children fail to realize, the node itself is still yielded (if it
/// matches) and the error follows as the next item.
#[derive(Debug)]
pub struct Descendants {
    origin: Option<Element>,
    queue: VecDeque<Element>,
    pending_error: Option<DataCenterError>,
    filter: NameFilter,
    done: bool,
}

impl Descendants {
    pub(crate) fn new(origin: Element, filter: NameFilter) -> Self {
        Descendants {
            origin: Some(origin),
            queue: VecDeque::new(),
            pending_error: None,
            filter,
            done: false,
        }
    }
}

impl Iterator for Descendants {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(origin) = self.origin.take() {
            match origin.realized_children() {
                Ok(children) => self.queue.extend(children.iter().cloned()),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        loop {
            if let Some(e) = self.pending_error.take() {
                self.done = true;
                return Some(Err(e));
            }
            let element = match self.queue.pop_front() {
                Some(element) => element,
                None => {
                    self.done = true;
                    return None;
                }
            };
            match element.realized_children() {
                Ok(children) => self.queue.extend(children.iter().cloned()),
                Err(e) => self.pending_error = Some(e),
            }
            if self.filter.matches(element.name()) {
                return Some(Ok(element));
            }
        }
    }
}
