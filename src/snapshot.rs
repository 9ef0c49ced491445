use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::control::{ControlKey, ControlNode};
use crate::id::ControlId;
use crate::status::ControlStatus;
use crate::validation::ErrorKey;
use crate::value::Value;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

type CopyPath = Vec<PathSegment>;
type CopyCache = Rc<RefCell<BTreeMap<CopyPath, Rc<Value>>>>;

#[derive(Clone)]
enum Source<'a> {
    Live(&'a Value),
    Computed(Rc<Value>),
}

impl Source<'_> {
    fn as_value(&self) -> &Value {
        match self {
            Source::Live(value) => value,
            Source::Computed(value) => value,
        }
    }
}

/// Copy-on-read view of a value. Primitives pass through unchanged; composite
/// values are copied on first access and memoized per path, so repeated reads
/// through the same wrapper chain return the same copy until a new top-level
/// snapshot is taken. Non-performant on large or deep trees; use with caution.
#[derive(Clone)]
pub struct LazyValue<'a> {
    source: Source<'a>,
    path: CopyPath,
    cache: CopyCache,
}

impl<'a> LazyValue<'a> {
    fn new(source: Source<'a>, path: CopyPath, cache: CopyCache) -> Self {
        Self {
            source,
            path,
            cache,
        }
    }

    fn descend(&self, segment: PathSegment, source: Source<'a>) -> LazyValue<'a> {
        let mut path = self.path.clone();
        path.push(segment);
        LazyValue::new(source, path, self.cache.clone())
    }

    /// Wraps a field of a map-shaped value.
    pub fn get(&self, key: &str) -> Option<LazyValue<'a>> {
        let segment = PathSegment::Key(key.to_string());
        match &self.source {
            Source::Live(value) => value
                .get(key)
                .map(|child| self.descend(segment, Source::Live(child))),
            Source::Computed(value) => value
                .get(key)
                .map(|child| self.descend(segment, Source::Computed(Rc::new(child.clone())))),
        }
    }

    /// Wraps an element of a list-shaped value.
    pub fn at(&self, index: usize) -> Option<LazyValue<'a>> {
        let segment = PathSegment::Index(index);
        match &self.source {
            Source::Live(value) => value
                .at(index)
                .map(|child| self.descend(segment, Source::Live(child))),
            Source::Computed(value) => value
                .at(index)
                .map(|child| self.descend(segment, Source::Computed(Rc::new(child.clone())))),
        }
    }

    pub fn is_composite(&self) -> bool {
        self.source.as_value().is_composite()
    }

    /// Materializes an owned value. Mutating the result can never affect the
    /// live tree.
    pub fn read(&self) -> Value {
        if self.source.as_value().is_composite() {
            self.copied().as_ref().clone()
        } else {
            self.source.as_value().clone()
        }
    }

    /// The memoized structural copy for composite values. Primitives are
    /// never cached or wrapped.
    pub(crate) fn copied(&self) -> Rc<Value> {
        self.cache
            .borrow_mut()
            .entry(self.path.clone())
            .or_insert_with(|| Rc::new(self.source.as_value().clone()))
            .clone()
    }
}

/// Read-only view of one control inside a snapshot. Scalar state passes
/// through; `value()` goes through the copy-on-read mechanism.
#[derive(Clone)]
pub struct ControlView<'a> {
    node: &'a ControlNode,
    aggregated: Option<Rc<Value>>,
    cache: CopyCache,
}

impl<'a> ControlView<'a> {
    pub(crate) fn new(node: &'a ControlNode, aggregated: Option<Rc<Value>>) -> Self {
        Self {
            node,
            aggregated,
            cache: Rc::new(RefCell::new(BTreeMap::new())),
        }
    }

    pub fn id(&self) -> ControlId {
        self.node.id
    }

    pub fn status(&self) -> ControlStatus {
        self.node.status.status()
    }

    pub fn errors(&self) -> &'a [ErrorKey] {
        self.node.validation.errors()
    }

    pub fn pristine(&self) -> bool {
        self.node.pristine
    }

    pub fn touched(&self) -> bool {
        self.node.touched
    }

    pub fn is_disabled(&self) -> bool {
        self.node.status.reports_disabled()
    }

    pub fn is_valid(&self) -> bool {
        self.status() == ControlStatus::Valid
    }

    pub fn is_invalid(&self) -> bool {
        self.status() == ControlStatus::Invalid
    }

    /// The control's value behind the copy-on-read wrapper. Group values are
    /// aggregated once when the snapshot is taken.
    pub fn value(&self) -> LazyValue<'a> {
        let source = match &self.aggregated {
            Some(value) => Source::Computed(value.clone()),
            None => Source::Live(&self.node.value),
        };
        LazyValue::new(source, Vec::new(), self.cache.clone())
    }
}

/// One `(key, child)` pair of a snapshot.
#[derive(Clone)]
pub struct SnapshotEntry<'a> {
    key: ControlKey,
    view: ControlView<'a>,
}

impl<'a> SnapshotEntry<'a> {
    pub(crate) fn new(key: ControlKey, view: ControlView<'a>) -> Self {
        Self { key, view }
    }

    pub fn key(&self) -> &ControlKey {
        &self.key
    }

    pub fn view(&self) -> &ControlView<'a> {
        &self.view
    }
}

/// The entry sequence operators transform. `None` marks a missing entry, the
/// way `find` reports an absent key.
pub type Entries<'a> = Vec<Option<SnapshotEntry<'a>>>;

/// Structurally-isolated view over a group's `(key, child)` list. Reading
/// never mutates the live tree and never triggers validation or propagation.
pub struct Snapshot<'a> {
    entries: Entries<'a>,
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(entries: Entries<'a>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &Entries<'a> {
        &self.entries
    }

    pub fn into_entries(self) -> Entries<'a> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
