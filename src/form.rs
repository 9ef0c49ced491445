use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::control::{
    Aggregator, Children, ControlBuilder, ControlEntries, ControlKey, ControlNode, array_value,
    object_value,
};
use crate::id::{ControlId, IdGenerator, RandomIds};
use crate::snapshot::{ControlView, Entries, Snapshot, SnapshotEntry};
use crate::status::{ChildState, ControlStatus, GroupStatus, LeafStatus, StatusContext};
use crate::validation::{ErrorKey, Validator, ValidatorSet};
use crate::value::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormError {
    UnknownControl(ControlId),
    NotAGroup(ControlId),
    SelfParent(ControlId),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::UnknownControl(id) => {
                write!(f, "control {id} does not exist in this form")
            }
            FormError::NotAGroup(id) => {
                write!(f, "control {id} has no children")
            }
            FormError::SelfParent(id) => {
                write!(f, "control {id} cannot be its own parent")
            }
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

/// A snapshot-sequence transformer, the operator shape `pipe` threads
/// entries through.
pub type PipeOp<'a> = Box<dyn FnMut(Entries<'a>) -> Entries<'a> + 'a>;

/// Arena owning every control of one tree. All operations address controls by
/// id; the parent link is an id lookup, never an owning pointer.
pub struct Form {
    ids: Arc<dyn IdGenerator>,
    nodes: BTreeMap<ControlId, ControlNode>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    pub fn new() -> Self {
        Self::with_ids(Arc::new(RandomIds))
    }

    pub fn with_ids(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            nodes: BTreeMap::new(),
        }
    }

    /// Creates a leaf control and runs its initial validation pass.
    pub fn control(
        &mut self,
        value: impl Into<Value>,
        validators: impl IntoIterator<Item = Validator>,
    ) -> ControlId {
        let value = value.into();
        let id = self.ids.generate();
        let mut node = ControlBuilder::new(Arc::new(LeafStatus))
            .value(value.clone())
            .validators(ValidatorSet::new(validators))
            .build(id);
        node.validation.run(&value);
        let ctx = StatusContext {
            errors: node.validation.errors(),
            children: &[],
        };
        node.status.recompute(&ctx);
        self.nodes.insert(id, node);
        debug!(control = %id, "created leaf control");
        id
    }

    /// Creates an object-shaped group over named children, re-parenting each
    /// child to the group.
    pub fn group<K, I>(
        &mut self,
        entries: I,
        validators: impl IntoIterator<Item = Validator>,
    ) -> FormResult<ControlId>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ControlId)>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, id)| (ControlKey::Name(key.into()), id))
            .collect();
        let aggregate: Aggregator = Arc::new(object_value);
        self.build_group(entries, ValidatorSet::new(validators), aggregate)
    }

    /// Creates an array-shaped group, keying children 0..n.
    pub fn array(&mut self, entries: impl IntoIterator<Item = ControlId>) -> FormResult<ControlId> {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(index, id)| (ControlKey::Index(index), id))
            .collect();
        let aggregate: Aggregator = Arc::new(array_value);
        self.build_group(entries, ValidatorSet::default(), aggregate)
    }

    fn build_group(
        &mut self,
        entries: Vec<(ControlKey, ControlId)>,
        validators: ValidatorSet,
        aggregate: Aggregator,
    ) -> FormResult<ControlId> {
        for (_, child) in &entries {
            if !self.nodes.contains_key(child) {
                return Err(FormError::UnknownControl(*child));
            }
        }
        let id = self.ids.generate();
        let children = Children {
            entries: entries.iter().cloned().collect(),
            aggregate,
        };
        let node = ControlBuilder::new(Arc::new(GroupStatus))
            .validators(validators)
            .children(children)
            .build(id);
        self.nodes.insert(id, node);
        for (_, child) in &entries {
            self.attach(*child, id)?;
        }
        let value = self.value(id)?;
        self.update_state(id, value)?;
        debug!(control = %id, children = entries.len(), "created group control");
        Ok(id)
    }

    /// Re-parents `child` to `parent`. Attaching a control that already has a
    /// parent silently reassigns it; the last attach wins.
    fn attach(&mut self, child: ControlId, parent: ControlId) -> FormResult<()> {
        if child == parent {
            return Err(FormError::SelfParent(child));
        }
        let node = self.node_mut(child)?;
        node.parent = Some(parent);
        trace!(child = %child, parent = %parent, "attached control");
        Ok(())
    }

    fn node(&self, id: ControlId) -> FormResult<&ControlNode> {
        self.nodes.get(&id).ok_or(FormError::UnknownControl(id))
    }

    fn node_mut(&mut self, id: ControlId) -> FormResult<&mut ControlNode> {
        self.nodes
            .get_mut(&id)
            .ok_or(FormError::UnknownControl(id))
    }

    pub fn contains(&self, id: ControlId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The control's value. Group values are derived live from the current
    /// children on every read, never cached.
    pub fn value(&self, id: ControlId) -> FormResult<Value> {
        let node = self.node(id)?;
        match &node.children {
            Some(children) => {
                let mut pairs = Vec::with_capacity(children.entries.len());
                for (key, child) in &children.entries {
                    pairs.push((key.clone(), self.value(*child)?));
                }
                Ok((children.aggregate)(&pairs))
            }
            None => Ok(node.value.clone()),
        }
    }

    pub fn status(&self, id: ControlId) -> FormResult<ControlStatus> {
        Ok(self.node(id)?.status.status())
    }

    pub fn errors(&self, id: ControlId) -> FormResult<Vec<ErrorKey>> {
        Ok(self.node(id)?.validation.errors().to_vec())
    }

    pub fn pristine(&self, id: ControlId) -> FormResult<bool> {
        Ok(self.node(id)?.pristine)
    }

    pub fn touched(&self, id: ControlId) -> FormResult<bool> {
        Ok(self.node(id)?.touched)
    }

    pub fn parent(&self, id: ControlId) -> FormResult<Option<ControlId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn is_valid(&self, id: ControlId) -> FormResult<bool> {
        Ok(self.status(id)? == ControlStatus::Valid)
    }

    pub fn is_invalid(&self, id: ControlId) -> FormResult<bool> {
        Ok(self.status(id)? == ControlStatus::Invalid)
    }

    pub fn is_disabled(&self, id: ControlId) -> FormResult<bool> {
        Ok(self.node(id)?.status.reports_disabled())
    }

    /// Stores a new value on a leaf and runs the update cascade. Ignored on
    /// disabled controls (the value is left unchanged) and on groups, whose
    /// values are derived.
    pub fn set_value(&mut self, id: ControlId, value: impl Into<Value>) -> FormResult<()> {
        let value = value.into();
        let node = self.node(id)?;
        if node.status.reports_disabled() {
            trace!(control = %id, "set_value ignored on disabled control");
            return Ok(());
        }
        if node.is_group() {
            debug!(control = %id, "set_value ignored: group values are derived from children");
            return Ok(());
        }
        if node.pristine {
            self.set_dirty(id)?;
        }
        self.node_mut(id)?.value = value.clone();
        self.update_state(id, value)
    }

    /// Revalidates the control against `value` and recomputes its status,
    /// then unconditionally asks the parent to do the same with the parent's
    /// own aggregated value, repeating to the root. A disabled control skips
    /// its own recomputation but still propagates upward.
    pub fn update_state(&mut self, id: ControlId, value: impl Into<Value>) -> FormResult<()> {
        let value = value.into();
        let suppressed = self.node(id)?.status.is_suppressed();
        if !suppressed {
            let child_states = self.child_states(id)?;
            let node = self.node_mut(id)?;
            node.validation.run(&value);
            let ctx = StatusContext {
                errors: node.validation.errors(),
                children: &child_states,
            };
            node.status.recompute(&ctx);
            trace!(control = %id, status = ?node.status.status(), "recomputed control state");
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            let parent_value = self.value(parent)?;
            self.update_state(parent, parent_value)?;
        }
        Ok(())
    }

    /// Marks the control dirty and walks to the root unconditionally; the
    /// pristine flag only ever moves from true to false.
    pub fn set_dirty(&mut self, id: ControlId) -> FormResult<()> {
        let node = self.node_mut(id)?;
        node.pristine = false;
        let parent = node.parent;
        if let Some(parent) = parent {
            self.set_dirty(parent)?;
        }
        Ok(())
    }

    /// Sets the touched flag. Unlike `update_state`, propagation happens only
    /// when `propagate` is set and the flag actually changed.
    pub fn set_touched(&mut self, id: ControlId, touched: bool, propagate: bool) -> FormResult<()> {
        let node = self.node_mut(id)?;
        let changed = node.touched != touched;
        node.touched = touched;
        if propagate && changed {
            let value = self.value(id)?;
            self.update_state(id, value)?;
        }
        Ok(())
    }

    pub fn touch(&mut self, id: ControlId) -> FormResult<()> {
        self.set_touched(id, true, true)
    }

    /// External disabled toggle. While set, validation and status
    /// recomputation are suppressed for the control and its errors are left
    /// untouched; either edge runs the cascade so ancestors observe the
    /// change.
    pub fn set_disabled(&mut self, id: ControlId, disabled: bool) -> FormResult<()> {
        self.node_mut(id)?.status.set_disabled(disabled);
        debug!(control = %id, disabled, "toggled disabled state");
        let value = self.value(id)?;
        self.update_state(id, value)
    }

    pub fn add_validator(&mut self, id: ControlId, validator: Validator) -> FormResult<()> {
        self.node_mut(id)?.validation.add(validator);
        Ok(())
    }

    pub fn remove_validator(&mut self, id: ControlId, key: ErrorKey) -> FormResult<()> {
        self.node_mut(id)?.validation.remove(key);
        Ok(())
    }

    /// The child registered under `key`, if any.
    pub fn get(&self, group: ControlId, key: impl Into<ControlKey>) -> FormResult<Option<ControlId>> {
        let node = self.node(group)?;
        let children = node.children.as_ref().ok_or(FormError::NotAGroup(group))?;
        Ok(children.entries.get(&key.into()).copied())
    }

    pub fn child_count(&self, group: ControlId) -> FormResult<usize> {
        let node = self.node(group)?;
        let children = node.children.as_ref().ok_or(FormError::NotAGroup(group))?;
        Ok(children.entries.len())
    }

    /// Merges new children into the group without disturbing existing keys.
    /// Array-shaped insertions continue indices from the current child count.
    pub fn add_control(
        &mut self,
        group: ControlId,
        entries: impl Into<ControlEntries>,
    ) -> FormResult<()> {
        let start = self.child_count(group)?;
        let parsed: Vec<(ControlKey, ControlId)> = match entries.into() {
            ControlEntries::Named(list) => list
                .into_iter()
                .map(|(key, id)| (ControlKey::Name(key), id))
                .collect(),
            ControlEntries::Indexed(list) => list
                .into_iter()
                .enumerate()
                .map(|(offset, id)| (ControlKey::Index(start + offset), id))
                .collect(),
        };
        for (_, child) in &parsed {
            if !self.nodes.contains_key(child) {
                return Err(FormError::UnknownControl(*child));
            }
        }
        for (key, child) in parsed {
            self.attach(child, group)?;
            let node = self.node_mut(group)?;
            let children = node.children.as_mut().ok_or(FormError::NotAGroup(group))?;
            children.entries.insert(key, child);
            debug!(group = %group, child = %child, "added control to group");
        }
        let value = self.value(group)?;
        self.update_state(group, value)
    }

    fn child_states(&self, id: ControlId) -> FormResult<Vec<ChildState>> {
        let node = self.node(id)?;
        let Some(children) = &node.children else {
            return Ok(Vec::new());
        };
        let mut states = Vec::with_capacity(children.entries.len());
        for (key, child) in &children.entries {
            let child_node = self.node(*child)?;
            states.push(ChildState {
                key: key.clone(),
                disabled: child_node.status.reports_disabled(),
                invalid: child_node.status.status() == ControlStatus::Invalid,
            });
        }
        Ok(states)
    }

    /// Takes a copy-on-read snapshot of the group's `(key, child)` list.
    /// Reading through it never mutates the live tree and never triggers
    /// validation or propagation.
    pub fn snapshot(&self, group: ControlId) -> FormResult<Snapshot<'_>> {
        let node = self.node(group)?;
        let children = node.children.as_ref().ok_or(FormError::NotAGroup(group))?;
        let mut entries = Vec::with_capacity(children.entries.len());
        for (key, child) in &children.entries {
            let child_node = self.node(*child)?;
            let aggregated = if child_node.is_group() {
                Some(Rc::new(self.value(*child)?))
            } else {
                None
            };
            let view = ControlView::new(child_node, aggregated);
            entries.push(Some(SnapshotEntry::new(key.clone(), view)));
        }
        Ok(Snapshot::new(entries))
    }

    /// Obtains a lazy snapshot of the group and threads its entry sequence
    /// through each operator left to right.
    pub fn pipe<'a>(
        &'a self,
        group: ControlId,
        operators: impl IntoIterator<Item = PipeOp<'a>>,
    ) -> FormResult<Entries<'a>> {
        let mut entries = self.snapshot(group)?.into_entries();
        for mut operator in operators {
            entries = operator(entries);
        }
        Ok(entries)
    }
}
