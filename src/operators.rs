use crate::control::ControlKey;
use crate::form::PipeOp;
use crate::snapshot::{Entries, SnapshotEntry};

/// One-element sequence with the first pair registered under `key`, or a
/// one-element sequence containing `None` when absent.
pub fn find<'a>(key: impl Into<ControlKey>) -> PipeOp<'a> {
    let key = key.into();
    Box::new(move |entries: Entries<'a>| {
        let found = entries
            .into_iter()
            .flatten()
            .find(|entry| *entry.key() == key);
        vec![found]
    })
}

/// Invokes `callback` for side effects and passes the sequence through
/// unchanged.
pub fn tap<'a>(mut callback: impl FnMut(&Entries<'a>) + 'a) -> PipeOp<'a> {
    Box::new(move |entries: Entries<'a>| {
        callback(&entries);
        entries
    })
}

/// New sequence with `callback` applied to each element.
pub fn map<'a>(
    mut callback: impl FnMut(Option<SnapshotEntry<'a>>) -> Option<SnapshotEntry<'a>> + 'a,
) -> PipeOp<'a> {
    Box::new(move |entries: Entries<'a>| entries.into_iter().map(&mut callback).collect())
}
