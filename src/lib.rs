pub mod control;
pub mod form;
pub mod id;
pub mod operators;
pub mod snapshot;
pub mod status;
pub mod validation;
pub mod validators;
pub mod value;


pub use control::{Aggregator, ControlEntries, ControlKey, array_value, object_value};
pub use form::{Form, FormError, FormResult, PipeOp};
pub use id::{ControlId, IdGenerator, RandomIds, SequentialIds};
pub use operators::{find, map, tap};
pub use snapshot::{ControlView, Entries, LazyValue, PathSegment, Snapshot, SnapshotEntry};
pub use status::{
    ChildState, ControlStatus, GroupStatus, LeafStatus, StatusContext, StatusPredicate,
};
pub use validation::{ErrorKey, Validator, ValidatorFn, ValidatorSet};
pub use value::Value;
