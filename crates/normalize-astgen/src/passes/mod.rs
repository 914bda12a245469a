//! Table passes, in pipeline order: merge, flatten, extract.

mod extract;
mod flatten;
mod merge;

pub use extract::ExtractionReport;
pub use flatten::{FlattenPolicy, FlattenReport, ForcedFlatten};
pub use merge::{ExtendsPolicy, MergeOutcome};
