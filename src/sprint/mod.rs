//! Sprint labelling for the QA view and revision labels for the developer view.

pub mod annotation;
pub mod overrides;
pub mod resolve;

pub use annotation::{label_from_annotation, SPRINT_KEY};
pub use overrides::OverrideMap;
pub use resolve::{
    duplicate_labels, resolve, LabelAssignment, LabelScheme, ShiftPolicy, SprintLabel,
    SprintScheme,
};
