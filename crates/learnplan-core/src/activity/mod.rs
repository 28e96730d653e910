//! Course activities as seen by the planner.
//!
//! Everything module-type specific is resolved here, at the boundary with
//! the host platform; the rest of the engine only sees [`ObjectKind`] and
//! the uniform [`InteractionInfo`] union.

mod provider;
mod types;

pub use provider::{ActivityCatalog, ActivityProvider, CatalogActivity, ProgressRecord};
pub use types::{
    classify, ActivityConfig, ActivityInfo, ActivityRef, InteractionInfo, ModuleType,
    ObjectKind, PracticeOutcome,
};
