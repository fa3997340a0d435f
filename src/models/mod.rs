//! Scheduling domain models.
//!
//! The declarative core: a `Scenario` owns `Task`s, `Resource`s, and an
//! ordered list of typed `Constraint`s built through the constraint
//! algebra. Backends read this model and write solved start times and
//! resource assignments back into it.

mod constraint;
mod resource;
mod scenario;
mod solution;
mod task;

pub use constraint::{
    Aggregate, BoundKind, CapacityBound, Comparator, Constraint, PrecedenceKind,
};
pub use resource::Resource;
pub use scenario::Scenario;
pub use solution::SolutionEntry;
pub use task::{ResourceRequirement, Task, LENGTH_ATTRIBUTE};
