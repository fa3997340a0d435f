//! Horarium: a scheduling-constraint compiler.
//!
//! Callers describe a resource-constrained scheduling problem — tasks with
//! durations and costs, resources with concurrency capacities, and a typed
//! constraint algebra (precedence, bounds, capacity limits,
//! alternative-resource choice) — and compile it into the native model of
//! one of several interchangeable combinatorial solvers, then read a
//! concrete timetable back.
//!
//! # Modules
//!
//! - **`models`**: the declarative core — `Scenario`, `Task`, `Resource`,
//!   `ResourceRequirement`, `Constraint`, `SolutionEntry`
//! - **`solvers`**: backend adapters sharing one solve contract —
//!   `MipBackend` (`good_lp`), `CpBackend` (`pumpkin-solver`),
//!   `SmtBackend` (`z3`) — plus the batched `IncrementalScheduler`
//! - **`validation`**: structural integrity checks run before compiling
//!
//! # Example
//!
//! ```no_run
//! use horarium::{Backend, MipBackend, Resource, Scenario, SolveOptions, Task};
//!
//! # fn main() -> horarium::Result<()> {
//! let mut scenario = Scenario::new("household", 10);
//! scenario.add_resource(Resource::new("alice"))?;
//! scenario.add_task(Task::new("cook").with_length(1).with_delay_cost(1).with_resource("alice"))?;
//! scenario.add_task(Task::new("wash").with_length(2).with_delay_cost(1).with_resource("alice"))?;
//!
//! if MipBackend::new().solve(&mut scenario, &SolveOptions::new())? {
//!     for entry in scenario.solution() {
//!         println!("{entry}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Solving is synchronous and single-writer: an adapter either writes a
//! complete solution back or leaves the scenario exactly as it found it.

pub mod models;
pub mod solvers;
pub mod validation;

mod error;

pub use error::{Result, ScheduleError};
pub use models::{
    Aggregate, BoundKind, CapacityBound, Comparator, Constraint, PrecedenceKind, Resource,
    ResourceRequirement, Scenario, SolutionEntry, Task,
};
pub use solvers::{
    Backend, Capability, CpBackend, IncrementalScheduler, MipBackend, SmtBackend, SolveOptions,
};
