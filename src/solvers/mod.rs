//! Backend adapters.
//!
//! Each adapter compiles a [`Scenario`] into one external solver's native
//! model, invokes it, and writes the solution back on success:
//!
//! - [`MipBackend`]: mixed-integer programming via `good_lp`,
//! - [`CpBackend`]: constraint programming via `pumpkin-solver`,
//! - [`SmtBackend`]: quantifier-free integer arithmetic via `z3`,
//! - [`IncrementalScheduler`]: batched list scheduling on top of any of
//!   the above.
//!
//! All adapters share one call shape: solving returns `Ok(true)` with a
//! full write-back, or `Ok(false)` with zero mutation when the engine
//! proves infeasibility or exhausts its budget. What a backend *cannot*
//! express is declared up front as a [`Capability`] gap and surfaces as an
//! error before any solving, never as a silently wrong schedule.

mod cp;
mod listsched;
mod mip;
mod smt;

pub use cp::CpBackend;
pub use listsched::IncrementalScheduler;
pub use mip::MipBackend;
pub use smt::SmtBackend;

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::models::{Aggregate, Constraint, Scenario};

/// Options shared by every backend's solve call.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Advisory wall-clock budget. Backends honor it where their engine
    /// can; the SMT backend runs to completion regardless.
    pub time_limit: Option<Duration>,
    /// Solve a deep copy and leave the caller's scenario untouched even on
    /// success.
    pub copy_scenario: bool,
    /// Emit per-solve diagnostics through the `log` crate.
    pub msg: bool,
}

impl SolveOptions {
    /// Default options: no time limit, in-place solve, quiet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the advisory wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Solves a deep copy instead of the caller's scenario.
    pub fn with_copy_scenario(mut self) -> Self {
        self.copy_scenario = true;
        self
    }

    /// Enables diagnostic logging for this solve.
    pub fn with_msg(mut self) -> Self {
        self.msg = true;
        self
    }
}

/// A model feature a scenario may demand from a backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Capability {
    /// Requirement groups with more candidates than their multiplicity.
    ResourceChoice,
    /// Resources with size > 1 (concurrent units).
    Cumulative,
    /// Whole-horizon Sum capacity constraints.
    CapacitySum,
    /// Capacity constraints over a partial window or with per-period
    /// resource weights.
    CapacitySliced,
    /// Max-aggregated capacity constraints.
    CapacityMax,
    /// Diff-aggregated capacity constraints.
    CapacityDiff,
    /// Optional tasks carrying a schedule cost.
    OptionalTasks,
    /// Task or resource availability periods.
    AvailabilityPeriods,
    /// Resource occupation costs per period.
    PeriodCosts,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ResourceChoice => "alternative-resource choice",
            Self::Cumulative => "resources with size > 1",
            Self::CapacitySum => "capacity constraints",
            Self::CapacitySliced => "sliced capacity constraints",
            Self::CapacityMax => "max-aggregated capacity constraints",
            Self::CapacityDiff => "diff-aggregated capacity constraints",
            Self::OptionalTasks => "optional tasks with schedule costs",
            Self::AvailabilityPeriods => "availability periods",
            Self::PeriodCosts => "per-period resource costs",
        };
        f.write_str(text)
    }
}

/// Capabilities a scenario structurally requires.
pub fn required_capabilities(scenario: &Scenario) -> BTreeSet<Capability> {
    let mut required = BTreeSet::new();

    for task in scenario.tasks() {
        if task.is_optional() {
            required.insert(Capability::OptionalTasks);
        }
        if task.periods.is_some() {
            required.insert(Capability::AvailabilityPeriods);
        }
        for req in &task.requirements {
            if !req.is_forced() {
                required.insert(Capability::ResourceChoice);
            }
            for cand in &req.candidates {
                if let Some(resource) = scenario.resource(cand) {
                    if resource.size > 1 {
                        required.insert(Capability::Cumulative);
                    }
                }
            }
        }
    }

    for resource in scenario.resources() {
        if resource.periods.is_some() {
            required.insert(Capability::AvailabilityPeriods);
        }
        if resource.cost_per_period.is_some() {
            required.insert(Capability::PeriodCosts);
        }
    }

    for constraint in scenario.constraints() {
        let Constraint::Capacity(cap) = constraint else {
            continue;
        };
        let sliced = !cap.is_whole_horizon()
            || scenario
                .resource(&cap.resource)
                .is_some_and(|r| r.has_period_weights(&cap.attribute));
        match cap.aggregate {
            Aggregate::Sum => {
                required.insert(Capability::CapacitySum);
            }
            Aggregate::Max => {
                required.insert(Capability::CapacityMax);
            }
            Aggregate::Diff => {
                required.insert(Capability::CapacityDiff);
            }
        }
        if sliced {
            required.insert(Capability::CapacitySliced);
        }
    }

    required
}

/// A solver family behind the shared solve contract.
pub trait Backend {
    /// Short backend identifier used in errors and logs.
    fn name(&self) -> &'static str;

    /// The capabilities this backend can compile.
    fn supported(&self) -> &'static [Capability];

    /// Compiles and solves the scenario.
    ///
    /// `Ok(true)`: a solution was found and written back.
    /// `Ok(false)`: proven infeasible or budget exhausted; zero mutation.
    fn solve(&self, scenario: &mut Scenario, options: &SolveOptions) -> Result<bool>;

    /// Rejects scenarios demanding capabilities this backend lacks.
    fn check_support(&self, scenario: &Scenario) -> Result<()> {
        check_supported_set(self, scenario)
    }
}

/// The default capability check: every required capability must be in the
/// backend's supported set.
pub(crate) fn check_supported_set<B: Backend + ?Sized>(
    backend: &B,
    scenario: &Scenario,
) -> Result<()> {
    let supported = backend.supported();
    for capability in required_capabilities(scenario) {
        if !supported.contains(&capability) {
            return Err(ScheduleError::Unsupported {
                backend: backend.name(),
                capability,
            });
        }
    }
    Ok(())
}

/// Shared validation run by every backend before compiling.
pub(crate) fn prepare(backend: &dyn Backend, scenario: &Scenario) -> Result<()> {
    crate::validation::validate(scenario).map_err(|errors| ScheduleError::Invalid { errors })?;
    backend.check_support(scenario)
}
