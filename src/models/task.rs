//! Task model.
//!
//! A task is the unit of work to be placed on the timeline: it has an
//! integer length, objective costs, and an ordered list of resource
//! requirement groups describing which resources it occupies while running.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The implicit attribute carried by every task, valued at its length.
///
/// Capacity constraints over this attribute bound plain occupancy:
/// the per-period weight of every non-empty task is 1.
pub const LENGTH_ATTRIBUTE: &str = "length";

/// A task to be scheduled.
///
/// All times are discrete periods relative to the scenario origin (t=0).
/// `start_value` and `resources` are populated by a backend on a successful
/// solve and are `None` before that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task name within its scenario.
    pub name: String,
    /// Processing length in periods (≥ 0; zero-length tasks occupy nothing).
    pub length: i64,
    /// Objective coefficient on the task's completion time.
    pub delay_cost: i64,
    /// Fixed objective cost incurred if the task is scheduled at all.
    /// When set, the task becomes optional: a backend may leave it out.
    pub schedule_cost: Option<i64>,
    /// Resources the task must use, regardless of requirement alternatives.
    pub pinned: Vec<String>,
    /// Ordered requirement groups; each group draws `multiplicity`
    /// resources from its candidate set.
    pub requirements: Vec<ResourceRequirement>,
    /// Periods this task may occupy. `None` = anywhere within the horizon.
    pub periods: Option<Vec<i64>>,
    /// Named numeric attributes consumed by capacity slicing.
    pub attributes: HashMap<String, i64>,
    /// Start period assigned by the last successful solve.
    pub start_value: Option<i64>,
    /// Resources resolved by the last successful solve.
    pub resources: Option<Vec<String>>,
}

/// A group of interchangeable resources a task draws from.
///
/// Exactly `multiplicity` distinct candidates must be selected; the task
/// occupies every selected resource for its whole duration. A plain single
/// resource is a group with one candidate and multiplicity 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequirement {
    /// Candidate resource names.
    pub candidates: Vec<String>,
    /// How many candidates must be used.
    pub multiplicity: usize,
}

impl Task {
    /// Creates a new task with length 1 and no costs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: 1,
            delay_cost: 0,
            schedule_cost: None,
            pinned: Vec::new(),
            requirements: Vec::new(),
            periods: None,
            attributes: HashMap::new(),
            start_value: None,
            resources: None,
        }
    }

    /// Sets the processing length in periods.
    pub fn with_length(mut self, length: i64) -> Self {
        self.length = length;
        self
    }

    /// Sets the completion-time objective coefficient.
    pub fn with_delay_cost(mut self, delay_cost: i64) -> Self {
        self.delay_cost = delay_cost;
        self
    }

    /// Sets the fixed scheduling cost, making the task optional.
    pub fn with_schedule_cost(mut self, schedule_cost: i64) -> Self {
        self.schedule_cost = Some(schedule_cost);
        self
    }

    /// Requires a single specific resource.
    pub fn with_resource(self, resource: impl Into<String>) -> Self {
        self.with_requirement(ResourceRequirement::single(resource))
    }

    /// Adds a requirement group.
    pub fn with_requirement(mut self, requirement: ResourceRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Pins a resource: it must be among the selected candidates.
    pub fn with_pinned(mut self, resource: impl Into<String>) -> Self {
        self.pinned.push(resource.into());
        self
    }

    /// Restricts the periods this task may occupy.
    pub fn with_periods(mut self, periods: impl Into<Vec<i64>>) -> Self {
        self.periods = Some(periods.into());
        self
    }

    /// Adds a named numeric attribute for capacity slicing.
    pub fn with_attribute(mut self, name: impl Into<String>, value: i64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Completion time, once solved.
    pub fn end_value(&self) -> Option<i64> {
        self.start_value.map(|s| s + self.length)
    }

    /// Whether a backend may leave this task unscheduled.
    pub fn is_optional(&self) -> bool {
        self.schedule_cost.is_some()
    }

    /// Attribute value, with `"length"` implicitly defined for every task.
    pub fn attribute(&self, name: &str) -> Option<i64> {
        match self.attributes.get(name) {
            Some(v) => Some(*v),
            None if name == LENGTH_ATTRIBUTE => Some(self.length),
            None => None,
        }
    }

    /// All candidate resource names across requirement groups, deduplicated,
    /// in first-mention order.
    pub fn candidate_resources(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for req in &self.requirements {
            for cand in &req.candidates {
                if !seen.contains(&cand.as_str()) {
                    seen.push(cand.as_str());
                }
            }
        }
        seen
    }

    /// Whether `t` is an admissible period for this task.
    pub fn allows_period(&self, t: i64) -> bool {
        match &self.periods {
            None => true,
            Some(periods) => periods.contains(&t),
        }
    }
}

impl ResourceRequirement {
    /// A group with a single mandatory resource.
    pub fn single(resource: impl Into<String>) -> Self {
        Self {
            candidates: vec![resource.into()],
            multiplicity: 1,
        }
    }

    /// Any one resource out of the candidates.
    pub fn one_of(candidates: impl Into<Vec<String>>) -> Self {
        Self {
            candidates: candidates.into(),
            multiplicity: 1,
        }
    }

    /// Exactly `multiplicity` distinct resources out of the candidates.
    pub fn choose(candidates: impl Into<Vec<String>>, multiplicity: usize) -> Self {
        Self {
            candidates: candidates.into(),
            multiplicity,
        }
    }

    /// Whether every candidate must be selected.
    pub fn is_forced(&self) -> bool {
        self.candidates.len() == self.multiplicity
    }
}
