//! Structural validation of scenarios.
//!
//! Run by every backend before compiling a model. Detects:
//! - requirement groups referencing unknown resources,
//! - multiplicities exceeding their candidate sets,
//! - pinned resources that are not candidates anywhere,
//! - capacity weights that do not divide evenly per period,
//! - capacity constraints on unknown resources,
//! - aggregate/comparator combinations with no linear encoding.
//!
//! Stale task references in constraints are not validation errors; they
//! are dropped at solve time by [`Scenario::active_constraints`].

use std::collections::HashSet;

use crate::models::{Aggregate, Comparator, Constraint, Scenario};

/// Validation result: all detected issues, or nothing.
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A requirement or capacity constraint names a resource that does not
    /// exist in the scenario.
    UnknownResource,
    /// An explicitly supplied task order does not match the task set.
    UnknownTask,
    /// A requirement group asks for more resources than it has candidates.
    BadMultiplicity,
    /// A pinned resource is not a candidate of any requirement group.
    BadPin,
    /// A capacity weight does not divide evenly over the task length.
    FractionalWeight,
    /// An aggregate/comparator pair that cannot be encoded.
    BadAggregate,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a scenario against the structural rules above.
///
/// Returns `Ok(())` if all checks pass, `Err(errors)` with every detected
/// issue otherwise.
pub fn validate(scenario: &Scenario) -> ValidationResult {
    let mut errors = Vec::new();

    let resource_names: HashSet<&str> = scenario
        .resources()
        .iter()
        .map(|r| r.name.as_str())
        .collect();

    for task in scenario.tasks() {
        for req in &task.requirements {
            if req.multiplicity > req.candidates.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BadMultiplicity,
                    format!(
                        "task '{}' requires {} of {} candidate resources",
                        task.name,
                        req.multiplicity,
                        req.candidates.len()
                    ),
                ));
            }
            for cand in &req.candidates {
                if !resource_names.contains(cand.as_str()) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownResource,
                        format!("task '{}' references unknown resource '{cand}'", task.name),
                    ));
                }
            }
        }

        let candidates = task.candidate_resources();
        for pin in &task.pinned {
            if !candidates.contains(&pin.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BadPin,
                    format!(
                        "task '{}' pins resource '{pin}' which is not a candidate",
                        task.name
                    ),
                ));
            }
        }
    }

    for constraint in scenario.constraints() {
        let Constraint::Capacity(cap) = constraint else {
            continue;
        };

        if !resource_names.contains(cap.resource.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownResource,
                format!("capacity constraint references unknown resource '{}'", cap.resource),
            ));
        }

        // Max and Diff aggregates only admit upper bounds: a lower bound on
        // a peak or on total increase is a disjunction, not a linear row.
        if cap.aggregate != Aggregate::Sum && cap.comparator != Comparator::Le {
            errors.push(ValidationError::new(
                ValidationErrorKind::BadAggregate,
                format!(
                    "{:?} aggregation on resource '{}' only supports upper bounds",
                    cap.aggregate, cap.resource
                ),
            ));
        }

        for task in scenario.tasks() {
            let Some(value) = task.attribute(&cap.attribute) else {
                continue;
            };
            if task.length > 0 && value % task.length != 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::FractionalWeight,
                    format!(
                        "attribute '{}' of task '{}' ({value}) is not a multiple of its length {}",
                        cap.attribute, task.name, task.length
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Per-period capacity weight of a task for an attribute: the attribute
/// value spread evenly over the task's length. Zero-length tasks occupy
/// nothing and weigh nothing.
pub(crate) fn per_period_weight(task: &crate::models::Task, attribute: &str) -> i64 {
    match task.attribute(attribute) {
        Some(value) if task.length > 0 => value / task.length,
        _ => 0,
    }
}
