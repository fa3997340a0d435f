//! The constraint algebra.
//!
//! Constraints are plain typed values produced by builder functions; they
//! only take effect once attached to a scenario. Backends translate each
//! kind into their solver's native primitives.
//!
//! Capacity aggregation semantics:
//! - `Sum` bounds total weighted occupancy over a window,
//! - `Max` bounds peak per-period weighted occupancy,
//! - `Diff` bounds the total increase between consecutive periods'
//!   weighted occupancy (discourages switching).

use serde::{Deserialize, Serialize};

/// A typed scheduling constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constraint {
    /// Ordering between two tasks' start times.
    ///
    /// Lax: `start(right) ≥ start(left) + length(left) + offset`.
    /// Tight: equality instead.
    Precedence {
        left: String,
        right: String,
        offset: i64,
        kind: PrecedenceKind,
    },

    /// Bound on a single task's start or end.
    Bound {
        task: String,
        bound: i64,
        kind: BoundKind,
    },

    /// Bound on aggregated weighted occupancy of a resource over a window.
    Capacity(CapacityBound),
}

/// Whether a precedence is an inequality or an equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecedenceKind {
    /// "No earlier than": the right task starts at or after the left ends.
    Lax,
    /// "Exactly at": the right task starts exactly when the left ends.
    Tight,
}

/// Which side of a task a bound applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundKind {
    /// `start ≥ bound`.
    EarliestStart,
    /// `end ≤ bound`.
    LatestEnd,
    /// `start == bound`.
    ExactStart,
    /// `end == bound`.
    ExactEnd,
}

/// How per-period weighted occupancy is aggregated over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
    /// Total over the window.
    Sum,
    /// Peak of any single period.
    Max,
    /// Total increase between consecutive periods.
    Diff,
}

/// Comparison between the aggregate and the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// Aggregate ≤ bound.
    Le,
    /// Aggregate ≥ bound.
    Ge,
    /// Aggregate == bound.
    Eq,
}

/// A capacity constraint under construction or attached to a scenario.
///
/// The weight of a task occupying the resource in one period is its
/// attribute value divided by its length (so the window-wide sum of the
/// `"length"` attribute counts occupied periods), multiplied by the
/// resource's per-period weight for the attribute when one is attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityBound {
    /// Resource whose occupancy is bounded.
    pub resource: String,
    /// Task attribute supplying the weights.
    pub attribute: String,
    /// Window start (inclusive). `None` = from the origin.
    pub from: Option<i64>,
    /// Window end (exclusive). `None` = to the horizon.
    pub until: Option<i64>,
    /// Aggregation applied over the window.
    pub aggregate: Aggregate,
    /// Comparison against `bound`.
    pub comparator: Comparator,
    /// Right-hand side of the comparison.
    pub bound: i64,
}

impl Constraint {
    /// Lax precedence: `right` starts no earlier than `left` ends, plus
    /// `offset` periods.
    pub fn precedence_lax(
        left: impl Into<String>,
        right: impl Into<String>,
        offset: i64,
    ) -> Self {
        Self::Precedence {
            left: left.into(),
            right: right.into(),
            offset,
            kind: PrecedenceKind::Lax,
        }
    }

    /// Tight precedence: `right` starts exactly when `left` ends, plus
    /// `offset` periods.
    pub fn precedence_tight(
        left: impl Into<String>,
        right: impl Into<String>,
        offset: i64,
    ) -> Self {
        Self::Precedence {
            left: left.into(),
            right: right.into(),
            offset,
            kind: PrecedenceKind::Tight,
        }
    }

    /// The task may not start before `bound`.
    pub fn earliest_start(task: impl Into<String>, bound: i64) -> Self {
        Self::Bound {
            task: task.into(),
            bound,
            kind: BoundKind::EarliestStart,
        }
    }

    /// The task must end at or before `bound`.
    pub fn latest_end(task: impl Into<String>, bound: i64) -> Self {
        Self::Bound {
            task: task.into(),
            bound,
            kind: BoundKind::LatestEnd,
        }
    }

    /// The task starts exactly at `bound`.
    pub fn exact_start(task: impl Into<String>, bound: i64) -> Self {
        Self::Bound {
            task: task.into(),
            bound,
            kind: BoundKind::ExactStart,
        }
    }

    /// The task ends exactly at `bound`.
    pub fn exact_end(task: impl Into<String>, bound: i64) -> Self {
        Self::Bound {
            task: task.into(),
            bound,
            kind: BoundKind::ExactEnd,
        }
    }

    /// Task names this constraint refers to. Capacity constraints refer to
    /// resources only and return an empty list.
    pub fn task_refs(&self) -> Vec<&str> {
        match self {
            Self::Precedence { left, right, .. } => vec![left, right],
            Self::Bound { task, .. } => vec![task],
            Self::Capacity(_) => Vec::new(),
        }
    }
}

impl CapacityBound {
    /// Starts a Sum-aggregated capacity bound for a resource attribute.
    pub fn sum(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::with_aggregate(resource, attribute, Aggregate::Sum)
    }

    /// Starts a Max-aggregated capacity bound.
    pub fn max(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::with_aggregate(resource, attribute, Aggregate::Max)
    }

    /// Starts a Diff-aggregated capacity bound.
    pub fn diff(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::with_aggregate(resource, attribute, Aggregate::Diff)
    }

    fn with_aggregate(
        resource: impl Into<String>,
        attribute: impl Into<String>,
        aggregate: Aggregate,
    ) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
            from: None,
            until: None,
            aggregate,
            comparator: Comparator::Le,
            bound: 0,
        }
    }

    /// Restricts the window to `[from, until)`.
    pub fn window(mut self, from: i64, until: i64) -> Self {
        self.from = Some(from);
        self.until = Some(until);
        self
    }

    /// Restricts the window start (inclusive).
    pub fn from_period(mut self, from: i64) -> Self {
        self.from = Some(from);
        self
    }

    /// Restricts the window end (exclusive).
    pub fn until_period(mut self, until: i64) -> Self {
        self.until = Some(until);
        self
    }

    /// Finishes with `aggregate ≤ bound`.
    pub fn at_most(mut self, bound: i64) -> Constraint {
        self.comparator = Comparator::Le;
        self.bound = bound;
        Constraint::Capacity(self)
    }

    /// Finishes with `aggregate ≥ bound`.
    pub fn at_least(mut self, bound: i64) -> Constraint {
        self.comparator = Comparator::Ge;
        self.bound = bound;
        Constraint::Capacity(self)
    }

    /// Finishes with `aggregate == bound`.
    pub fn exactly(mut self, bound: i64) -> Constraint {
        self.comparator = Comparator::Eq;
        self.bound = bound;
        Constraint::Capacity(self)
    }

    /// Whether the window covers the whole horizon.
    pub fn is_whole_horizon(&self) -> bool {
        self.from.is_none() && self.until.is_none()
    }

    /// Concrete window `[from, until)` for a given horizon.
    pub fn resolved_window(&self, horizon: i64) -> (i64, i64) {
        (
            self.from.unwrap_or(0).max(0),
            self.until.unwrap_or(horizon).min(horizon),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_builders() {
        let lax = Constraint::precedence_lax("A", "B", 2);
        match lax {
            Constraint::Precedence {
                left,
                right,
                offset,
                kind,
            } => {
                assert_eq!(left, "A");
                assert_eq!(right, "B");
                assert_eq!(offset, 2);
                assert_eq!(kind, PrecedenceKind::Lax);
            }
            _ => panic!("wrong variant"),
        }

        match Constraint::precedence_tight("A", "B", 0) {
            Constraint::Precedence { kind, .. } => assert_eq!(kind, PrecedenceKind::Tight),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_bound_builders() {
        match Constraint::earliest_start("T", 3) {
            Constraint::Bound { task, bound, kind } => {
                assert_eq!(task, "T");
                assert_eq!(bound, 3);
                assert_eq!(kind, BoundKind::EarliestStart);
            }
            _ => panic!("wrong variant"),
        }
        match Constraint::latest_end("T", 5) {
            Constraint::Bound { kind, .. } => assert_eq!(kind, BoundKind::LatestEnd),
            _ => panic!("wrong variant"),
        }
        match Constraint::exact_start("T", 5) {
            Constraint::Bound { kind, .. } => assert_eq!(kind, BoundKind::ExactStart),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_capacity_builder_chain() {
        let c = CapacityBound::sum("R1", "length").window(0, 3).at_most(1);
        match c {
            Constraint::Capacity(cap) => {
                assert_eq!(cap.resource, "R1");
                assert_eq!(cap.attribute, "length");
                assert_eq!(cap.from, Some(0));
                assert_eq!(cap.until, Some(3));
                assert_eq!(cap.aggregate, Aggregate::Sum);
                assert_eq!(cap.comparator, Comparator::Le);
                assert_eq!(cap.bound, 1);
                assert!(!cap.is_whole_horizon());
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_capacity_whole_horizon_window() {
        let c = CapacityBound::max("R1", "length").at_most(2);
        match c {
            Constraint::Capacity(cap) => {
                assert!(cap.is_whole_horizon());
                assert_eq!(cap.resolved_window(10), (0, 10));
            }
            _ => panic!("wrong variant"),
        }

        let c = CapacityBound::diff("R1", "length").from_period(5).at_most(0);
        match c {
            Constraint::Capacity(cap) => {
                assert_eq!(cap.resolved_window(10), (5, 10));
                assert_eq!(cap.aggregate, Aggregate::Diff);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_task_refs() {
        assert_eq!(
            Constraint::precedence_lax("A", "B", 0).task_refs(),
            vec!["A", "B"]
        );
        assert_eq!(Constraint::earliest_start("T", 1).task_refs(), vec!["T"]);
        assert!(CapacityBound::sum("R", "length")
            .at_most(1)
            .task_refs()
            .is_empty());
    }
}
