//! Resource model.
//!
//! Resources are the entities tasks occupy while running: machines, rooms,
//! people, vehicles. A resource admits `size` concurrent units; a size of 1
//! makes it disjunctive.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A resource tasks can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource name within its scenario.
    pub name: String,
    /// Number of units available simultaneously (default: 1).
    pub size: i64,
    /// Periods this resource is available. `None` = always available.
    pub periods: Option<Vec<i64>>,
    /// Named per-period weight vectors multiplying task attribute weights
    /// during capacity slicing. A missing entry means weight 1 everywhere.
    pub period_weights: HashMap<String, Vec<i64>>,
    /// Objective cost per occupied period, if any.
    pub cost_per_period: Option<i64>,
}

impl Resource {
    /// Creates a new resource of size 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 1,
            periods: None,
            period_weights: HashMap::new(),
            cost_per_period: None,
        }
    }

    /// Sets the concurrency capacity.
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Restricts the periods this resource is available.
    pub fn with_periods(mut self, periods: impl Into<Vec<i64>>) -> Self {
        self.periods = Some(periods.into());
        self
    }

    /// Attaches a per-period weight vector for an attribute.
    pub fn with_period_weights(
        mut self,
        attribute: impl Into<String>,
        weights: impl Into<Vec<i64>>,
    ) -> Self {
        self.period_weights.insert(attribute.into(), weights.into());
        self
    }

    /// Sets the per-occupied-period objective cost.
    pub fn with_cost_per_period(mut self, cost: i64) -> Self {
        self.cost_per_period = Some(cost);
        self
    }

    /// Whether the resource is available at period `t`.
    pub fn available_at(&self, t: i64) -> bool {
        match &self.periods {
            None => true,
            Some(periods) => periods.contains(&t),
        }
    }

    /// Per-period capacity weight multiplier for an attribute at period `t`.
    pub fn period_weight(&self, attribute: &str, t: i64) -> i64 {
        match self.period_weights.get(attribute) {
            Some(weights) => usize::try_from(t)
                .ok()
                .and_then(|i| weights.get(i).copied())
                .unwrap_or(0),
            None => 1,
        }
    }

    /// Whether any per-period weight vector is attached to `attribute`.
    pub fn has_period_weights(&self, attribute: &str) -> bool {
        self.period_weights.contains_key(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_builder() {
        let r = Resource::new("R1")
            .with_size(3)
            .with_cost_per_period(10)
            .with_periods(vec![1, 3, 4]);

        assert_eq!(r.name, "R1");
        assert_eq!(r.size, 3);
        assert_eq!(r.cost_per_period, Some(10));
        assert!(r.available_at(3));
        assert!(!r.available_at(0));
    }

    #[test]
    fn test_default_size_is_one() {
        assert_eq!(Resource::new("R").size, 1);
    }

    #[test]
    fn test_always_available_without_periods() {
        let r = Resource::new("R");
        assert!(r.available_at(0));
        assert!(r.available_at(1_000_000));
    }

    #[test]
    fn test_period_weights() {
        let r = Resource::new("R").with_period_weights("load", vec![2, 0, 1]);
        assert_eq!(r.period_weight("load", 0), 2);
        assert_eq!(r.period_weight("load", 1), 0);
        assert_eq!(r.period_weight("load", 2), 1);
        // Out of range or unknown attributes fall back.
        assert_eq!(r.period_weight("load", 9), 0);
        assert_eq!(r.period_weight("other", 9), 1);
        assert!(r.has_period_weights("load"));
        assert!(!r.has_period_weights("other"));
    }
}
