//! Solution readback model.
//!
//! The flat (task, resource, start, end) tuple sequence consumed by
//! reporting and plotting collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One (task, resource, start, end) entry of a solved timetable.
///
/// `end == start + length`; a zero-length task yields `start == end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionEntry {
    /// Task name.
    pub task: String,
    /// One of the resources resolved for the task.
    pub resource: String,
    /// Start period.
    pub start: i64,
    /// End period (exclusive).
    pub end: i64,
}

impl fmt::Display for SolutionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.task, self.resource, self.start, self.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let entry = SolutionEntry {
            task: "T1".into(),
            resource: "R1".into(),
            start: 0,
            end: 1,
        };
        assert_eq!(entry.to_string(), "(T1, R1, 0, 1)");
    }

    #[test]
    fn test_serialization() {
        let entry = SolutionEntry {
            task: "T1".into(),
            resource: "R1".into(),
            start: 2,
            end: 4,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: SolutionEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
