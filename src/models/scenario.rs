//! Scenario: the top-level container for one scheduling problem instance.
//!
//! A scenario owns its tasks, resources, and the ordered constraint list.
//! Names are unique per entity kind; attaching a duplicate fails and leaves
//! the scenario unchanged. Solved values live on the tasks themselves and
//! are only ever written by a backend after a complete solution exists.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::models::{Constraint, Resource, SolutionEntry, Task};

/// A scheduling problem instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Instance name, used in diagnostics.
    pub name: String,
    /// Exclusive upper bound on schedulable discrete time.
    pub horizon: i64,
    tasks: Vec<Task>,
    resources: Vec<Resource>,
    constraints: Vec<Constraint>,
}

impl Scenario {
    /// Creates an empty scenario with the given planning horizon.
    pub fn new(name: impl Into<String>, horizon: i64) -> Self {
        Self {
            name: name.into(),
            horizon,
            tasks: Vec::new(),
            resources: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Attaches a task. Fails on a duplicate name or a negative length,
    /// leaving the scenario unchanged.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if task.length < 0 {
            return Err(ScheduleError::InvalidLength {
                task: task.name,
                length: task.length,
            });
        }
        if self.task(&task.name).is_some() {
            return Err(ScheduleError::DuplicateTask { name: task.name });
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Attaches `count` copies of a template task named `prefix0`,
    /// `prefix1`, … and returns the generated names.
    pub fn add_tasks(&mut self, prefix: &str, count: usize, template: Task) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(count);
        for i in 0..count {
            let mut task = template.clone();
            task.name = format!("{prefix}{i}");
            names.push(task.name.clone());
            self.add_task(task)?;
        }
        Ok(names)
    }

    /// Attaches a resource. Fails on a duplicate name or a non-positive
    /// size, leaving the scenario unchanged.
    pub fn add_resource(&mut self, resource: Resource) -> Result<()> {
        if resource.size < 1 {
            return Err(ScheduleError::InvalidSize {
                resource: resource.name,
                size: resource.size,
            });
        }
        if self.resource(&resource.name).is_some() {
            return Err(ScheduleError::DuplicateResource {
                name: resource.name,
            });
        }
        self.resources.push(resource);
        Ok(())
    }

    /// Attaches `count` copies of a template resource named `prefix0`,
    /// `prefix1`, … and returns the generated names.
    pub fn add_resources(
        &mut self,
        prefix: &str,
        count: usize,
        template: Resource,
    ) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(count);
        for i in 0..count {
            let mut resource = template.clone();
            resource.name = format!("{prefix}{i}");
            names.push(resource.name.clone());
            self.add_resource(resource)?;
        }
        Ok(names)
    }

    /// Appends a constraint. References are checked lazily at solve time.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Tasks in definition order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Resources in definition order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// The full, ordered constraint list as attached.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Looks up a task by name.
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Looks up a task by name, mutably.
    pub fn task_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.name == name)
    }

    /// Tasks in definition order, mutably. Reserved for backends writing a
    /// complete solution back.
    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    /// Looks up a resource by name.
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Removes a task by name, along with nothing else: constraints that
    /// referred to it become stale and are dropped at solve time.
    pub fn remove_task(&mut self, name: &str) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.name == name)?;
        Some(self.tasks.remove(idx))
    }

    /// Constraints valid against the current task set. Constraints whose
    /// task references are no longer present are dropped with a warning.
    pub fn active_constraints(&self) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| {
                let stale = c.task_refs().iter().any(|name| self.task(name).is_none());
                if stale {
                    warn!(
                        "scenario '{}': dropping constraint with stale task reference: {c:?}",
                        self.name
                    );
                }
                !stale
            })
            .collect()
    }

    /// Clears all solved values, returning the scenario to its pre-solve
    /// state.
    pub fn clear_solution(&mut self) {
        for task in &mut self.tasks {
            task.start_value = None;
            task.resources = None;
        }
    }

    /// The solved timetable as an ordered sequence of
    /// (task, resource, start, end) entries — one per resolved
    /// (task, assigned resource) pair, ordered by start time, then task,
    /// then resource. Zero-length tasks appear with `start == end`.
    pub fn solution(&self) -> Vec<SolutionEntry> {
        let mut entries = Vec::new();
        for task in &self.tasks {
            let (Some(start), Some(resources)) = (task.start_value, &task.resources) else {
                continue;
            };
            for resource in resources {
                entries.push(SolutionEntry {
                    task: task.name.clone(),
                    resource: resource.clone(),
                    start,
                    end: start + task.length,
                });
            }
        }
        entries.sort_by(|a, b| {
            (a.start, &a.task, &a.resource).cmp(&(b.start, &b.task, &b.resource))
        });
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceRequirement;

    #[test]
    fn test_duplicate_task_rejected() {
        let mut s = Scenario::new("s", 10);
        s.add_task(Task::new("T")).unwrap();
        assert_eq!(s.tasks().len(), 1);

        let err = s.add_task(Task::new("T")).unwrap_err();
        assert!(matches!(err, ScheduleError::DuplicateTask { .. }));
        assert_eq!(s.tasks().len(), 1);
    }

    #[test]
    fn test_duplicate_resource_rejected() {
        let mut s = Scenario::new("s", 10);
        s.add_resource(Resource::new("R")).unwrap();
        let err = s.add_resource(Resource::new("R")).unwrap_err();
        assert!(matches!(err, ScheduleError::DuplicateResource { .. }));
        assert_eq!(s.resources().len(), 1);
    }

    #[test]
    fn test_negative_length_rejected() {
        let mut s = Scenario::new("s", 10);
        let err = s.add_task(Task::new("T").with_length(-1)).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidLength { .. }));
        assert!(s.tasks().is_empty());
    }

    #[test]
    fn test_non_positive_size_rejected() {
        let mut s = Scenario::new("s", 10);
        let err = s.add_resource(Resource::new("R").with_size(0)).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidSize { .. }));
        assert!(s.resources().is_empty());
    }

    #[test]
    fn test_batch_creation() {
        let mut s = Scenario::new("s", 10);
        let names = s
            .add_tasks("T", 5, Task::new("ignored").with_length(2))
            .unwrap();
        assert_eq!(names, vec!["T0", "T1", "T2", "T3", "T4"]);
        assert_eq!(s.tasks().len(), 5);
        for task in s.tasks() {
            assert_eq!(task.length, 2);
        }

        let names = s.add_resources("R", 2, Resource::new("ignored")).unwrap();
        assert_eq!(names, vec!["R0", "R1"]);
    }

    #[test]
    fn test_stale_constraints_dropped() {
        let mut s = Scenario::new("s", 10);
        s.add_task(Task::new("A")).unwrap();
        s.add_task(Task::new("B")).unwrap();
        s.add_constraint(Constraint::precedence_lax("A", "B", 0));
        s.add_constraint(Constraint::earliest_start("B", 2));
        assert_eq!(s.active_constraints().len(), 2);

        let removed = s.remove_task("A").unwrap();
        assert_eq!(removed.name, "A");
        // The precedence now refers to a missing task and is dropped.
        assert_eq!(s.active_constraints().len(), 1);
        // The attached list itself is untouched.
        assert_eq!(s.constraints().len(), 2);
    }

    #[test]
    fn test_solution_ordering() {
        let mut s = Scenario::new("s", 10);
        s.add_resource(Resource::new("R1")).unwrap();
        s.add_resource(Resource::new("R2")).unwrap();
        s.add_task(Task::new("T2").with_length(2)).unwrap();
        s.add_task(Task::new("T1")).unwrap();

        s.task_mut("T2").unwrap().start_value = Some(1);
        s.task_mut("T2").unwrap().resources = Some(vec!["R1".into()]);
        s.task_mut("T1").unwrap().start_value = Some(0);
        s.task_mut("T1").unwrap().resources = Some(vec!["R2".into(), "R1".into()]);

        let sol = s.solution();
        assert_eq!(sol.len(), 3);
        assert_eq!((sol[0].start, sol[0].resource.as_str()), (0, "R1"));
        assert_eq!((sol[1].start, sol[1].resource.as_str()), (0, "R2"));
        assert_eq!(sol[2].task, "T2");
        assert_eq!(sol[2].end, 3);
    }

    #[test]
    fn test_solution_skips_unsolved_tasks() {
        let mut s = Scenario::new("s", 10);
        s.add_task(Task::new("T")).unwrap();
        assert!(s.solution().is_empty());
    }

    #[test]
    fn test_clear_solution() {
        let mut s = Scenario::new("s", 10);
        s.add_task(
            Task::new("T").with_requirement(ResourceRequirement::single("R")),
        )
        .unwrap();
        s.task_mut("T").unwrap().start_value = Some(4);
        s.task_mut("T").unwrap().resources = Some(vec!["R".into()]);

        s.clear_solution();
        assert!(s.task("T").unwrap().start_value.is_none());
        assert!(s.task("T").unwrap().resources.is_none());
    }
}
