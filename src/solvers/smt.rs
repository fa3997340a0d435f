//! SMT backend.
//!
//! Compiles a scenario into quantifier-free linear integer arithmetic over
//! `z3`: one integer term per task start, asserted into
//! `[0, horizon − length]`, with every precedence and bound constraint as
//! a linear assertion.
//!
//! Resource occupation is deliberately out of scope here: scenarios with
//! alternative-resource choice, capacity constraints, optional tasks, or
//! availability periods are rejected up front, and a satisfying model
//! writes back start values only — resource fields are left untouched.
//! Callers needing resource reasoning use the MIP or CP backend.
//!
//! The decision procedure runs to completion or `unknown`; the advisory
//! time limit is not forwarded.

use std::collections::BTreeMap;

use log::{debug, info};
use z3::ast::{Ast, Int};
use z3::{Config, Context, SatResult, Solver};

use crate::error::{Result, ScheduleError};
use crate::models::{BoundKind, Constraint, PrecedenceKind, Scenario};
use crate::solvers::{prepare, Backend, Capability, SolveOptions};

/// The SMT backend. Stateless; one value can serve many scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtBackend;

impl SmtBackend {
    pub fn new() -> Self {
        Self
    }
}

const SUPPORTED: &[Capability] = &[];

impl Backend for SmtBackend {
    fn name(&self) -> &'static str {
        "smt"
    }

    fn supported(&self) -> &'static [Capability] {
        SUPPORTED
    }

    fn solve(&self, scenario: &mut Scenario, options: &SolveOptions) -> Result<bool> {
        if options.copy_scenario {
            let mut copy = scenario.clone();
            let mut inner = options.clone();
            inner.copy_scenario = false;
            return self.solve(&mut copy, &inner);
        }

        prepare(self, scenario)?;
        if options.time_limit.is_some() && options.msg {
            debug!("smt: the decision procedure runs to completion; time limit ignored");
        }

        let config = Config::new();
        let context = Context::new(&config);
        let solver = Solver::new(&context);

        let starts: Vec<Int> = scenario
            .tasks()
            .iter()
            .map(|task| {
                let start = Int::new_const(&context, task.name.as_str());
                solver.assert(&start.ge(&Int::from_i64(&context, 0)));
                solver.assert(&start.le(&Int::from_i64(
                    &context,
                    scenario.horizon - task.length,
                )));
                start
            })
            .collect();

        let task_index: BTreeMap<&str, usize> = scenario
            .tasks()
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();

        for item in scenario.active_constraints() {
            match item {
                Constraint::Precedence {
                    left,
                    right,
                    offset,
                    kind,
                } => {
                    let li = task_index[left.as_str()];
                    let gap = scenario.tasks()[li].length + offset;
                    let lead = &starts[li] + Int::from_i64(&context, gap);
                    let follower = &starts[task_index[right.as_str()]];
                    match kind {
                        PrecedenceKind::Lax => solver.assert(&lead.le(follower)),
                        PrecedenceKind::Tight => solver.assert(&lead._eq(follower)),
                    }
                }
                Constraint::Bound { task, bound, kind } => {
                    let ti = task_index[task.as_str()];
                    let length = scenario.tasks()[ti].length;
                    let start = &starts[ti];
                    let value = Int::from_i64(&context, *bound);
                    match kind {
                        BoundKind::EarliestStart => solver.assert(&start.ge(&value)),
                        BoundKind::LatestEnd => {
                            let end = start + Int::from_i64(&context, length);
                            solver.assert(&end.le(&value));
                        }
                        BoundKind::ExactStart => solver.assert(&start._eq(&value)),
                        BoundKind::ExactEnd => {
                            let end = start + Int::from_i64(&context, length);
                            solver.assert(&end._eq(&value));
                        }
                    }
                }
                // Ruled out by the capability check.
                Constraint::Capacity(_) => unreachable!("capacity is rejected up front"),
            }
        }

        if options.msg {
            info!(
                "smt: scenario '{}' compiled into {} assertions",
                scenario.name,
                solver.get_assertions().len()
            );
        }

        match solver.check() {
            SatResult::Unsat => {
                if options.msg {
                    info!("smt: scenario '{}' proven unsatisfiable", scenario.name);
                }
                return Ok(false);
            }
            SatResult::Unknown => {
                if options.msg {
                    info!("smt: verdict unknown for scenario '{}'", scenario.name);
                }
                return Ok(false);
            }
            SatResult::Sat => {}
        }

        let model = solver.get_model().ok_or_else(|| ScheduleError::Solver {
            backend: self.name(),
            message: "satisfiable verdict without a model".into(),
        })?;

        // Read the full model before mutating anything. Start values only;
        // resource assignment is not modeled by this backend.
        let mut values = Vec::with_capacity(starts.len());
        for (task, start) in scenario.tasks().iter().zip(&starts) {
            let value = model
                .eval(start, true)
                .and_then(|v| v.as_i64())
                .ok_or_else(|| ScheduleError::Solver {
                    backend: self.name(),
                    message: format!("no model value for task '{}'", task.name),
                })?;
            values.push(value);
        }

        for (task, value) in scenario.tasks_mut().iter_mut().zip(values) {
            task.start_value = Some(value);
        }

        Ok(true)
    }
}
