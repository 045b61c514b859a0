use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::robot::{PerformanceLog, Robot};
use crate::model::selector::Selector;
use crate::service::dto::{DatePerformance, Kpis, RobotSummary};

/// Dates shown in a date-based chart unless configured otherwise.
pub const DEFAULT_MAX_POINTS: usize = 10;

/// Derived dashboard views over a snapshot of the robot list. Nothing here
/// is stored; build a new one after every mutation.
pub struct DashboardUseCase<'a> {
    robots: &'a [Robot],
    max_points: usize,
}

impl<'a> DashboardUseCase<'a> {
    pub fn new(robots: &'a [Robot]) -> Self {
        Self {
            robots,
            max_points: DEFAULT_MAX_POINTS,
        }
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points.max(1);
        self
    }

    pub fn kpis(&self) -> Kpis {
        let mut kpis = Kpis {
            robots: self.robots.len(),
            ..Kpis::default()
        };
        for robot in self.robots {
            kpis.tests += robot.performance.len();
            kpis.successes += robot.total_successes();
            kpis.failures += robot.total_failures();

            let completed = robot.completed_tasks();
            kpis.completed_tasks += completed;
            kpis.pending_tasks += robot.tasks.len() - completed;
        }
        kpis
    }

    /// Every date any robot has an entry for, summed over the robots that
    /// have one, ascending, limited to the most recent dates.
    pub fn team_performance_by_date(&self) -> Vec<DatePerformance> {
        let mut by_date: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for robot in self.robots {
            for (date, entry) in &robot.performance {
                let totals = by_date.entry(date.as_str()).or_default();
                totals.0 += u64::from(entry.successes);
                totals.1 += u64::from(entry.failures);
            }
        }

        let series: Vec<DatePerformance> = by_date
            .into_iter()
            .map(|(date, (successes, failures))| DatePerformance {
                date: date.to_string(),
                successes,
                failures,
            })
            .collect();
        most_recent(series, self.max_points)
    }

    pub fn robot_performance_by_date(&self, robot: &Robot) -> Vec<DatePerformance> {
        most_recent(ascending(&robot.performance), self.max_points)
    }

    /// The chart series for whatever the selector points at.
    pub fn performance_series(&self, selector: &Selector) -> Result<Vec<DatePerformance>> {
        match selector {
            Selector::Team => Ok(self.team_performance_by_date()),
            Selector::Robot(id) => self
                .robots
                .iter()
                .find(|r| &r.id == id)
                .map(|robot| self.robot_performance_by_date(robot))
                .ok_or_else(|| Error::robot_not_found(id)),
        }
    }

    /// Per-robot totals in robot-list order.
    pub fn robot_totals(&self) -> Vec<RobotSummary> {
        self.robots
            .iter()
            .map(|robot| RobotSummary {
                id: robot.id.clone(),
                name: robot.name.clone(),
                category: robot.category.clone(),
                successes: robot.total_successes(),
                failures: robot.total_failures(),
                tests: robot.performance.len(),
                completed_tasks: robot.completed_tasks(),
                total_tasks: robot.tasks.len(),
            })
            .collect()
    }
}

/// A robot's full log, newest date first.
pub fn performance_history(robot: &Robot) -> Vec<DatePerformance> {
    let mut history = ascending(&robot.performance);
    history.reverse();
    history
}

fn ascending(log: &PerformanceLog) -> Vec<DatePerformance> {
    log.iter()
        .map(|(date, entry)| DatePerformance {
            date: date.clone(),
            successes: u64::from(entry.successes),
            failures: u64::from(entry.failures),
        })
        .collect()
}

fn most_recent(mut series: Vec<DatePerformance>, limit: usize) -> Vec<DatePerformance> {
    if series.len() > limit {
        series.drain(..series.len() - limit);
    }
    series
}
