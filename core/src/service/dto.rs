use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// A task as shown in a list, with the index used to address it under the
/// selector the list was built for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskView {
    pub index: usize,
    pub robot_id: String,
    pub robot_name: String,
    pub task: Task,
}

/// Dashboard summary statistics.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Kpis {
    pub robots: usize,
    /// Number of performance entries across all robots.
    pub tests: usize,
    pub successes: u64,
    pub failures: u64,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DatePerformance {
    pub date: String,
    pub successes: u64,
    pub failures: u64,
}

/// Per-robot totals for the robot cards and the comparison chart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RobotSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub successes: u64,
    pub failures: u64,
    pub tests: usize,
    pub completed_tasks: usize,
    pub total_tasks: usize,
}
