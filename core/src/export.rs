//! JSON and CSV export of the robot list.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::input::expand_key;
use crate::model::robot::{PerformanceLog, Robot, Swot, SwotCategory};
use crate::model::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Swot,
    Performance,
    Tasks,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportScope {
    pub const ALL: [ExportScope; 4] = [
        ExportScope::Swot,
        ExportScope::Performance,
        ExportScope::Tasks,
        ExportScope::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportScope::Swot => "swot",
            ExportScope::Performance => "performance",
            ExportScope::Tasks => "tasks",
            ExportScope::All => "all",
        }
    }

    pub fn file_name(&self, format: ExportFormat) -> String {
        let stem = match self {
            ExportScope::Swot => "swot_data",
            ExportScope::Performance => "performance_data",
            ExportScope::Tasks => "tasks_data",
            ExportScope::All => "complete_data",
        };
        format!("{}.{}", stem, format.extension())
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let names: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
        let full = expand_key(&s.trim().to_lowercase(), &names)?;
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == full)
            .ok_or_else(|| Error::validation(format!("Unknown export scope: '{}'", s)))
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(Error::validation(format!("Unknown export format: '{}'", other))),
        }
    }
}

#[derive(Serialize)]
struct SwotProjection<'a> {
    name: &'a str,
    category: &'a str,
    swot: &'a Swot,
}

#[derive(Serialize)]
struct PerformanceProjection<'a> {
    name: &'a str,
    category: &'a str,
    performance: &'a PerformanceLog,
}

#[derive(Serialize)]
struct TasksProjection<'a> {
    name: &'a str,
    category: &'a str,
    tasks: &'a [Task],
}

pub fn export_data(robots: &[Robot], scope: ExportScope, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => export_json(robots, scope),
        ExportFormat::Csv => Ok(export_csv(robots, scope)),
    }
}

fn export_json(robots: &[Robot], scope: ExportScope) -> Result<String> {
    let json = match scope {
        ExportScope::Swot => serde_json::to_string_pretty(
            &robots
                .iter()
                .map(|r| SwotProjection {
                    name: &r.name,
                    category: &r.category,
                    swot: &r.swot,
                })
                .collect::<Vec<_>>(),
        )?,
        ExportScope::Performance => serde_json::to_string_pretty(
            &robots
                .iter()
                .map(|r| PerformanceProjection {
                    name: &r.name,
                    category: &r.category,
                    performance: &r.performance,
                })
                .collect::<Vec<_>>(),
        )?,
        ExportScope::Tasks => serde_json::to_string_pretty(
            &robots
                .iter()
                .map(|r| TasksProjection {
                    name: &r.name,
                    category: &r.category,
                    tasks: &r.tasks,
                })
                .collect::<Vec<_>>(),
        )?,
        ExportScope::All => serde_json::to_string_pretty(robots)?,
    };
    Ok(json)
}

fn export_csv(robots: &[Robot], scope: ExportScope) -> String {
    let mut csv = CsvWriter::default();
    match scope {
        ExportScope::Swot => {
            csv.header("Robot,Category,Type,Item");
            for robot in robots {
                for category in SwotCategory::ALL {
                    for item in robot.swot.items(category) {
                        csv.row(&[
                            robot.name.as_str(),
                            robot.category.as_str(),
                            category.as_str(),
                            item.as_str(),
                        ]);
                    }
                }
            }
        }
        ExportScope::Performance => {
            csv.header("Robot,Category,Date,Successes,Failures");
            for robot in robots {
                for (date, entry) in &robot.performance {
                    csv.row(&[
                        robot.name.as_str(),
                        robot.category.as_str(),
                        date.as_str(),
                        &entry.successes.to_string(),
                        &entry.failures.to_string(),
                    ]);
                }
            }
        }
        ExportScope::Tasks => {
            csv.header("Robot,Category,Task,Priority,Status,Created");
            for robot in robots {
                for task in &robot.tasks {
                    csv.row(&[
                        robot.name.as_str(),
                        robot.category.as_str(),
                        task.text.as_str(),
                        task.priority.as_str(),
                        task.status_label(),
                        task.created_at.as_str(),
                    ]);
                }
            }
        }
        ExportScope::All => {
            csv.header("Robot,Category,Description,Data_Type,Content");
            for robot in robots {
                let base = [
                    robot.name.as_str(),
                    robot.category.as_str(),
                    robot.description.as_str(),
                ];
                let mut fact = |data_type: &str, content: &str| {
                    csv.row(&[base[0], base[1], base[2], data_type, content]);
                };

                fact("info", "Robot Info");
                for category in SwotCategory::ALL {
                    let data_type = format!("swot_{}", category);
                    for item in robot.swot.items(category) {
                        fact(&data_type, item.as_str());
                    }
                }
                for (date, entry) in &robot.performance {
                    fact(
                        "performance",
                        &format!(
                            "{}: {} successes, {} failures",
                            date, entry.successes, entry.failures
                        ),
                    );
                }
                for task in &robot.tasks {
                    let status = if task.completed { "completed" } else { "pending" };
                    fact(
                        "task",
                        &format!("{} ({}, {})", task.text, task.priority, status),
                    );
                }
            }
        }
    }
    csv.finish()
}

/// Every field is quoted; embedded quotes are doubled (RFC 4180).
#[derive(Default)]
struct CsvWriter {
    out: String,
}

impl CsvWriter {
    fn header(&mut self, columns: &str) {
        self.out.push_str(columns);
        self.out.push('\n');
    }

    fn row(&mut self, fields: &[&str]) {
        let quoted: Vec<String> = fields
            .iter()
            .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
            .collect();
        self.out.push_str(&quoted.join(","));
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::robot::PerformanceEntry;
    use crate::model::task::Priority;

    fn r1() -> Robot {
        let mut robot = Robot::new("robot1".into(), "R1".into(), "Cat1".into(), "Desc".into());
        robot.tasks.push(Task {
            text: "Calibrate".into(),
            priority: Priority::High,
            completed: true,
            created_at: "2024-01-01".into(),
        });
        robot
    }

    #[test]
    fn test_tasks_csv() {
        let csv = export_data(&[r1()], ExportScope::Tasks, ExportFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "Robot,Category,Task,Priority,Status,Created\n\
             \"R1\",\"Cat1\",\"Calibrate\",\"high\",\"Completed\",\"2024-01-01\"\n"
        );
    }

    #[test]
    fn test_swot_csv_rows_per_item_in_category_order() {
        let mut robot = r1();
        robot.swot.threats.push("Rain".into());
        robot.swot.strengths.push("Fast".into());
        let csv = export_data(&[robot], ExportScope::Swot, ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Robot,Category,Type,Item");
        assert_eq!(lines[1], "\"R1\",\"Cat1\",\"strengths\",\"Fast\"");
        assert_eq!(lines[2], "\"R1\",\"Cat1\",\"threats\",\"Rain\"");
    }

    #[test]
    fn test_performance_csv() {
        let mut robot = r1();
        robot
            .performance
            .insert("2024-02-01".into(), PerformanceEntry { successes: 3, failures: 1 });
        let csv = export_data(&[robot], ExportScope::Performance, ExportFormat::Csv).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "\"R1\",\"Cat1\",\"2024-02-01\",\"3\",\"1\""
        );
    }

    #[test]
    fn test_all_csv_flattens_every_fact() {
        let mut robot = r1();
        robot.swot.weaknesses.push("Heavy".into());
        robot
            .performance
            .insert("2024-02-01".into(), PerformanceEntry { successes: 3, failures: 1 });
        let csv = export_data(&[robot], ExportScope::All, ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Robot,Category,Description,Data_Type,Content");
        assert_eq!(lines[1], "\"R1\",\"Cat1\",\"Desc\",\"info\",\"Robot Info\"");
        assert_eq!(lines[2], "\"R1\",\"Cat1\",\"Desc\",\"swot_weaknesses\",\"Heavy\"");
        assert_eq!(
            lines[3],
            "\"R1\",\"Cat1\",\"Desc\",\"performance\",\"2024-02-01: 3 successes, 1 failures\""
        );
        assert_eq!(
            lines[4],
            "\"R1\",\"Cat1\",\"Desc\",\"task\",\"Calibrate (high, completed)\""
        );
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let mut robot = r1();
        robot.name = "The \"Beast\", v2".into();
        robot.tasks.clear();
        let csv = export_data(&[robot], ExportScope::All, ExportFormat::Csv).unwrap();
        assert!(csv.contains("\"The \"\"Beast\"\", v2\""));
    }

    #[test]
    fn test_json_projection_shapes() {
        let robots = [r1()];
        let swot: serde_json::Value =
            serde_json::from_str(&export_data(&robots, ExportScope::Swot, ExportFormat::Json).unwrap())
                .unwrap();
        assert_eq!(swot[0]["name"], "R1");
        assert!(swot[0]["swot"]["strengths"].is_array());
        assert!(swot[0].get("tasks").is_none());

        let tasks: serde_json::Value =
            serde_json::from_str(&export_data(&robots, ExportScope::Tasks, ExportFormat::Json).unwrap())
                .unwrap();
        assert_eq!(tasks[0]["tasks"][0]["createdAt"], "2024-01-01");

        let all: Vec<Robot> =
            serde_json::from_str(&export_data(&robots, ExportScope::All, ExportFormat::Json).unwrap())
                .unwrap();
        assert_eq!(all, robots.to_vec());
    }

    #[test]
    fn test_scope_parsing_and_file_names() {
        assert_eq!("perf".parse::<ExportScope>().unwrap(), ExportScope::Performance);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportScope::All.file_name(ExportFormat::Json), "complete_data.json");
        assert_eq!(ExportScope::Tasks.file_name(ExportFormat::Csv), "tasks_data.csv");
    }
}
