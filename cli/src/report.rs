use robodash_core::{Activity, DatePerformance, Kpis, RobotSummary, Swot, SwotCategory, TaskView};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct RobotRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Tests")]
    tests: usize,
    #[tabled(rename = "Successes")]
    successes: u64,
    #[tabled(rename = "Failures")]
    failures: u64,
    #[tabled(rename = "Tasks")]
    tasks: String,
}

#[derive(Tabled)]
struct KpiRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct SwotRow {
    #[tabled(rename = "Type")]
    category: &'static str,
    #[tabled(rename = "Item")]
    item: String,
}

#[derive(Tabled)]
struct PerformanceRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Successes")]
    successes: u64,
    #[tabled(rename = "Failures")]
    failures: u64,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "St")]
    status: &'static str,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Robot")]
    robot: String,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "When")]
    timestamp: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Message")]
    message: String,
}

fn styled<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}

pub fn robots(summaries: &[RobotSummary]) -> String {
    if summaries.is_empty() {
        return "No robots registered.".to_string();
    }
    styled(
        summaries
            .iter()
            .map(|s| RobotRow {
                id: s.id.clone(),
                name: s.name.clone(),
                category: s.category.clone(),
                tests: s.tests,
                successes: s.successes,
                failures: s.failures,
                tasks: format!("{}/{}", s.completed_tasks, s.total_tasks),
            })
            .collect(),
    )
}

pub fn kpis(kpis: &Kpis) -> String {
    styled(vec![
        KpiRow { metric: "Robots", value: kpis.robots.to_string() },
        KpiRow { metric: "Tests", value: kpis.tests.to_string() },
        KpiRow { metric: "Successes", value: kpis.successes.to_string() },
        KpiRow { metric: "Failures", value: kpis.failures.to_string() },
        KpiRow { metric: "Completed tasks", value: kpis.completed_tasks.to_string() },
        KpiRow { metric: "Pending tasks", value: kpis.pending_tasks.to_string() },
    ])
}

pub fn swot(swot: &Swot) -> String {
    if swot.is_empty() {
        return "No SWOT items.".to_string();
    }
    let rows = SwotCategory::ALL
        .into_iter()
        .flat_map(|category| {
            swot.items(category).iter().map(move |item| SwotRow {
                category: category.as_str(),
                item: item.clone(),
            })
        })
        .collect();
    styled(rows)
}

pub fn performance(series: &[DatePerformance]) -> String {
    if series.is_empty() {
        return "No performance data.".to_string();
    }
    styled(
        series
            .iter()
            .map(|p| PerformanceRow {
                date: p.date.clone(),
                successes: p.successes,
                failures: p.failures,
            })
            .collect(),
    )
}

pub fn tasks(view: &[TaskView]) -> String {
    if view.is_empty() {
        return "No tasks found.".to_string();
    }
    styled(
        view.iter()
            .map(|v| TaskRow {
                index: v.index,
                status: if v.task.completed { "✔" } else { "☐" },
                priority: v.task.priority.to_string(),
                robot: v.robot_name.clone(),
                text: v.task.text.clone(),
                created: v.task.created_at.clone(),
            })
            .collect(),
    )
}

pub fn activities(entries: &[Activity]) -> String {
    if entries.is_empty() {
        return "No recent activity.".to_string();
    }
    styled(
        entries
            .iter()
            .map(|a| ActivityRow {
                timestamp: a.timestamp.clone(),
                kind: a.kind.as_str(),
                message: a.message.clone(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use robodash_core::{Priority, Task};

    #[test]
    fn test_empty_views_print_a_sentence() {
        assert_eq!(robots(&[]), "No robots registered.");
        assert_eq!(tasks(&[]), "No tasks found.");
        assert_eq!(performance(&[]), "No performance data.");
        assert_eq!(swot(&Swot::default()), "No SWOT items.");
    }

    #[test]
    fn test_tasks_table_shows_owner_and_index() {
        let view = vec![TaskView {
            index: 3,
            robot_id: "robot2".into(),
            robot_name: "Titan Pro".into(),
            task: Task {
                text: "Replace armor".into(),
                priority: Priority::High,
                completed: true,
                created_at: "2024-05-01".into(),
            },
        }];
        let out = tasks(&view);
        assert!(out.contains("Titan Pro"));
        assert!(out.contains("Replace armor"));
        assert!(out.contains("high"));
        assert!(out.contains('3'));
    }

    #[test]
    fn test_swot_rows_follow_category_order() {
        let analysis = Swot {
            threats: vec!["Rain".into()],
            strengths: vec!["Fast".into()],
            ..Swot::default()
        };
        let out = swot(&analysis);
        let fast = out.find("Fast").unwrap();
        let rain = out.find("Rain").unwrap();
        assert!(fast < rain);
    }
}
