use std::fs;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::Local;
use robodash_core::{
    export_data, parse_count, performance_history, Config, DashboardUseCase, Selector,
};
use tracing::info;

use crate::{report, Commands, NotesCommand, PerfCommand, RobotCommand, Store, SwotCommand, TaskCommand};

const SELECT_ROBOT: &str = "The team view is read-only here; pass --robot <id>.";

pub fn run(command: Commands, store: &mut Store, config: &Config) -> Result<()> {
    match command {
        Commands::Robot(cmd) => robot(cmd, store),
        Commands::Swot(cmd) => swot(cmd, store),
        Commands::Perf(cmd) => perf(cmd, store, config),
        Commands::Task(cmd) => task(cmd, store),
        Commands::Notes(cmd) => notes(cmd, store),
        Commands::Dashboard => {
            let dashboard = DashboardUseCase::new(store.robots());
            println!("{}", report::kpis(&dashboard.kpis()));
            println!("{}", report::robots(&dashboard.robot_totals()));
            Ok(())
        }
        Commands::Activity { limit } => {
            println!("{}", report::activities(store.activities().recent(limit)));
            Ok(())
        }
        Commands::Export {
            scope,
            format,
            output,
            stdout,
        } => {
            let content = export_data(store.robots(), scope, format)?;
            if stdout {
                println!("{}", content);
            } else {
                let path = output.join(scope.file_name(format));
                fs::write(&path, content)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), %scope, "exported");
                println!("Exported {}", path.display());
            }
            Ok(())
        }
        Commands::Tui => crate::tui::run(store, config),
    }
}

fn robot(cmd: RobotCommand, store: &mut Store) -> Result<()> {
    match cmd {
        RobotCommand::Add {
            name,
            category,
            description,
        } => {
            let id = store.add_robot(&name, &category, &description)?;
            println!("Robot added: {} (ID: {})", name.trim(), id);
        }
        RobotCommand::List => {
            let totals = DashboardUseCase::new(store.robots()).robot_totals();
            println!("{}", report::robots(&totals));
        }
        RobotCommand::Delete { id, yes } => {
            let name = store.robot(&id)?.name.clone();
            let prompt = format!("Delete robot '{}'? All of its data will be lost.", name);
            if !confirm(&prompt, yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            store.delete_robot(&id)?;
            println!("Robot deleted: {}", name);
        }
    }
    Ok(())
}

fn swot(cmd: SwotCommand, store: &mut Store) -> Result<()> {
    match cmd {
        SwotCommand::Show { robot } => {
            println!("{}", report::swot(&store.swot(&robot)?));
        }
        SwotCommand::Add {
            category,
            item,
            robot,
        } => {
            if store.add_swot_item(&robot, category, &item)? {
                println!("Added to {}: {}", category, item.trim());
            } else {
                println!("{}", SELECT_ROBOT);
            }
        }
        SwotCommand::Set {
            category,
            items,
            robot,
        } => {
            if store.set_swot(&robot, category, items)? {
                let count = store.swot(&robot)?.items(category).len();
                println!("{} now has {} item(s)", category, count);
            } else {
                println!("{}", SELECT_ROBOT);
            }
        }
    }
    Ok(())
}

fn perf(cmd: PerfCommand, store: &mut Store, config: &Config) -> Result<()> {
    match cmd {
        PerfCommand::Record {
            successes,
            failures,
            date,
            robot,
        } => {
            let date = date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
            let (successes, failures) = (parse_count(&successes), parse_count(&failures));
            if store.record_performance(&robot, &date, successes, failures)? {
                println!(
                    "Recorded {}: {} successes, {} failures",
                    date.trim(),
                    successes,
                    failures
                );
            } else {
                println!("{}", SELECT_ROBOT);
            }
        }
        PerfCommand::Show { robot } => {
            let series = match &robot {
                Selector::Team => DashboardUseCase::new(store.robots())
                    .with_max_points(config.chart.max_points)
                    .team_performance_by_date(),
                Selector::Robot(id) => performance_history(store.robot(id)?),
            };
            println!("{}", report::performance(&series));
        }
    }
    Ok(())
}

fn task(cmd: TaskCommand, store: &mut Store) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            text,
            priority,
            robot,
        } => {
            let text = text.join(" ");
            let created = store.add_task(&robot, &text, priority)?;
            println!("Task added to {} robot(s): {}", created, text.trim());
        }
        TaskCommand::List { robot } => {
            println!("{}", report::tasks(&store.tasks_view(&robot)?));
        }
        TaskCommand::Toggle { index, robot } => {
            let completed = store.toggle_task(&robot, index)?;
            println!(
                "Task #{} marked {}",
                index,
                if completed { "completed" } else { "pending" }
            );
        }
        TaskCommand::Delete { index, robot, yes } => {
            let view = store.tasks_view(&robot)?;
            if let Some(entry) = view.iter().find(|v| v.index == index) {
                let prompt = format!("Delete task '{}' of {}?", entry.task.text, entry.robot_name);
                if !confirm(&prompt, yes)? {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            let removed = store.delete_task(&robot, index)?;
            println!("Task deleted: {}", removed.text);
        }
    }
    Ok(())
}

fn notes(cmd: NotesCommand, store: &mut Store) -> Result<()> {
    match cmd {
        NotesCommand::Show { robot } => {
            println!("{}", store.notes(&robot)?);
        }
        NotesCommand::Set { text, robot } => {
            if store.set_notes(&robot, &text)? {
                println!("Notes saved.");
            } else {
                println!("{}", SELECT_ROBOT);
            }
        }
    }
    Ok(())
}

fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    ask(prompt, &mut stdin.lock(), &mut io::stdout()).map_err(Into::into)
}

fn ask<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
