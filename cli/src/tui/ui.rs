use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use robodash_core::{
    performance_history, ActivityKind, ChartArea, ChartData, DashboardUseCase, DatePerformance,
    Legend, Priority, Selector, SwotCategory, TimerState, Urgency,
};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, InputMode, Page};
use crate::tui::chart::draw_bar_chart;

pub struct Theme {
    pub primary: Color,
    pub muted: Color,
    pub text: Color,
    pub success: Color,
    pub failure: Color,
    pub warning: Color,
}

pub const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    success: Color::Green,
    failure: Color::Red,
    warning: Color::Yellow,
};

const RECENT_ACTIVITIES: usize = 10;
const NO_PERFORMANCE: &str = "No performance data";

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
}

fn kind_color(kind: ActivityKind) -> Color {
    match kind {
        ActivityKind::Info => THEME.primary,
        ActivityKind::Success => THEME.success,
        ActivityKind::Error => THEME.failure,
    }
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Green),
    }
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with `…`.
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, app, main_chunks[0]);

    match app.page {
        Page::Dashboard => draw_dashboard(f, app, main_chunks[1]),
        Page::Robots => draw_robots(f, app, main_chunks[1]),
        Page::Swot => draw_swot(f, app, main_chunks[1]),
        Page::Performance => draw_performance(f, app, main_chunks[1]),
        Page::Tasks => draw_tasks(f, app, main_chunks[1]),
        Page::Timer => draw_timer(f, app, main_chunks[1]),
        Page::Notes => draw_notes(f, app, main_chunks[1]),
    }

    draw_footer(f, app, main_chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(34)])
        .split(area);

    let titles: Vec<Line> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| Line::from(format!("{} {}", i + 1, p.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.page.index())
        .block(
            Block::default()
                .title(Span::styled(
                    " ROBODASH ",
                    Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .highlight_style(Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let selector = Paragraph::new(Line::from(vec![
        Span::styled("Viewing: ", Style::default().fg(THEME.muted)),
        Span::styled(
            truncate(&app.selector_label(), 22),
            Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Right)
    .block(panel("s: switch"));
    f.render_widget(selector, chunks[1]);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.input_mode {
        InputMode::Editing(form) => Line::from(vec![
            Span::styled(format!("{} > ", form.prompt()), Style::default().fg(THEME.muted)),
            Span::styled(app.input.as_str(), Style::default().fg(THEME.text)),
        ]),
        InputMode::Confirm(pending) => Line::from(Span::styled(
            pending.question(),
            Style::default().fg(THEME.warning).add_modifier(Modifier::BOLD),
        )),
        InputMode::Normal => match &app.notice {
            Some(notice) => Line::from(Span::styled(
                notice.text.as_str(),
                Style::default().fg(kind_color(notice.kind)),
            )),
            None => Line::from(Span::styled(help_text(app.page), Style::default().fg(THEME.muted))),
        },
    };
    f.render_widget(Paragraph::new(line), area);

    if let InputMode::Editing(form) = &app.input_mode {
        let prefix = format!("{} > ", form.prompt()).width();
        let typed: String = app.input.chars().take(app.cursor_position).collect();
        let x = area.x + (prefix + typed.width()) as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }
}

fn help_text(page: Page) -> &'static str {
    match page {
        Page::Dashboard => "Tab/1-7: pages | s: robot | x: export | q: quit",
        Page::Robots => "j/k: move | Enter: open | a: add | d: delete | q: quit",
        Page::Swot => "h/l: category | a: add item | e: edit category | q: quit",
        Page::Performance => "a: record results | x: export | q: quit",
        Page::Tasks => "j/k: move | Space: toggle | a: add | d: delete | q: quit",
        Page::Timer => "Space: start/pause | r: reset | e: set | q: quit",
        Page::Notes => "e: edit | q: quit",
    }
}

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(RECENT_ACTIVITIES as u16 + 2),
        ])
        .split(area);

    let dashboard =
        DashboardUseCase::new(app.store.robots()).with_max_points(app.config.chart.max_points);
    let kpis = dashboard.kpis();
    let cards = [
        ("Robots", kpis.robots.to_string(), THEME.primary),
        ("Tests", kpis.tests.to_string(), THEME.primary),
        ("Successes", kpis.successes.to_string(), THEME.success),
        ("Failures", kpis.failures.to_string(), THEME.failure),
        ("Done", kpis.completed_tasks.to_string(), THEME.success),
        ("Pending", kpis.pending_tasks.to_string(), THEME.warning),
    ];
    let card_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, cards.len() as u32); 6])
        .split(chunks[0]);
    for ((label, value, color), card) in cards.into_iter().zip(card_areas.iter()) {
        let widget = Paragraph::new(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(panel(label));
        f.render_widget(widget, *card);
    }

    let chart_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    let legend = Legend {
        first: "Successes",
        second: "Failures",
        placeholder: NO_PERFORMANCE,
    };
    let chart_area = ChartArea::from(&app.config.chart);
    draw_bar_chart(
        f,
        chart_areas[0],
        "Team performance by date",
        chart_area,
        &ChartData::from_dates(&dashboard.team_performance_by_date()),
        &legend,
    );
    draw_bar_chart(
        f,
        chart_areas[1],
        "Robot comparison",
        chart_area,
        &ChartData::from_robot_totals(&dashboard.robot_totals()),
        &Legend {
            placeholder: "No robots",
            ..legend
        },
    );

    let items: Vec<ListItem> = app
        .store
        .activities()
        .recent(RECENT_ACTIVITIES)
        .iter()
        .map(|a| {
            ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(kind_color(a.kind))),
                Span::raw(a.message.as_str()),
                Span::styled(format!("  {}", a.timestamp), Style::default().fg(THEME.muted)),
            ]))
        })
        .collect();
    let list = if items.is_empty() {
        List::new(vec![ListItem::new(Span::styled(
            "No recent activity",
            Style::default().fg(THEME.muted),
        ))])
    } else {
        List::new(items)
    };
    f.render_widget(list.block(panel("Recent activity")), chunks[2]);
}

fn draw_robots(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let totals = DashboardUseCase::new(app.store.robots()).robot_totals();
    let rows: Vec<Row> = totals
        .iter()
        .map(|s| {
            let current = matches!(app.selector(), Selector::Robot(id) if *id == s.id);
            Row::new(vec![
                Span::styled(if current { "●" } else { " " }, Style::default().fg(THEME.primary)),
                Span::styled(s.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(s.category.clone()),
                Span::styled(s.successes.to_string(), Style::default().fg(THEME.success)),
                Span::styled(s.failures.to_string(), Style::default().fg(THEME.failure)),
                Span::raw(format!("{}/{}", s.completed_tasks, s.total_tasks)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(12),
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new(vec!["", "Name", "Category", "✔", "✖", "Tasks"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .block(panel("Robots"))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");
    f.render_stateful_widget(table, chunks[0], &mut app.robot_state);

    let detail = app
        .robot_state
        .selected()
        .and_then(|i| app.store.robots().get(i))
        .map(|robot| {
            vec![
                Line::from(Span::styled(
                    robot.name.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("ID: ", Style::default().fg(THEME.muted)),
                    Span::raw(robot.id.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Category: ", Style::default().fg(Color::Blue)),
                    Span::raw(robot.category.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Tests: ", Style::default().fg(Color::Blue)),
                    Span::raw(robot.performance.len().to_string()),
                ]),
                Line::from(""),
                Line::from(robot.description.as_str()),
            ]
        })
        .unwrap_or_default();
    let detail = Paragraph::new(detail)
        .block(panel("Detail"))
        .wrap(Wrap { trim: true });
    f.render_widget(detail, chunks[1]);
}

fn draw_swot(f: &mut Frame, app: &App, area: Rect) {
    let swot = app.store.swot(app.selector()).unwrap_or_default();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect();

    for (category, cell) in SwotCategory::ALL.into_iter().zip(cells) {
        let color = match category {
            SwotCategory::Strengths => THEME.success,
            SwotCategory::Weaknesses => THEME.failure,
            SwotCategory::Opportunities => THEME.primary,
            SwotCategory::Threats => THEME.warning,
        };
        let items: Vec<ListItem> = swot
            .items(category)
            .iter()
            .map(|item| ListItem::new(format!("• {}", item)))
            .collect();
        let mut block = panel(category.as_str()).title_style(Style::default().fg(color));
        if category == app.swot_category {
            block = block
                .border_type(BorderType::Thick)
                .border_style(Style::default().fg(color));
        }
        f.render_widget(List::new(items).block(block), cell);
    }
}

fn draw_performance(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let dashboard =
        DashboardUseCase::new(app.store.robots()).with_max_points(app.config.chart.max_points);
    let series = dashboard.performance_series(app.selector()).unwrap_or_default();
    draw_bar_chart(
        f,
        chunks[0],
        &format!("Performance: {}", app.selector_label()),
        ChartArea::from(&app.config.chart),
        &ChartData::from_dates(&series),
        &Legend {
            first: "Successes",
            second: "Failures",
            placeholder: NO_PERFORMANCE,
        },
    );

    let history: Vec<DatePerformance> = match app.selector() {
        Selector::Team => series.into_iter().rev().collect(),
        Selector::Robot(id) => app
            .store
            .robot(id)
            .map(performance_history)
            .unwrap_or_default(),
    };
    let rows: Vec<Row> = history
        .iter()
        .map(|p| {
            Row::new(vec![
                Span::raw(p.date.clone()),
                Span::styled(p.successes.to_string(), Style::default().fg(THEME.success)),
                Span::styled(p.failures.to_string(), Style::default().fg(THEME.failure)),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [Constraint::Length(12), Constraint::Length(10), Constraint::Length(10)],
    )
    .header(Row::new(vec!["Date", "Successes", "Failures"]).style(Style::default().fg(Color::Yellow)))
    .block(panel("History"));
    f.render_widget(table, chunks[1]);
}

fn draw_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let view = app.store.tasks_view(app.selector()).unwrap_or_default();
    let team = app.selector().is_team();
    let rows: Vec<Row> = view
        .iter()
        .map(|v| {
            let status = if v.task.completed { "✔" } else { "☐" };
            let text_style = if v.task.completed {
                Style::default().fg(THEME.muted).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Row::new(vec![
                Span::raw(status),
                Span::styled(v.task.priority.as_str(), priority_style(v.task.priority)),
                Span::raw(if team { truncate(&v.robot_name, 12) } else { String::new() }),
                Span::styled(v.task.text.clone(), text_style),
                Span::styled(v.task.created_at.clone(), Style::default().fg(THEME.muted)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Length(if team { 13 } else { 0 }),
            Constraint::Min(10),
            Constraint::Length(11),
        ],
    )
    .header(
        Row::new(vec!["St", "Pri", "Robot", "Task", "Created"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .block(panel(&format!("Tasks: {}", app.selector_label())))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.task_state);
}

fn draw_timer(f: &mut Frame, app: &App, area: Rect) {
    let color = match app.timer.urgency() {
        Urgency::Critical => THEME.failure,
        Urgency::Warning => THEME.warning,
        Urgency::Normal => THEME.text,
    };
    let state = match app.timer.state() {
        TimerState::Idle => "ready",
        TimerState::Running => "running",
        TimerState::Paused => "paused",
        TimerState::Expired => "time's up",
    };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(panel("Competition timer"), area);

    let text = vec![
        Line::from(Span::styled(
            app.timer.display(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(state, Style::default().fg(THEME.muted))),
    ];
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        vertical[1],
    );
}

fn draw_notes(f: &mut Frame, app: &App, area: Rect) {
    let notes = app.store.notes(app.selector()).unwrap_or_default();
    let title = if app.selector().is_team() {
        "Notes: team (read-only)".to_string()
    } else {
        format!("Notes: {}", app.selector_label())
    };
    let paragraph = Paragraph::new(notes)
        .block(panel(&title))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_display_width() {
        assert_eq!(truncate("Atlas", 10), "Atlas");
        assert_eq!(truncate("Atlas MK-I", 6), "Atlas…");
        assert_eq!(truncate("ロボット隊", 5), "ロボ…");
    }
}
