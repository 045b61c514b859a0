use std::collections::HashMap;
use std::fs;
use std::time::{Duration, Instant};

use chrono::Local;
use ratatui::widgets::TableState;
use robodash_core::{
    expand_key, export_data, parse_count, ActivityKind, Config, CountdownTimer, Error,
    ExportFormat, ExportScope, Priority, Selector, SwotCategory, TickSchedule, TimerEvent,
};
use tracing::{debug, info, warn};

use crate::Store;

const NOTICE_TTL: Duration = Duration::from_secs(3);
const TEAM_READ_ONLY: &str = "Select a specific robot first (s)";

const ROBOT_KEYS: [&str; 2] = ["category", "description"];
const TASK_KEYS: [&str; 1] = ["priority"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Robots,
    Swot,
    Performance,
    Tasks,
    Timer,
    Notes,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::Robots,
        Page::Swot,
        Page::Performance,
        Page::Tasks,
        Page::Timer,
        Page::Notes,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Robots => "Robots",
            Page::Swot => "SWOT",
            Page::Performance => "Performance",
            Page::Tasks => "Tasks",
            Page::Timer => "Timer",
            Page::Notes => "Notes",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    AddRobot,
    AddSwotItem,
    EditSwot,
    RecordPerformance,
    AddTask,
    EditNotes,
    SetTimer,
    Export,
}

impl Form {
    pub fn prompt(&self) -> &'static str {
        match self {
            Form::AddRobot => "Name cat:Category desc:Description",
            Form::AddSwotItem => "New item",
            Form::EditSwot => "Items separated by ';' (a ';' always starts a new item)",
            Form::RecordPerformance => "Successes Failures [YYYY-MM-DD]",
            Form::AddTask => "Task text pri:low|medium|high",
            Form::EditNotes => "Notes",
            Form::SetTimer => "MM:SS or seconds",
            Form::Export => "swot|performance|tasks|all [json|csv]",
        }
    }

    /// Forms that write to one robot and make no sense for the team.
    fn needs_robot(&self) -> bool {
        matches!(
            self,
            Form::AddSwotItem | Form::EditSwot | Form::RecordPerformance | Form::EditNotes
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDelete {
    Robot { id: String, name: String },
    Task { index: usize, text: String },
}

impl PendingDelete {
    pub fn question(&self) -> String {
        match self {
            PendingDelete::Robot { name, .. } => {
                format!("Delete robot '{}'? All of its data will be lost. (y/n)", name)
            }
            PendingDelete::Task { text, .. } => format!("Delete task '{}'? (y/n)", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing(Form),
    Confirm(PendingDelete),
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: ActivityKind,
    shown_at: Instant,
}

pub struct App<'a> {
    pub store: &'a mut Store,
    pub config: &'a Config,
    pub page: Page,
    pub input_mode: InputMode,
    pub input: String,
    pub cursor_position: usize,
    pub robot_state: TableState,
    pub task_state: TableState,
    pub swot_category: SwotCategory,
    pub timer: CountdownTimer,
    pub schedule: TickSchedule,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(store: &'a mut Store, config: &'a Config) -> App<'a> {
        let mut robot_state = TableState::default();
        if !store.robots().is_empty() {
            robot_state.select(Some(0));
        }
        App {
            timer: CountdownTimer::new(config.timer.default_seconds),
            store,
            config,
            page: Page::Dashboard,
            input_mode: InputMode::Normal,
            input: String::new(),
            cursor_position: 0,
            robot_state,
            task_state: TableState::default(),
            swot_category: SwotCategory::Strengths,
            schedule: TickSchedule::default(),
            notice: None,
            should_quit: false,
        }
    }

    pub fn selector(&self) -> &Selector {
        self.store.selection()
    }

    pub fn selector_label(&self) -> String {
        match self.selector() {
            Selector::Team => "Team (all robots)".to_string(),
            Selector::Robot(id) => self
                .store
                .robot(id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|_| id.clone()),
        }
    }

    // --- navigation ---

    pub fn goto_page(&mut self, page: Page) {
        self.page = page;
        self.task_state.select(None);
        if page == Page::Tasks && self.task_count() > 0 {
            self.task_state.select(Some(0));
        }
    }

    pub fn next_page(&mut self) {
        let i = (self.page.index() + 1) % Page::ALL.len();
        self.goto_page(Page::ALL[i]);
    }

    pub fn previous_page(&mut self) {
        let i = (self.page.index() + Page::ALL.len() - 1) % Page::ALL.len();
        self.goto_page(Page::ALL[i]);
    }

    /// team -> first robot -> ... -> last robot -> team
    pub fn cycle_selector(&mut self) {
        let ids: Vec<String> = self.store.robots().iter().map(|r| r.id.clone()).collect();
        let next = match self.selector() {
            Selector::Team => ids.first().cloned(),
            Selector::Robot(id) => ids
                .iter()
                .position(|i| i == id)
                .and_then(|pos| ids.get(pos + 1).cloned()),
        };
        let selector = next.map(Selector::Robot).unwrap_or(Selector::Team);
        if let Err(e) = self.store.select(selector) {
            self.notify_error(&e);
        }
        self.goto_page(self.page);
    }

    pub fn next(&mut self) {
        match self.page {
            Page::Robots => step(&mut self.robot_state, self.store.robots().len(), true),
            Page::Tasks => {
                let len = self.task_count();
                step(&mut self.task_state, len, true)
            }
            Page::Swot => self.swot_category = cycle_category(self.swot_category, true),
            _ => {}
        }
    }

    pub fn previous(&mut self) {
        match self.page {
            Page::Robots => step(&mut self.robot_state, self.store.robots().len(), false),
            Page::Tasks => {
                let len = self.task_count();
                step(&mut self.task_state, len, false)
            }
            Page::Swot => self.swot_category = cycle_category(self.swot_category, false),
            _ => {}
        }
    }

    fn task_count(&self) -> usize {
        self.store
            .tasks_view(self.selector())
            .map(|v| v.len())
            .unwrap_or(0)
    }

    // --- notices ---

    pub fn notify(&mut self, text: impl Into<String>, kind: ActivityKind) {
        self.notice = Some(Notice {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Missing robots or tasks leave the state untouched, so they show as info.
    fn notify_error(&mut self, err: &Error) {
        if err.is_not_found() {
            debug!(error = %err, "target gone, nothing changed");
            self.notify(err.to_string(), ActivityKind::Info);
            return;
        }
        if err.is_validation() {
            debug!(error = %err, "input rejected");
        } else {
            warn!(error = %err, "operation failed");
        }
        self.notify(err.to_string(), ActivityKind::Error);
    }

    // --- actions ---

    /// Enter/space: select the highlighted robot, toggle a task, or run the timer.
    pub fn activate(&mut self, now: Instant) {
        match self.page {
            Page::Robots => {
                let Some(id) = self.highlighted_robot_id() else { return };
                match self.store.select(Selector::Robot(id)) {
                    Ok(()) => self.goto_page(Page::Swot),
                    Err(e) => self.notify_error(&e),
                }
            }
            Page::Tasks => {
                let Some(index) = self.task_state.selected() else { return };
                let selector = self.selector().clone();
                match self.store.toggle_task(&selector, index) {
                    Ok(true) => self.notify("Task completed", ActivityKind::Success),
                    Ok(false) => self.notify("Task reopened", ActivityKind::Info),
                    Err(e) => self.notify_error(&e),
                }
            }
            Page::Timer => self.toggle_timer(now),
            _ => {}
        }
    }

    fn highlighted_robot_id(&self) -> Option<String> {
        self.robot_state
            .selected()
            .and_then(|i| self.store.robots().get(i))
            .map(|r| r.id.clone())
    }

    pub fn request_delete(&mut self) {
        let pending = match self.page {
            Page::Robots => self
                .robot_state
                .selected()
                .and_then(|i| self.store.robots().get(i))
                .map(|r| PendingDelete::Robot {
                    id: r.id.clone(),
                    name: r.name.clone(),
                }),
            Page::Tasks => {
                let index = self.task_state.selected();
                self.store
                    .tasks_view(self.selector())
                    .ok()
                    .and_then(|view| view.into_iter().find(|v| Some(v.index) == index))
                    .map(|v| PendingDelete::Task {
                        index: v.index,
                        text: v.task.text,
                    })
            }
            _ => None,
        };
        if let Some(pending) = pending {
            self.input_mode = InputMode::Confirm(pending);
        }
    }

    pub fn resolve_confirm(&mut self, accepted: bool) {
        let InputMode::Confirm(pending) = std::mem::replace(&mut self.input_mode, InputMode::Normal)
        else {
            return;
        };
        if !accepted {
            return;
        }
        match pending {
            PendingDelete::Robot { id, name } => match self.store.delete_robot(&id) {
                Ok(_) => {
                    let len = self.store.robots().len();
                    clamp(&mut self.robot_state, len);
                    self.notify(format!("Robot deleted: {}", name), ActivityKind::Success);
                }
                Err(e) => self.notify_error(&e),
            },
            PendingDelete::Task { index, .. } => {
                let selector = self.selector().clone();
                match self.store.delete_task(&selector, index) {
                    Ok(task) => {
                        let len = self.task_count();
                        clamp(&mut self.task_state, len);
                        self.notify(format!("Task deleted: {}", task.text), ActivityKind::Success);
                    }
                    Err(e) => self.notify_error(&e),
                }
            }
        }
    }

    pub fn toggle_timer(&mut self, now: Instant) {
        if self.timer.is_running() {
            self.timer.pause();
            self.schedule.cancel();
            self.notify("Timer paused", ActivityKind::Info);
        } else if self.timer.start() {
            self.schedule.arm(now);
            self.notify("Timer started", ActivityKind::Success);
        }
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
        self.schedule.cancel();
        self.notify("Timer reset", ActivityKind::Info);
    }

    /// Delivers due timer ticks and expires old notices.
    pub fn on_tick(&mut self, now: Instant) {
        for _ in 0..self.schedule.due(now) {
            if self.timer.tick() == TimerEvent::Expired {
                self.schedule.cancel();
                info!("timer finished");
                self.notify("Time's up!", ActivityKind::Error);
                if let Err(e) = self.store.add_activity("Timer finished", ActivityKind::Info) {
                    warn!(error = %e, "failed to record timer activity");
                }
                break;
            }
        }

        if self
            .notice
            .as_ref()
            .is_some_and(|n| now.duration_since(n.shown_at) >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }

    // --- input ---

    pub fn enter_form(&mut self, form: Form) {
        if form.needs_robot() && self.selector().is_team() {
            self.notify(TEAM_READ_ONLY, ActivityKind::Error);
            return;
        }
        let prefill = match form {
            Form::EditNotes => self.store.notes(self.selector()).unwrap_or_default(),
            Form::EditSwot => self
                .store
                .swot(self.selector())
                .map(|s| s.items(self.swot_category).join("; "))
                .unwrap_or_default(),
            Form::SetTimer => self.timer.display(),
            _ => String::new(),
        };
        self.cursor_position = prefill.chars().count();
        self.input = prefill;
        self.input_mode = InputMode::Editing(form);
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor_position);
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input.chars().take(chars).map(char::len_utf8).sum()
    }

    pub fn submit_command(&mut self) {
        let InputMode::Editing(form) = self.input_mode else {
            return;
        };
        let input = std::mem::take(&mut self.input);
        self.cursor_position = 0;
        self.exit_input_mode();

        let selector = self.selector().clone();
        let outcome = match form {
            Form::AddRobot => self.submit_robot(&input),
            Form::AddSwotItem => self
                .store
                .add_swot_item(&selector, self.swot_category, &input)
                .map(|_| format!("Item added to {}", self.swot_category)),
            Form::EditSwot => {
                let items = input.split(';').map(str::to_string).collect();
                self.store
                    .set_swot(&selector, self.swot_category, items)
                    .map(|_| format!("{} saved", self.swot_category))
            }
            Form::RecordPerformance => {
                let (successes, failures, date) = parse_performance(&input);
                self.store
                    .record_performance(&selector, &date, successes, failures)
                    .map(|_| "Performance recorded".to_string())
            }
            Form::AddTask => {
                let (text, fields) = parse_fields(&input, &TASK_KEYS);
                let priority = fields
                    .get("priority")
                    .map(|p| p.parse::<Priority>())
                    .transpose();
                priority.and_then(|priority| {
                    self.store
                        .add_task(&selector, &text, priority.unwrap_or_default())
                        .map(|n| format!("Task created for {} robot(s)", n))
                })
            }
            Form::EditNotes => self
                .store
                .set_notes(&selector, &input)
                .map(|_| "Notes saved".to_string()),
            Form::SetTimer => match parse_duration(&input) {
                None => Err(Error::validation(format!("Invalid duration '{}'", input.trim()))),
                Some(seconds) => {
                    if self.timer.set(seconds) {
                        Ok(format!("Timer set to {}", self.timer.display()))
                    } else {
                        Err(Error::validation("Pause the timer before changing it"))
                    }
                }
            },
            Form::Export => self.submit_export(&input),
        };

        match outcome {
            Ok(message) => {
                self.notify(message, ActivityKind::Success);
                let len = self.task_count();
                clamp(&mut self.task_state, len);
                if self.robot_state.selected().is_none() && !self.store.robots().is_empty() {
                    self.robot_state.select(Some(0));
                }
            }
            Err(e) => self.notify_error(&e),
        }
    }

    fn submit_robot(&mut self, input: &str) -> robodash_core::Result<String> {
        let (name, fields) = parse_fields(input, &ROBOT_KEYS);
        let category = fields.get("category").map(String::as_str).unwrap_or("");
        let description = fields.get("description").map(String::as_str).unwrap_or("");
        self.store
            .add_robot(&name, category, description)
            .map(|_| format!("Robot added: {}", name))
    }

    fn submit_export(&mut self, input: &str) -> robodash_core::Result<String> {
        let mut words = input.split_whitespace();
        let scope: ExportScope = words.next().unwrap_or("all").parse()?;
        let format: ExportFormat = words.next().unwrap_or("json").parse()?;
        let file_name = scope.file_name(format);
        let content = export_data(self.store.robots(), scope, format)?;
        fs::write(&file_name, content)?;
        info!(file = %file_name, "exported");
        Ok(format!("Data exported: {}", file_name))
    }
}

fn step(state: &mut TableState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    state.select(Some(i));
}

fn clamp(state: &mut TableState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        Some(_) => {}
    }
}

fn cycle_category(current: SwotCategory, forward: bool) -> SwotCategory {
    let all = SwotCategory::ALL;
    let i = all.iter().position(|c| *c == current).unwrap_or(0);
    let next = if forward { i + 1 } else { i + all.len() - 1 };
    all[next % all.len()]
}

/// Splits `Name words key:value words` into the leading text and fields.
/// A field value runs until the next recognised `key:`; keys may be
/// abbreviated to any unambiguous prefix.
pub fn parse_fields(input: &str, keys: &[&str]) -> (String, HashMap<String, String>) {
    let mut text: Vec<&str> = Vec::new();
    let mut fields: HashMap<String, Vec<&str>> = HashMap::new();
    let mut current: Option<String> = None;

    for word in input.split_whitespace() {
        let field = word
            .split_once(':')
            .and_then(|(key, value)| expand_key(&key.to_lowercase(), keys).ok().map(|k| (k, value)));
        match field {
            Some((key, value)) => {
                let entry = fields.entry(key.clone()).or_default();
                entry.clear();
                if !value.is_empty() {
                    entry.push(value);
                }
                current = Some(key);
            }
            None => match &current {
                Some(key) => fields.entry(key.clone()).or_default().push(word),
                None => text.push(word),
            },
        }
    }

    let fields = fields
        .into_iter()
        .map(|(k, words)| (k, words.join(" ")))
        .collect();
    (text.join(" "), fields)
}

/// `S F [DATE]`; the date defaults to today.
fn parse_performance(input: &str) -> (u32, u32, String) {
    let mut words = input.split_whitespace();
    let successes = parse_count(words.next().unwrap_or(""));
    let failures = parse_count(words.next().unwrap_or(""));
    let date = words
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
    (successes, failures, date)
}

/// `MM:SS` or plain seconds.
pub fn parse_duration(input: &str) -> Option<u32> {
    let input = input.trim();
    match input.split_once(':') {
        Some((m, s)) => {
            let minutes: u32 = m.trim().parse().ok()?;
            let seconds: u32 = s.trim().parse().ok()?;
            if seconds >= 60 {
                return None;
            }
            minutes.checked_mul(60)?.checked_add(seconds)
        }
        None => input.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robodash_core::{KeyValueStore, MemoryKeyValueStore};

    fn store() -> Store {
        let storage: Box<dyn KeyValueStore> = Box::new(MemoryKeyValueStore::new());
        Store::load(storage)
    }

    fn submit(app: &mut App<'_>, form: Form, input: &str) {
        app.enter_form(form);
        app.input = input.to_string();
        app.submit_command();
    }

    #[test]
    fn test_parse_fields() {
        let (name, fields) = parse_fields("Scout Mk II cat:Recon desc:Light and fast", &ROBOT_KEYS);
        assert_eq!(name, "Scout Mk II");
        assert_eq!(fields["category"], "Recon");
        assert_eq!(fields["description"], "Light and fast");

        let (text, fields) = parse_fields("Fix: left wheel", &TASK_KEYS);
        assert_eq!(text, "Fix: left wheel");
        assert!(fields.is_empty());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("02:30"), Some(150));
        assert_eq!(parse_duration("90"), Some(90));
        assert_eq!(parse_duration("1:75"), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("99999999:00"), None);
    }

    #[test]
    fn test_selector_cycles_through_robots_back_to_team() {
        let mut store = store();
        let config = Config::default();
        let mut app = App::new(&mut store, &config);
        app.cycle_selector();
        assert_eq!(app.selector(), &Selector::robot("robot1"));
        app.cycle_selector();
        assert_eq!(app.selector(), &Selector::robot("robot2"));
        app.cycle_selector();
        assert_eq!(app.selector(), &Selector::Team);
    }

    #[test]
    fn test_robot_form_and_confirmed_delete() {
        let mut store = store();
        let config = Config::default();
        let mut app = App::new(&mut store, &config);
        submit(&mut app, Form::AddRobot, "Scout cat:Recon");
        assert_eq!(app.store.robots().len(), 3);
        assert_eq!(app.store.robots()[2].category, "Recon");

        app.goto_page(Page::Robots);
        app.robot_state.select(Some(2));
        app.request_delete();
        assert!(matches!(app.input_mode, InputMode::Confirm(PendingDelete::Robot { .. })));
        app.resolve_confirm(false);
        assert_eq!(app.store.robots().len(), 3);

        app.request_delete();
        app.resolve_confirm(true);
        assert_eq!(app.store.robots().len(), 2);
        assert_eq!(app.robot_state.selected(), Some(1));
    }

    #[test]
    fn test_missing_task_shows_info_notice() {
        let mut store = store();
        let config = Config::default();
        let mut app = App::new(&mut store, &config);
        app.goto_page(Page::Tasks);
        app.task_state.select(Some(7));
        app.activate(Instant::now());
        assert_eq!(app.notice.as_ref().unwrap().kind, ActivityKind::Info);

        submit(&mut app, Form::AddTask, "   ");
        assert_eq!(app.notice.as_ref().unwrap().kind, ActivityKind::Error);
    }

    #[test]
    fn test_edit_swot_splits_on_semicolons() {
        let mut store = store();
        let config = Config::default();
        let mut app = App::new(&mut store, &config);
        app.cycle_selector();
        app.goto_page(Page::Swot);
        assert!(Form::EditSwot.prompt().contains(';'));
        submit(&mut app, Form::EditSwot, "Fast; light; frame");

        let swot = app.store.swot(&Selector::robot("robot1")).unwrap();
        assert_eq!(swot.strengths, vec!["Fast", "light", "frame"]);
    }

    #[test]
    fn test_team_forms_are_refused() {
        let mut store = store();
        let config = Config::default();
        let mut app = App::new(&mut store, &config);
        app.enter_form(Form::RecordPerformance);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.notice.as_ref().unwrap().kind, ActivityKind::Error);
    }

    #[test]
    fn test_team_task_toggle_through_tasks_page() {
        let mut store = store();
        let config = Config::default();
        let mut app = App::new(&mut store, &config);
        submit(&mut app, Form::AddTask, "Charge batteries pri:h");
        app.goto_page(Page::Tasks);
        app.next();
        app.activate(Instant::now());

        let robots = app.store.robots();
        assert_eq!(robots[0].tasks[0].priority, Priority::High);
        assert!(!robots[0].tasks[0].completed);
        assert!(robots[1].tasks[0].completed);
    }

    #[test]
    fn test_timer_expiry_records_activity_once() {
        let mut store = store();
        let config = Config::default();
        let mut app = App::new(&mut store, &config);
        submit(&mut app, Form::SetTimer, "00:02");
        assert_eq!(app.timer.remaining(), 2);

        let start = Instant::now();
        app.toggle_timer(start);
        app.on_tick(start + Duration::from_secs(5));
        assert_eq!(app.timer.remaining(), 0);
        assert!(!app.schedule.is_armed());
        assert_eq!(app.store.activities().len(), 1);
        assert_eq!(app.store.activities().entries()[0].message, "Timer finished");
    }
}
