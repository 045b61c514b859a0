pub mod app;
pub mod chart;
pub mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use robodash_core::Config;
use tracing::{debug, error};

use crate::tui::app::{App, Form, InputMode, Page};
use crate::Store;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(store: &mut Store, config: &Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(store, config);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "dashboard loop failed");
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        let timeout = app
            .schedule
            .until_next(Instant::now())
            .map_or(POLL_INTERVAL, |next| next.min(POLL_INTERVAL));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key, Instant::now());
                }
            }
        }

        app.on_tick(Instant::now());

        if app.should_quit {
            debug!("quit requested");
            return Ok(());
        }
    }
}

pub(crate) fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Tab => app.next_page(),
            KeyCode::BackTab => app.previous_page(),
            KeyCode::Char(c @ '1'..='7') => {
                let i = c as usize - '1' as usize;
                app.goto_page(Page::ALL[i]);
            }
            KeyCode::Char('s') => app.cycle_selector(),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Right | KeyCode::Char('l') => app.next(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Left | KeyCode::Char('h') => {
                app.previous()
            }
            KeyCode::Char(' ') | KeyCode::Enter => app.activate(now),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
            KeyCode::Char('a') => {
                let form = match app.page {
                    Page::Robots => Some(Form::AddRobot),
                    Page::Swot => Some(Form::AddSwotItem),
                    Page::Performance => Some(Form::RecordPerformance),
                    Page::Tasks => Some(Form::AddTask),
                    _ => None,
                };
                if let Some(form) = form {
                    app.enter_form(form);
                }
            }
            KeyCode::Char('e') => {
                let form = match app.page {
                    Page::Swot => Some(Form::EditSwot),
                    Page::Notes => Some(Form::EditNotes),
                    Page::Timer => Some(Form::SetTimer),
                    _ => None,
                };
                if let Some(form) = form {
                    app.enter_form(form);
                }
            }
            KeyCode::Char('r') if app.page == Page::Timer => app.reset_timer(),
            KeyCode::Char('x') => app.enter_form(Form::Export),
            _ => {}
        },
        InputMode::Editing(_) => match key.code {
            KeyCode::Enter => app.submit_command(),
            KeyCode::Esc => app.exit_input_mode(),
            KeyCode::Char(c) => app.input_char(c),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            _ => {}
        },
        InputMode::Confirm(_) => {
            let accepted = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
            app.resolve_confirm(accepted);
        }
    }
}
