pub mod app;
pub mod ui;

use std::io;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use habitism_core::{FileHabitRepository, HabitService};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::tui::app::{App, InputMode};

pub fn run(service: HabitService<FileHabitRepository>, today: NaiveDate) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(service, today);
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
        tracing::error!(error = %err, "tui exited with an error");
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !event::poll(std::time::Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.input_mode {
            InputMode::Normal => {
                app.message = None;
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('j') => app.next(),
                    KeyCode::Char('k') => app.previous(),
                    KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1),
                    KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1),
                    KeyCode::Up => app.move_cursor(-7),
                    KeyCode::Down => app.move_cursor(7),
                    KeyCode::Char('p') | KeyCode::PageUp => app.change_month(-1),
                    KeyCode::Char('n') | KeyCode::PageDown => app.change_month(1),
                    KeyCode::Char('t') => app.jump_to_today(),
                    KeyCode::Char(' ') | KeyCode::Enter => app.toggle_cursor(),
                    KeyCode::Char('a') => app.enter_add_mode(),
                    KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
                    _ => {}
                }
            }
            InputMode::Adding => match key.code {
                KeyCode::Enter => app.submit_add(),
                KeyCode::Esc => app.exit_input_mode(),
                KeyCode::Char(c) => app.input_char(c),
                KeyCode::Backspace => app.delete_char(),
                KeyCode::Left => app.move_input_left(),
                KeyCode::Right => app.move_input_right(),
                _ => {}
            },
            InputMode::ConfirmDelete(_) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm_delete(false),
                _ => {}
            },
        }
    }
}
