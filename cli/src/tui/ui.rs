use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};
use habitism_core::CalendarCell;
use unicode_width::UnicodeWidthChar;

use crate::tui::app::{App, InputMode};

struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    done: Color,
    today: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    done: Color::Green,
    today: Color::Yellow,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer/Help
        ])
        .split(size);

    let header = Paragraph::new("HABITISM")
        .style(Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(main_chunks[1]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(16), // Calendar: title, headers, 6 weeks
            Constraint::Min(6),     // Stats
        ])
        .split(content_chunks[1]);

    draw_habit_list(f, app, content_chunks[0]);
    draw_calendar(f, app, right_chunks[0]);
    draw_stats(f, app, right_chunks[1]);
    draw_footer(f, app, main_chunks[2]);
}

fn draw_habit_list(f: &mut Frame, app: &mut App, area: Rect) {
    // Borders, highlight symbol and the two short columns.
    let name_width = usize::from(area.width).saturating_sub(12);

    let rows: Vec<Row> = app
        .habits()
        .iter()
        .map(|habit| {
            let done_today = app.service.is_completed(&habit.id, app.today);
            let icon = if done_today { "✔" } else { "☐" };
            let icon_style = if done_today {
                Style::default().fg(THEME.done)
            } else {
                Style::default().fg(THEME.muted)
            };
            Row::new(vec![
                Cell::from(Span::styled(icon, icon_style)),
                Cell::from(Span::styled(
                    truncate(&habit.name, name_width),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            ])
        })
        .collect();

    let title = if rows.is_empty() {
        " Habits (a: add) "
    } else {
        " Habits "
    };

    let table = Table::new(rows, [Constraint::Length(3), Constraint::Min(10)])
        .header(Row::new(vec!["", "Habit"]).style(Style::default().fg(THEME.today)))
        .block(Block::default().title(title).borders(Borders::ALL).border_type(BorderType::Rounded))
        .row_highlight_style(Style::default().bg(THEME.muted).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_calendar(f: &mut Frame, app: &App, area: Rect) {
    let grid = app.grid();

    let header = Row::new(grid.headers.iter().map(|h| Cell::from(*h)))
        .style(Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = grid
        .weeks()
        .map(|week| Row::new(week.iter().map(|cell| day_cell(cell, app))))
        .collect();

    let title = match app.service.selected() {
        Some(habit) => format!(" {} · {} ", grid.month, habit.name),
        None => format!(" {} · select a habit ", grid.month),
    };

    let table = Table::new(rows, [Constraint::Length(5); 7])
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(title)
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted)),
        );

    f.render_widget(table, area);
}

fn day_cell<'a>(cell: &CalendarCell, app: &App) -> Cell<'a> {
    let mut style = if !cell.in_current_month {
        Style::default().fg(THEME.muted)
    } else if cell.is_completed {
        Style::default().fg(Color::Black).bg(THEME.done)
    } else {
        Style::default().fg(THEME.text)
    };
    if cell.is_today {
        style = style.fg(THEME.today).add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if cell.in_current_month && cell.date == app.cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Cell::from(format!("{:>3}", cell.day)).style(style)
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Statistics ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted));

    let Some(stats) = app.stats() else {
        let empty = Paragraph::new("Select a habit to view statistics")
            .style(Style::default().fg(THEME.muted))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let stat = |label: &'static str, value: String, unit: &'static str| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(THEME.muted)),
            Span::styled(value, Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)),
            Span::styled(unit, Style::default().fg(THEME.muted)),
        ])
    };

    let text = vec![
        stat("Current streak:    ", stats.current_streak.to_string(), " days in a row"),
        stat("Longest streak:    ", stats.longest_streak.to_string(), " days"),
        stat("Total completions: ", stats.total_completions.to_string(), " times"),
    ];
    f.render_widget(Paragraph::new(text).block(block), chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(format!(" {} completion rate ", app.month))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted)),
        )
        .gauge_style(Style::default().fg(THEME.done))
        .percent(u16::from(stats.monthly_rate))
        .label(format!("{}%", stats.monthly_rate));
    f.render_widget(gauge, chunks[1]);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.input_mode {
        InputMode::Adding => Line::from(vec![
            Span::styled("New habit: ", Style::default().fg(THEME.primary)),
            Span::raw(app.input.as_str()),
            Span::styled("  (Enter: save, Esc: cancel)", Style::default().fg(THEME.muted)),
        ]),
        InputMode::ConfirmDelete(_) => Line::from(Span::styled(
            format!(
                "Delete '{}' and all its completions? (y/n)",
                app.pending_delete_name().unwrap_or("?")
            ),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        InputMode::Normal => match &app.message {
            Some(message) => Line::from(Span::styled(message.as_str(), Style::default().fg(THEME.today))),
            None => Line::from(Span::styled(
                "j/k: habit | ←/→/↑/↓: day | p/n: month | t: today | space: toggle | a: add | d: delete | q: quit",
                Style::default().fg(THEME.muted),
            )),
        },
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);

    if let InputMode::Adding = app.input_mode {
        let prefix = "New habit: ".len() as u16;
        let typed: usize = app
            .input
            .chars()
            .take(app.cursor_position)
            .map(|c| c.width().unwrap_or(0))
            .sum();
        let line_width = prefix as usize
            + app.input.chars().map(|c| c.width().unwrap_or(0)).sum::<usize>()
            + "  (Enter: save, Esc: cancel)".len();
        let start = area.x + area.width.saturating_sub(line_width as u16) / 2;
        f.set_cursor_position((start + prefix + typed as u16, area.y));
    }
}

/// Cuts `name` to `max` display columns, ending in an ellipsis when shortened.
fn truncate(name: &str, max: usize) -> String {
    let total: usize = name.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return name.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in name.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
