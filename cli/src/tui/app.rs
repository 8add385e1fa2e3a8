use chrono::{Duration, NaiveDate};
use habitism_core::{
    CalendarGrid, Confirmation, DeleteOutcome, FileHabitRepository, Habit, HabitId, HabitService,
    StatsSummary, YearMonth,
};
use ratatui::widgets::TableState;

pub enum InputMode {
    Normal,
    Adding,
    ConfirmDelete(HabitId),
}

pub struct App {
    pub service: HabitService<FileHabitRepository>,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub today: NaiveDate,
    /// Day the calendar cursor sits on; always inside `month`.
    pub cursor: NaiveDate,
    pub month: YearMonth,
    pub message: Option<String>,
}

impl App {
    pub fn new(service: HabitService<FileHabitRepository>, today: NaiveDate) -> App {
        let mut state = TableState::default();
        let selected = service
            .selected()
            .and_then(|s| service.habits().iter().position(|h| h.id == s.id));
        state.select(selected.or(if service.habits().is_empty() { None } else { Some(0) }));

        let mut app = App {
            service,
            state,
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            today,
            cursor: today,
            month: YearMonth::of(today),
            message: None,
        };
        app.sync_selection();
        app
    }

    pub fn habits(&self) -> &[Habit] {
        self.service.habits()
    }

    pub fn grid(&self) -> CalendarGrid {
        self.service.grid(self.month, self.today)
    }

    pub fn stats(&self) -> Option<StatsSummary> {
        self.service.selected_stats(self.today, self.month)
    }

    pub fn next(&mut self) {
        if self.habits().is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.habits().len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
        self.sync_selection();
    }

    pub fn previous(&mut self) {
        if self.habits().is_empty() {
            return;
        }

        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.habits().len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
        self.sync_selection();
    }

    /// Moves the calendar cursor; the displayed month follows it.
    pub fn move_cursor(&mut self, days: i64) {
        if let Some(date) = self.cursor.checked_add_signed(Duration::days(days)) {
            self.cursor = date;
            self.month = YearMonth::of(date);
        }
    }

    pub fn change_month(&mut self, direction: i32) {
        let month = self.month.shift(direction);
        if month == self.month {
            return;
        }
        self.month = month;
        self.cursor = if month.contains(self.today) {
            self.today
        } else {
            month.first_day()
        };
    }

    pub fn jump_to_today(&mut self) {
        self.cursor = self.today;
        self.month = YearMonth::of(self.today);
    }

    pub fn toggle_cursor(&mut self) {
        match self.service.toggle_selected(self.cursor) {
            Ok(done) => {
                let mark = if done { "done" } else { "not done" };
                self.message = Some(format!("{}: {}", self.cursor.format("%Y-%m-%d"), mark));
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn request_delete(&mut self) {
        let Some(habit) = self.service.selected().cloned() else {
            return;
        };
        match self.service.delete_habit(&habit.id, Confirmation::Pending) {
            Ok(DeleteOutcome::NeedsConfirmation(habit)) => {
                self.input_mode = InputMode::ConfirmDelete(habit.id);
            }
            Ok(DeleteOutcome::Deleted(_)) => {}
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn confirm_delete(&mut self, granted: bool) {
        let InputMode::ConfirmDelete(id) = std::mem::replace(&mut self.input_mode, InputMode::Normal)
        else {
            return;
        };
        if !granted {
            self.message = Some("Delete cancelled".to_string());
            return;
        }

        let i = self.state.selected().unwrap_or(0);
        match self.service.delete_habit(&id, Confirmation::Granted) {
            Ok(DeleteOutcome::Deleted(habit)) => {
                self.message = Some(format!("Deleted {}", habit.name));
            }
            Ok(DeleteOutcome::NeedsConfirmation(_)) => {}
            Err(e) => self.message = Some(e.to_string()),
        }

        // Adjust selection after delete
        let len = self.habits().len();
        if len == 0 {
            self.state.select(None);
        } else if i >= len {
            self.state.select(Some(len - 1));
        } else {
            self.state.select(Some(i));
        }
        self.sync_selection();
    }

    pub fn pending_delete_name(&self) -> Option<&str> {
        match &self.input_mode {
            InputMode::ConfirmDelete(id) => self.service.find(id).map(|h| h.name.as_str()),
            _ => None,
        }
    }

    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input.chars().take(self.cursor_position).map(|c| c.len_utf8()).sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self.input.chars().take(self.cursor_position - 1).map(|c| c.len_utf8()).sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_input_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_input_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn submit_add(&mut self) {
        if self.input.trim().is_empty() {
            self.message = Some("Please enter a habit name".to_string());
            self.exit_input_mode();
            return;
        }

        match self.service.add_habit(&self.input) {
            Ok(habit) => {
                let last = self.habits().len() - 1;
                self.state.select(Some(last));
                self.sync_selection();
                self.message = Some(format!("Added {}", habit.name));
            }
            Err(e) => self.message = Some(e.to_string()),
        }

        self.input.clear();
        self.cursor_position = 0;
        self.exit_input_mode();
    }

    /// Persists the highlighted row as the selected habit.
    fn sync_selection(&mut self) {
        let id = self
            .state
            .selected()
            .and_then(|i| self.service.habits().get(i))
            .map(|h| h.id.clone());
        if let Err(e) = self.service.select(id.as_ref()) {
            self.message = Some(e.to_string());
        }
    }
}
