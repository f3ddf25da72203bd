//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the task list and the
//! screen state (input text, selected category, open modal, loading flag),
//! handles key presses and renders the single task list screen with its
//! category picker, confirmation, alert and help overlays.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::error::{Alert, TodoError};
use crate::fields::Category;
use crate::seed::{seed_if_empty, SeedSource};
use crate::todos::TodoList;
use crate::tui::{
    colors::{category_colors, LIGHT_GRAY, ORANGE, RED},
    enums::{AppState, ConfirmAction, Focus},
    input::InputField,
    utils::{centered_fixed, centered_rect},
};

/// Seed loader wiring for startup.
pub struct SeedPlan {
    pub source: Box<dyn SeedSource>,
    pub count: u32,
}

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    todos: TodoList,
    seed: Option<SeedPlan>,
    input: InputField,
    focus: Focus,
    selected_category: Category,
    picker_index: usize,
    list_state: ListState,
    confirm_action: Option<ConfirmAction>,
    alert: Option<Alert>,
    status_message: String,
}

impl App {
    /// Create an app over `todos`. Nothing is loaded until [`App::startup`].
    pub fn new(todos: TodoList, seed: Option<SeedPlan>) -> Self {
        App {
            state: AppState::Loading,
            todos,
            seed,
            input: InputField::new(),
            focus: Focus::Input,
            selected_category: Category::default(),
            picker_index: Category::default().index(),
            list_state: ListState::default(),
            confirm_action: None,
            alert: None,
            status_message: String::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == AppState::Loading
    }

    /// Load the persisted list, then seed it if it is empty.
    ///
    /// A failed load skips seeding so the unreadable snapshot is not
    /// overwritten.
    pub fn startup(&mut self) {
        self.state = AppState::TaskList;
        if let Err(e) = self.todos.load() {
            self.show_error(&e);
            return;
        }
        if let Some(plan) = self.seed.take() {
            match seed_if_empty(&mut self.todos, plan.source.as_ref(), plan.count) {
                Ok(added) if !added.is_empty() => {
                    self.set_status_message(format!("Loaded {} starter tasks", added.len()));
                }
                Ok(_) => {}
                Err(e) => self.show_error(&e),
            }
        }
        self.sync_selection();
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn show_error(&mut self, err: &TodoError) {
        warn!(error = %err, "showing alert");
        self.alert = Some(err.alert());
        self.state = AppState::Alert;
    }

    fn selected_task_id(&self) -> Option<String> {
        self.list_state
            .selected()
            .and_then(|i| self.todos.tasks().get(i))
            .map(|t| t.id.clone())
    }

    /// Keep the list selection inside the current list.
    fn sync_selection(&mut self) {
        let len = self.todos.len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None if self.focus == Focus::List => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.todos.len();
        if len == 0 {
            return;
        }
        let next = match self.list_state.selected() {
            Some(i) if down => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    fn add_task(&mut self) {
        match self.todos.add(&self.input.value, self.selected_category) {
            Ok(task) => {
                self.input.clear();
                self.list_state.select(Some(self.todos.len() - 1));
                self.set_status_message(format!("Added task #{}", task.id));
            }
            Err(e) => {
                if matches!(e, TodoError::Save(_)) {
                    self.input.clear();
                }
                self.show_error(&e);
            }
        }
        self.sync_selection();
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.todos.toggle(&id) {
            Ok(Some(true)) => self.set_status_message(format!("Task #{id} completed")),
            Ok(Some(false)) => self.set_status_message(format!("Task #{id} reopened")),
            Ok(None) => {}
            Err(e) => self.show_error(&e),
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        match self.todos.delete(&id) {
            Ok(true) => self.set_status_message(format!("Deleted task #{id}")),
            Ok(false) => {}
            Err(e) => self.show_error(&e),
        }
        self.sync_selection();
    }

    fn ask_confirm(&mut self, action: ConfirmAction) {
        self.confirm_action = Some(action);
        self.state = AppState::Confirm;
    }

    fn run_confirmed(&mut self, action: ConfirmAction) {
        self.state = AppState::TaskList;
        let result = match action {
            ConfirmAction::ClearCompleted => self.todos.clear_completed(),
            ConfirmAction::ClearAll => self.todos.clear_all(),
        };
        match result {
            Ok(n) => self.set_status_message(format!("Removed {n} task(s)")),
            Err(e) => self.show_error(&e),
        }
        self.sync_selection();
    }

    fn open_picker(&mut self) {
        self.picker_index = self.selected_category.index();
        self.state = AppState::CategoryPicker;
    }

    fn pick_category(&mut self, category: Category) {
        self.selected_category = category;
        self.state = AppState::TaskList;
        self.set_status_message(format!("Category: {}", category.label()));
    }

    fn focus_list(&mut self) {
        self.focus = Focus::List;
        self.sync_selection();
    }

    /// Dispatch a key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.status_message.clear();
        match self.state {
            AppState::Loading => false,
            AppState::TaskList => match self.focus {
                Focus::Input => self.handle_input_key(key),
                Focus::List => self.handle_list_key(key),
            },
            AppState::CategoryPicker => {
                self.handle_picker_key(key);
                false
            }
            AppState::Confirm => {
                self.handle_confirm_key(key);
                false
            }
            AppState::Alert => {
                if matches!(
                    key.code,
                    KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('q')
                ) {
                    self.alert = None;
                    self.state = AppState::TaskList;
                }
                false
            }
            AppState::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Char('?')
                ) {
                    self.state = AppState::TaskList;
                }
                false
            }
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => self.add_task(),
            KeyCode::Tab => self.focus_list(),
            KeyCode::Char('p') if ctrl => self.open_picker(),
            KeyCode::Esc => {
                if self.input.value.is_empty() {
                    return true;
                }
                self.input.clear();
            }
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down => self.move_selection(true),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.input.handle_char(c);
            }
            _ => {}
        }
        false
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('i') | KeyCode::Char('a') => {
                self.focus = Focus::Input;
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('c') => self.open_picker(),
            KeyCode::Char('x') => self.ask_confirm(ConfirmAction::ClearCompleted),
            KeyCode::Char('X') => self.ask_confirm(ConfirmAction::ClearAll),
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let last = Category::ALL.len() - 1;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.picker_index = self.picker_index.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.picker_index = (self.picker_index + 1).min(last),
            KeyCode::Char(d @ '1'..='3') => {
                let idx = d as usize - '1' as usize;
                self.pick_category(Category::ALL[idx]);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.pick_category(Category::ALL[self.picker_index.min(last)]);
            }
            KeyCode::Esc => self.state = AppState::TaskList,
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(action) = self.confirm_action.take() {
                    self.run_confirmed(action);
                } else {
                    self.state = AppState::TaskList;
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
    }

    /// Poll for and handle one key event. Returns true if the app should quit.
    fn handle_events(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                debug!(code = ?key.code, state = ?self.state, "key");
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    fn render_loading(&self, f: &mut Frame, area: Rect) {
        let text = Paragraph::new("Loading tasks...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::White));
        f.render_widget(text, centered_fixed(30, 1, area));
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header = Paragraph::new(Line::from(Span::styled(
            "TO-DO LIST",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_input_row(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(12), Constraint::Length(9)])
            .split(area);
        let colors = category_colors(self.selected_category);
        let focused = self.focus == Focus::Input && self.state == AppState::TaskList;

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(colors.border)
            } else {
                Style::default().fg(Color::Gray)
            })
            .title("New task");
        let inner = input_block.inner(chunks[0]);
        let width = inner.width.max(1) as usize;
        let offset = self.input.cursor.saturating_sub(width - 1);
        let content = if self.input.value.is_empty() {
            Line::from(Span::styled(
                "Add a new task...",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(self.input.value.chars().skip(offset).take(width).collect::<String>())
        };
        f.render_widget(Paragraph::new(content).block(input_block), chunks[0]);
        if focused {
            f.set_cursor_position((inner.x + (self.input.cursor - offset) as u16, inner.y));
        }

        let badge = Paragraph::new(self.selected_category.label())
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .bg(colors.background)
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(colors.border)),
            );
        f.render_widget(badge, chunks[1]);

        let add = Paragraph::new("Add")
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .bg(colors.border)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(add, chunks[2]);
    }

    fn render_actions(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let button = |label: &'static str, bg: Color| {
            Paragraph::new(label).alignment(Alignment::Center).style(
                Style::default()
                    .bg(bg)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        };
        f.render_widget(button("[x] Clear Completed", ORANGE), chunks[0]);
        f.render_widget(button("[X] Clear All", RED), chunks[1]);
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(format!(
            "Tasks ({} done / {}) - Press 'h' for help",
            self.todos.completed_count(),
            self.todos.len()
        ));

        if self.todos.is_empty() {
            let empty = Paragraph::new("No tasks yet. Type one above and press Enter.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .todos
            .tasks()
            .iter()
            .map(|task| {
                let colors = category_colors(task.category);
                let mut text_style = Style::default().fg(colors.text).add_modifier(Modifier::BOLD);
                if task.completed {
                    text_style = text_style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
                }
                let bar = Span::styled("▌ ", Style::default().fg(colors.border));
                ListItem::new(vec![
                    Line::from(vec![bar.clone(), Span::styled(task.text.clone(), text_style)]),
                    Line::from(vec![
                        bar,
                        Span::styled(task.category.label(), Style::default().fg(colors.text)),
                    ]),
                ])
                .style(Style::default().bg(colors.background))
            })
            .collect();

        let highlight = if self.focus == Focus::List {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("► ");
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_picker(&self, f: &mut Frame, area: Rect) {
        let area = centered_fixed(36, Category::ALL.len() as u16 * 2 + 3, area);
        f.render_widget(Clear, area);

        let items: Vec<ListItem> = Category::ALL
            .iter()
            .map(|&c| {
                let colors = category_colors(c);
                let marker = if c == self.selected_category { "● " } else { "  " };
                let style = if c == self.selected_category {
                    Style::default().fg(colors.text).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.text).add_modifier(Modifier::DIM)
                };
                ListItem::new(vec![
                    Line::from(Span::styled(format!("{}{}", marker, c.label()), style)),
                    Line::from(""),
                ])
                .style(Style::default().bg(colors.background))
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(self.picker_index));
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Select Category")
                    .style(Style::default().bg(Color::White).fg(Color::Black)),
            )
            .highlight_symbol("► ");
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_modal(&self, f: &mut Frame, area: Rect, title: &str, body: &str, hint: &str, bg: Color) {
        let area = centered_rect(60, 40, area);
        f.render_widget(Clear, area);
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(body.to_string(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(hint.to_string()),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title(title.to_string())
                    .borders(Borders::ALL)
                    .style(Style::default().bg(bg).fg(Color::White)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("To-Do List Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Input:", bold)),
            Line::from("  Type         Edit the new task text"),
            Line::from("  Enter        Add task"),
            Line::from("  Ctrl+P       Choose category"),
            Line::from("  Tab          Move to the task list"),
            Line::from("  Esc          Clear input / quit"),
            Line::from(""),
            Line::from(Span::styled("Task list:", bold)),
            Line::from("  ↑/↓, k/j     Select task"),
            Line::from("  Space/Enter  Toggle completed"),
            Line::from("  d/Delete     Delete task"),
            Line::from("  c            Choose category"),
            Line::from("  x            Clear completed tasks"),
            Line::from("  X            Clear all tasks"),
            Line::from("  Tab/i        Back to input"),
            Line::from("  h/?          Show this help"),
            Line::from("  q/Esc        Quit"),
            Line::from(""),
            Line::from("  Ctrl+C       Quit from anywhere"),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Esc to return"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match (self.state, self.focus) {
                (AppState::Loading, _) => "Loading...".to_string(),
                (AppState::TaskList, Focus::Input) => {
                    "Enter add | Ctrl+P category | Tab list | h help (from list)".to_string()
                }
                (AppState::TaskList, Focus::List) => {
                    "Space toggle | d delete | x clear done | X clear all | Tab input".to_string()
                }
                (AppState::CategoryPicker, _) => "↑/↓ choose | Enter select | Esc cancel".to_string(),
                (AppState::Confirm, _) => "y confirm | n cancel".to_string(),
                (AppState::Alert, _) => "Enter dismiss".to_string(),
                (AppState::Help, _) => "Help".to_string(),
            }
        };
        let colors = category_colors(self.selected_category);
        let status = Paragraph::new(text)
            .style(Style::default().bg(colors.border).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the screen and overlays.
    pub(crate) fn render(&mut self, f: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        if self.state == AppState::Loading {
            self.render_loading(f, outer[0]);
            self.render_status_bar(f, outer[1]);
            return;
        }
        if self.state == AppState::Help {
            self.render_help(f, outer[0]);
            self.render_status_bar(f, outer[1]);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(outer[0]);
        f.render_widget(Block::default().style(Style::default().bg(LIGHT_GRAY).fg(Color::Black)), outer[0]);
        self.render_header(f, chunks[0]);
        self.render_input_row(f, chunks[1]);
        self.render_actions(f, chunks[2]);
        self.render_task_list(f, chunks[3]);

        match self.state {
            AppState::CategoryPicker => self.render_picker(f, outer[0]),
            AppState::Confirm => {
                if let Some(action) = self.confirm_action {
                    self.render_modal(
                        f,
                        outer[0],
                        action.title(),
                        action.question(),
                        "Press 'y' to confirm, 'n' to cancel",
                        RED,
                    );
                }
            }
            AppState::Alert => {
                if let Some(alert) = &self.alert {
                    self.render_modal(f, outer[0], &alert.title, &alert.message, "Press Enter to dismiss", Color::DarkGray);
                }
            }
            _ => {}
        }
        self.render_status_bar(f, outer[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Draws the loading screen, runs the startup load and seed, then
    /// handles rendering and input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|f| self.render(f))?;
        if self.is_loading() {
            self.startup();
        }
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_events()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::db::TaskRepository;
    use crate::seed::RemoteTodo;
    use crate::storage::{FlakyStore, MemoryStore};

    struct FixedSource(Result<Vec<&'static str>, ()>);

    impl SeedSource for FixedSource {
        fn fetch(&self, n: u32) -> Result<RemoteTodo, TodoError> {
            match &self.0 {
                Ok(titles) => Ok(RemoteTodo {
                    title: titles[n as usize - 1].to_string(),
                }),
                Err(()) => Err(TodoError::network("test://seed", "offline")),
            }
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn started_app() -> App {
        let todos = TodoList::new(TaskRepository::new(Box::new(MemoryStore::new())));
        let mut app = App::new(todos, None);
        app.startup();
        app
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_startup_seeds_empty_list() {
        let todos = TodoList::new(TaskRepository::new(Box::new(MemoryStore::new())));
        let plan = SeedPlan {
            source: Box::new(FixedSource(Ok(vec!["one", "two", "three"]))),
            count: 3,
        };
        let mut app = App::new(todos, Some(plan));
        assert!(app.is_loading());
        app.startup();
        assert!(!app.is_loading());
        assert_eq!(app.todos.len(), 3);
        assert_eq!(app.state, AppState::TaskList);
    }

    #[test]
    fn test_startup_seed_failure_shows_alert() {
        let todos = TodoList::new(TaskRepository::new(Box::new(MemoryStore::new())));
        let plan = SeedPlan {
            source: Box::new(FixedSource(Err(()))),
            count: 3,
        };
        let mut app = App::new(todos, Some(plan));
        app.startup();
        assert_eq!(app.state, AppState::Alert);
        assert_eq!(app.alert.as_ref().unwrap().message, "Failed to load tasks from the API");
        assert!(app.todos.is_empty());
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::TaskList);
    }

    #[test]
    fn test_startup_load_failure_skips_seed() {
        let store = FlakyStore::default();
        store.fail_reads.set(true);
        let todos = TodoList::new(TaskRepository::new(Box::new(store)));
        let plan = SeedPlan {
            source: Box::new(FixedSource(Ok(vec!["a", "b", "c"]))),
            count: 3,
        };
        let mut app = App::new(todos, Some(plan));
        app.startup();
        assert_eq!(app.alert.as_ref().unwrap().message, "Failed to load tasks");
        assert!(app.todos.is_empty());
    }

    #[test]
    fn test_type_and_add_with_category() {
        let mut app = started_app();
        app.handle_key(ctrl('p'));
        assert_eq!(app.state, AppState::CategoryPicker);
        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.selected_category, Category::Work);

        type_text(&mut app, "write report");
        app.handle_key(key(KeyCode::Enter));
        let tasks = app.todos.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "write report");
        assert_eq!(tasks[0].category, Category::Work);
        assert!(app.input.value.is_empty());
    }

    #[test]
    fn test_blank_add_alerts_without_mutation() {
        let mut app = started_app();
        type_text(&mut app, "   ");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Alert);
        assert_eq!(app.alert.as_ref().unwrap().message, "Enter a valid task");
        assert!(app.todos.is_empty());
    }

    #[test]
    fn test_list_toggle_and_delete() {
        let mut app = started_app();
        for text in ["a", "b"] {
            type_text(&mut app, text);
            app.handle_key(key(KeyCode::Enter));
        }
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.todos.tasks()[0].completed);
        assert!(!app.todos.tasks()[1].completed);

        app.handle_key(key(KeyCode::Char('d')));
        let texts: Vec<&str> = app.todos.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["b"]);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_save_failures_alert_and_keep_memory() {
        let store = FlakyStore::default();
        let todos = TodoList::new(TaskRepository::new(Box::new(store.clone())));
        let mut app = App::new(todos, None);
        app.startup();
        for text in ["a", "b"] {
            type_text(&mut app, text);
            app.handle_key(key(KeyCode::Enter));
        }
        store.fail_writes.set(true);
        let saved = || TaskRepository::new(Box::new(store.clone())).load().unwrap();

        type_text(&mut app, "c");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Alert);
        assert_eq!(app.alert.as_ref().unwrap().message, "Failed to save tasks");
        assert!(app.input.value.is_empty());
        assert_eq!(app.todos.len(), 3);
        assert_eq!(saved().len(), 2);
        app.handle_key(key(KeyCode::Enter));

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.alert.as_ref().unwrap().message, "Failed to save tasks");
        assert!(app.todos.tasks()[1].completed);
        assert!(saved().iter().all(|t| !t.completed));
        app.handle_key(key(KeyCode::Esc));

        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.state, AppState::Alert);
        let texts: Vec<&str> = app.todos.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert_eq!(saved().len(), 2);
    }

    #[test]
    fn test_bulk_clear_requires_confirmation() {
        let mut app = started_app();
        for text in ["a", "b", "c"] {
            type_text(&mut app, text);
            app.handle_key(key(KeyCode::Enter));
        }
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char(' ')));

        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Confirm);
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.todos.len(), 3);

        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.todos.len(), 2);

        app.handle_key(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.todos.is_empty());
        assert!(app.todos.repository().load().unwrap().is_empty());
        assert_eq!(app.list_state.selected(), None);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = started_app();
        type_text(&mut app, "q");
        assert!(!app.handle_key(key(KeyCode::Esc)));
        assert!(app.handle_key(key(KeyCode::Esc)));
        assert!(app.handle_key(ctrl('c')));
    }

    #[test]
    fn test_render_task_list() {
        let mut app = started_app();
        type_text(&mut app, "buy milk");
        app.handle_key(key(KeyCode::Enter));
        let text = screen(&mut app);
        assert!(text.contains("TO-DO LIST"));
        assert!(text.contains("buy milk"));
        assert!(text.contains("Other"));
        assert!(text.contains("Clear Completed"));
    }

    #[test]
    fn test_render_overlays() {
        let mut app = App::new(
            TodoList::new(TaskRepository::new(Box::new(MemoryStore::new()))),
            None,
        );
        assert!(screen(&mut app).contains("Loading tasks..."));
        app.startup();
        assert!(screen(&mut app).contains("No tasks yet"));
        app.handle_key(ctrl('p'));
        assert!(screen(&mut app).contains("Select Category"));
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT));
        assert!(screen(&mut app).contains("remove all tasks"));
    }
}
