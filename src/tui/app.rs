#![forbid(unsafe_code)]

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};

use crate::api::mock::MockTaskApi;
use crate::config::{self, Config};
use crate::showcase;
use crate::store::TaskStore;
use crate::store::persist::SnapshotStorage;
use crate::task::model::{Priority, StatusFilter, Task, TaskDraft, TaskPatch, TaskStatus};
use crate::tui;

/// Run the single-page task screen until the user quits.
pub async fn run(cfg: Config) -> anyhow::Result<()> {
    let store = if cfg.storage.enabled {
        let dir = config::expand_path(&cfg.storage.dir)?;
        TaskStore::with_storage(SnapshotStorage::new(dir, &cfg.storage.file))
    } else {
        TaskStore::new()
    };

    let delay = Duration::from_millis(cfg.fetch.delay_ms);
    let source = if cfg.fetch.fail {
        MockTaskApi::failing(delay, cfg.fetch.failure_message.clone())
    } else {
        MockTaskApi::new(delay)
    };

    let mut app = AppState::new(&cfg, store, source);

    let terminal = tui::init_terminal()?;
    let mut guard = tui::TerminalGuard::new(terminal);

    loop {
        {
            let Some(terminal) = guard.terminal.as_mut() else {
                anyhow::bail!("terminal unavailable");
            };
            terminal.draw(|f| draw(f, &mut app))?;
        }

        if app.pending_fetch {
            app.pending_fetch = false;
            app.store.fetch_tasks(&app.source).await;
            app.status = match app.store.error() {
                Some(_) => None,
                None => Some(format!("Fetched {} task(s)", app.store.tasks().len())),
            };
            app.clamp_selection();
            continue;
        }

        if event::poll(Duration::from_millis(app.tick_ms))?
            && let Event::Key(key) = event::read()?
            && handle_key(key, &mut app)
        {
            break;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Searching,
    Form,
    Confirm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum FormField {
    #[default]
    Title,
    Description,
    Priority,
    Status,
}

impl FormField {
    const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::Priority,
        FormField::Status,
    ];

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfirmAction {
    DeleteTask(String),
    ClearCompleted,
    Reset,
}

#[derive(Debug, Clone, Default)]
struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    fn new(initial: impl Into<String>) -> Self {
        let text = initial.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn as_str(&self) -> &str {
        &self.text
    }

    fn insert_char(&mut self, c: char) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let cur = self.cursor.min(chars.len());
        chars.insert(cur, c);
        self.text = chars.into_iter().collect();
        self.cursor = cur + 1;
    }

    fn backspace(&mut self) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let cur = self.cursor.min(chars.len());
        if cur == 0 {
            return;
        }
        chars.remove(cur - 1);
        self.text = chars.into_iter().collect();
        self.cursor = cur - 1;
    }

    fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_right(&mut self) {
        let len = self.text.chars().count();
        self.cursor = (self.cursor + 1).min(len);
    }
}

/// The new/edit task form. `editing` carries the id of the task being
/// edited; `None` means the form creates a new task.
#[derive(Debug, Clone, Default)]
struct TaskForm {
    title: TextInput,
    description: TextInput,
    priority: Priority,
    status: TaskStatus,
    field: FormField,
    editing: Option<String>,
}

impl TaskForm {
    fn for_new() -> Self {
        Self::default()
    }

    fn for_edit(task: &Task) -> Self {
        Self {
            title: TextInput::new(task.title.clone()),
            description: TextInput::new(task.description.clone()),
            priority: task.priority,
            status: task.status,
            field: FormField::Title,
            editing: Some(task.id.clone()),
        }
    }

    fn draft(&self) -> Option<TaskDraft> {
        let title = self.title.as_str().trim().to_owned();
        if title.is_empty() {
            return None;
        }
        Some(TaskDraft {
            title,
            description: self.description.as_str().trim().to_owned(),
            status: self.status,
            priority: self.priority,
        })
    }

    fn patch(&self) -> Option<TaskPatch> {
        let draft = self.draft()?;
        Some(TaskPatch {
            title: Some(draft.title),
            description: Some(draft.description),
            status: Some(draft.status),
            priority: Some(draft.priority),
        })
    }
}

struct AppState {
    store: TaskStore,
    source: MockTaskApi,
    icons: bool,
    tick_ms: u64,

    mode: Mode,
    table_state: TableState,
    search_input: TextInput,
    form: TaskForm,
    confirm: Option<ConfirmAction>,
    show_detail: bool,
    pending_fetch: bool,
    status: Option<String>,
}

impl AppState {
    fn new(cfg: &Config, mut store: TaskStore, source: MockTaskApi) -> Self {
        if !cfg.ui.default_filter.trim().is_empty() && store.filter() == StatusFilter::All {
            store.set_filter(StatusFilter::parse(&cfg.ui.default_filter));
        }
        let pending_fetch = store.tasks().is_empty();

        let mut table_state = TableState::default();
        table_state.select(Some(0));
        Self {
            store,
            source,
            icons: cfg.ui.icons,
            tick_ms: cfg.ui.tick_ms.max(1),
            mode: Mode::Normal,
            table_state,
            search_input: TextInput::default(),
            form: TaskForm::default(),
            confirm: None,
            show_detail: false,
            pending_fetch,
            status: None,
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_task_id(&self) -> Option<String> {
        let visible = self.store.filtered_tasks();
        visible
            .get(self.selected_index().min(visible.len().saturating_sub(1)))
            .map(|t| t.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.store.filtered_tasks().len();
        if len == 0 {
            self.table_state.select(Some(0));
            return;
        }
        let idx = self.selected_index().min(len - 1);
        self.table_state.select(Some(idx));
    }

    fn move_selection(&mut self, delta: i64) {
        let len = self.store.filtered_tasks().len();
        if len == 0 {
            return;
        }
        let cur = i64::try_from(self.selected_index()).unwrap_or(i64::MAX);
        let max = i64::try_from(len - 1).unwrap_or(i64::MAX);
        let next = (cur + delta).clamp(0, max);
        self.table_state.select(Some(usize::try_from(next).unwrap_or(0)));
    }
}

/// Returns true when the app should quit.
fn handle_key(key: KeyEvent, app: &mut AppState) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        return true;
    }

    match app.mode {
        Mode::Normal => handle_key_normal(key, app),
        Mode::Searching => {
            handle_key_searching(key, app);
            false
        }
        Mode::Form => {
            handle_key_form(key, app);
            false
        }
        Mode::Confirm => {
            handle_key_confirm(key, app);
            false
        }
    }
}

fn handle_key_normal(key: KeyEvent, app: &mut AppState) -> bool {
    if app.show_detail {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.show_detail = false,
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return true,
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Char('a') => {
            app.form = TaskForm::for_new();
            app.mode = Mode::Form;
        }
        KeyCode::Char('e') => {
            if let Some(id) = app.selected_task_id()
                && let Some(task) = app.store.task(&id)
            {
                app.form = TaskForm::for_edit(task);
                app.mode = Mode::Form;
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('t') => {
            if let Some(id) = app.selected_task_id() {
                app.store.toggle_task_status(&id);
                // A toggled task can drop out of the current filter.
                app.clamp_selection();
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = app.selected_task_id() {
                app.confirm = Some(ConfirmAction::DeleteTask(id));
                app.mode = Mode::Confirm;
            }
        }
        KeyCode::Char('C') => {
            app.confirm = Some(ConfirmAction::ClearCompleted);
            app.mode = Mode::Confirm;
        }
        KeyCode::Char('R') => {
            app.confirm = Some(ConfirmAction::Reset);
            app.mode = Mode::Confirm;
        }
        KeyCode::Char('/') => {
            app.search_input = TextInput::new(app.store.search_query().to_owned());
            app.mode = Mode::Searching;
        }
        KeyCode::Tab | KeyCode::Char('f') => {
            app.store.set_filter(app.store.filter().next());
            app.clamp_selection();
        }
        KeyCode::Char('1') => set_filter(app, StatusFilter::All),
        KeyCode::Char('2') => set_filter(app, StatusFilter::Pending),
        KeyCode::Char('3') => set_filter(app, StatusFilter::InProgress),
        KeyCode::Char('4') => set_filter(app, StatusFilter::Completed),
        KeyCode::Char('r') => app.pending_fetch = true,
        KeyCode::Enter => app.show_detail = true,
        _ => {}
    }
    false
}

fn set_filter(app: &mut AppState, filter: StatusFilter) {
    app.store.set_filter(filter);
    app.clamp_selection();
}

fn handle_key_searching(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Enter => {
            app.store
                .set_search_query(app.search_input.as_str().to_owned());
            app.mode = Mode::Normal;
            app.clamp_selection();
        }
        KeyCode::Backspace => app.search_input.backspace(),
        KeyCode::Left => app.search_input.move_left(),
        KeyCode::Right => app.search_input.move_right(),
        KeyCode::Char(c) => app.search_input.insert_char(c),
        _ => {}
    }
}

fn handle_key_form(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Tab | KeyCode::Down => app.form.field = app.form.field.next(),
        KeyCode::BackTab | KeyCode::Up => app.form.field = app.form.field.prev(),
        KeyCode::Enter => {
            let submitted = match app.form.editing.clone() {
                Some(id) => match app.form.patch() {
                    Some(patch) => {
                        app.store.update_task(&id, patch);
                        true
                    }
                    None => false,
                },
                None => match app.form.draft() {
                    Some(draft) => {
                        app.store.add_task(draft);
                        true
                    }
                    None => false,
                },
            };
            if submitted {
                app.mode = Mode::Normal;
                app.status = None;
                app.clamp_selection();
            } else {
                app.status = Some("Title must not be empty".to_owned());
            }
        }
        KeyCode::Left => match app.form.field {
            FormField::Title => app.form.title.move_left(),
            FormField::Description => app.form.description.move_left(),
            FormField::Priority => app.form.priority = app.form.priority.cycled().cycled(),
            FormField::Status => app.form.status = app.form.status.toggled(),
        },
        KeyCode::Right | KeyCode::Char(' ')
            if matches!(app.form.field, FormField::Priority | FormField::Status) =>
        {
            match app.form.field {
                FormField::Priority => app.form.priority = app.form.priority.cycled(),
                FormField::Status => app.form.status = cycle_status(app.form.status),
                FormField::Title | FormField::Description => {}
            }
        }
        KeyCode::Right => match app.form.field {
            FormField::Title => app.form.title.move_right(),
            FormField::Description => app.form.description.move_right(),
            FormField::Priority | FormField::Status => {}
        },
        KeyCode::Backspace => match app.form.field {
            FormField::Title => app.form.title.backspace(),
            FormField::Description => app.form.description.backspace(),
            FormField::Priority | FormField::Status => {}
        },
        KeyCode::Char(c) => match app.form.field {
            FormField::Title => app.form.title.insert_char(c),
            FormField::Description => app.form.description.insert_char(c),
            FormField::Priority | FormField::Status => {}
        },
        _ => {}
    }
}

fn cycle_status(status: TaskStatus) -> TaskStatus {
    match status {
        TaskStatus::Pending => TaskStatus::InProgress,
        TaskStatus::InProgress => TaskStatus::Completed,
        TaskStatus::Completed => TaskStatus::Pending,
    }
}

fn handle_key_confirm(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            match app.confirm.take() {
                Some(ConfirmAction::DeleteTask(id)) => {
                    app.store.delete_task(&id);
                    app.status = Some(format!("Deleted task {id}"));
                }
                Some(ConfirmAction::ClearCompleted) => {
                    let removed = app.store.clear_completed();
                    app.status = Some(format!("Cleared {removed} completed task(s)"));
                }
                Some(ConfirmAction::Reset) => {
                    app.store.reset();
                    app.status = Some("Store reset".to_owned());
                }
                None => {}
            }
            app.mode = Mode::Normal;
            app.clamp_selection();
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.confirm = None;
            app.mode = Mode::Normal;
        }
        _ => {}
    }
}

fn draw(f: &mut Frame<'_>, app: &mut AppState) {
    let area = f.area();
    let outer = Block::default().title("taskdeck").borders(Borders::ALL);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(inner);

    draw_stats(f, chunks[0], app);
    draw_filter_tabs(f, chunks[1], app);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[2]);

    draw_task_table(f, main[0], app);
    draw_side_panel(f, main[1], app);
    draw_footer(f, chunks[3], app);

    match app.mode {
        Mode::Form => draw_form_popup(f, app),
        Mode::Confirm => draw_confirm_popup(f, app),
        Mode::Normal if app.show_detail => draw_detail_popup(f, app),
        _ => {}
    }
}

fn draw_stats(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let stats = app.store.stats();
    let line = Line::from(vec![
        Span::styled(
            format!("{} total", stats.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} done ({}%)", stats.completed, stats.completion_percent()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} pending", stats.pending),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} in progress", stats.in_progress),
            Style::default().fg(Color::Cyan),
        ),
    ]);

    let search = app.store.search_query();
    let mut lines = vec![line];
    if !search.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Search: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(search),
        ]));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_filter_tabs(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let titles: Vec<Line<'_>> = StatusFilter::ALL
        .iter()
        .map(|filt| Line::from(filt.label()))
        .collect();
    let selected = StatusFilter::ALL
        .iter()
        .position(|filt| *filt == app.store.filter())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    f.render_widget(tabs, area);
}

fn draw_task_table(f: &mut Frame<'_>, area: Rect, app: &mut AppState) {
    let visible = app.store.filtered_tasks();

    if visible.is_empty() {
        let msg = if app.store.tasks().is_empty() {
            "No tasks yet. Press 'a' to add one or 'r' to fetch samples."
        } else {
            "No tasks match the current filter."
        };
        let p = Paragraph::new(msg)
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .wrap(Wrap { trim: true });
        f.render_widget(p, area);
        return;
    }

    let headers = Row::new(vec!["", "TITLE", "STATUS", "PRIORITY"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let icons = app.icons;
    let rows = visible.iter().map(|t| {
        Row::new(vec![
            Span::raw(status_icon(t.status, icons)),
            Span::raw(t.title.clone()),
            Span::styled(t.status.label(), status_style(t.status)),
            Span::styled(t.priority.label(), priority_style(t.priority)),
        ])
    });

    let widths = [
        Constraint::Length(2),
        Constraint::Percentage(60),
        Constraint::Length(12),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(headers)
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_side_panel(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let stats = app.store.stats();
    let mut lines: Vec<Line<'_>> = Vec::new();

    for p in showcase::sample_projects(stats) {
        lines.push(Line::from(Span::styled(
            p.name,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            p.description,
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(format!(
            "{} {}%",
            progress_bar(p.progress, 10),
            p.progress
        )));
        lines.push(Line::from(""));
    }

    let profile = showcase::sample_profile();
    lines.push(Line::from(Span::styled(
        profile.name,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(profile.email));
    lines.push(Line::from(format!(
        "{} since {}",
        profile.role, profile.join_date
    )));

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Projects"))
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let keys = match app.mode {
        Mode::Normal => {
            "q quit • a add • e edit • Space toggle • d delete • C clear done • / search • Tab filter • r fetch • Enter details"
        }
        Mode::Searching => "Enter apply • Esc cancel",
        Mode::Form => "Tab next field • Enter save • Esc cancel",
        Mode::Confirm => "y confirm • n cancel",
    };

    let mut lines = Vec::new();
    if app.mode == Mode::Searching {
        lines.push(Line::from(vec![
            Span::styled("Search: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(app.search_input.as_str()),
            Span::styled("▏", Style::default().fg(Color::DarkGray)),
        ]));
    } else if app.pending_fetch || app.store.loading() {
        lines.push(Line::from(Span::styled(
            "Fetching tasks…",
            Style::default().fg(Color::Cyan),
        )));
    } else if let Some(err) = app.store.error() {
        lines.push(Line::from(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Green),
        )));
    }
    lines.push(Line::from(Span::styled(
        keys,
        Style::default().fg(Color::DarkGray),
    )));

    let p = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn draw_form_popup(f: &mut Frame<'_>, app: &AppState) {
    let title = if app.form.editing.is_some() {
        "Edit task"
    } else {
        "New task"
    };
    let popup_area = centered_rect(70, 50, f.area());
    f.render_widget(Clear, popup_area);

    let field_line = |label: &str, value: String, active: bool| {
        let style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{label:<13}"), style),
            Span::raw(value),
        ])
    };

    let lines = vec![
        field_line(
            "Title:",
            app.form.title.as_str().to_owned(),
            app.form.field == FormField::Title,
        ),
        field_line(
            "Description:",
            app.form.description.as_str().to_owned(),
            app.form.field == FormField::Description,
        ),
        field_line(
            "Priority:",
            format!("◂ {} ▸", app.form.priority.label()),
            app.form.field == FormField::Priority,
        ),
        field_line(
            "Status:",
            format!("◂ {} ▸", app.form.status.label()),
            app.form.field == FormField::Status,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Enter saves, Esc cancels.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(p, popup_area);
}

fn draw_confirm_popup(f: &mut Frame<'_>, app: &AppState) {
    let message = match &app.confirm {
        Some(ConfirmAction::DeleteTask(id)) => format!("Delete task {id}?"),
        Some(ConfirmAction::ClearCompleted) => "Remove every completed task?".to_owned(),
        Some(ConfirmAction::Reset) => "Discard all tasks and criteria?".to_owned(),
        None => return,
    };

    let popup_area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(message),
        Line::from(""),
        Line::from(Span::styled(
            "y confirms, n cancels.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Confirm"))
        .wrap(Wrap { trim: true });
    f.render_widget(p, popup_area);
}

fn draw_detail_popup(f: &mut Frame<'_>, app: &AppState) {
    let Some(id) = app.selected_task_id() else {
        return;
    };
    let Some(task) = app.store.task(&id) else {
        return;
    };

    let popup_area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(format!("Id: {}", task.id)),
        Line::from(format!("Title: {}", task.title)),
    ];
    if !task.description.is_empty() {
        lines.push(Line::from(format!("Description: {}", task.description)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("Status: "),
        Span::styled(task.status.label(), status_style(task.status)),
    ]));
    lines.push(Line::from(vec![
        Span::raw("Priority: "),
        Span::styled(task.priority.label(), priority_style(task.priority)),
    ]));
    lines.push(Line::from(format!("Created: {}", task.created_at)));
    if let Some(updated) = &task.updated_at {
        lines.push(Line::from(format!("Updated: {updated}")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Press Enter to close."));

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: false });
    f.render_widget(p, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn status_icon(status: TaskStatus, icons: bool) -> &'static str {
    if !icons {
        return " ";
    }
    match status {
        TaskStatus::Pending => "○",
        TaskStatus::InProgress => "◐",
        TaskStatus::Completed => "✓",
    }
}

fn status_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Pending => Style::default().fg(Color::Yellow),
        TaskStatus::InProgress => Style::default().fg(Color::Cyan),
        TaskStatus::Completed => Style::default().fg(Color::Green),
    }
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::Low => Style::default().fg(Color::Green),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::High => Style::default().fg(Color::Red),
    }
}

fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width).div_ceil(100);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for i in 0..width {
        bar.push(if i < filled { '█' } else { '░' });
    }
    bar.push(']');
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_input_edits_at_the_cursor() {
        let mut input = TextInput::new("abc");
        input.move_left();
        input.insert_char('x');
        assert_eq!(input.as_str(), "abxc");

        input.backspace();
        assert_eq!(input.as_str(), "abc");

        input.move_right();
        input.insert_char('d');
        assert_eq!(input.as_str(), "abcd");
    }

    #[test]
    fn form_rejects_blank_titles() {
        let mut form = TaskForm::for_new();
        assert!(form.draft().is_none());

        form.title = TextInput::new("   ");
        assert!(form.draft().is_none());

        form.title = TextInput::new("  Ship it  ");
        let draft = form.draft().expect("draft");
        assert_eq!(draft.title, "Ship it");
    }

    #[test]
    fn form_patch_carries_every_field() {
        let task = Task {
            id: "ab12cd34".to_owned(),
            title: "Old".to_owned(),
            description: "desc".to_owned(),
            status: TaskStatus::InProgress,
            priority: Priority::High,
            created_at: crate::task::model::now_rfc3339(),
            updated_at: None,
        };
        let form = TaskForm::for_edit(&task);
        let patch = form.patch().expect("patch");
        assert_eq!(patch.title.as_deref(), Some("Old"));
        assert_eq!(patch.status, Some(TaskStatus::InProgress));
        assert_eq!(patch.priority, Some(Priority::High));
    }

    #[test]
    fn progress_bar_scales_to_width() {
        assert_eq!(progress_bar(0, 4), "[░░░░]");
        assert_eq!(progress_bar(100, 4), "[████]");
        assert_eq!(progress_bar(50, 4), "[██░░]");
        // Rounds up so nonzero progress is visible.
        assert_eq!(progress_bar(1, 4), "[█░░░]");
    }

    #[test]
    fn status_cycle_visits_all_three_states() {
        let mut s = TaskStatus::Pending;
        s = cycle_status(s);
        assert_eq!(s, TaskStatus::InProgress);
        s = cycle_status(s);
        assert_eq!(s, TaskStatus::Completed);
        s = cycle_status(s);
        assert_eq!(s, TaskStatus::Pending);
    }
}
