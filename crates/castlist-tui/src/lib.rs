// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use castlist_app::markup::NO_MATCHES;
use castlist_app::view::sort_label;
use castlist_app::{
    CastEntry, EpisodeKey, LoadFailure, LoadState, SortDirection, SortKey, TableController,
    ViewCommand, ViewEvent, season_selector_value,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const HALF_PAGE_ROWS: usize = 10;
const COLUMN_WIDTHS: [u16; 5] = [22, 20, 10, 10, 38];

/// Supplies the dataset to the draw loop.
///
/// The default `spawn_load` resolves synchronously; real runtimes override it
/// to load on a worker thread and report through the channel.
pub trait AppRuntime {
    fn source_label(&self) -> String;
    fn load_dataset(&mut self) -> std::result::Result<Vec<CastEntry>, LoadFailure>;

    fn spawn_load(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.load_dataset();
        tx.send(InternalEvent::DatasetLoaded(result))
            .map_err(|_| anyhow!("load event channel closed"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    DatasetLoaded(std::result::Result<Vec<CastEntry>, LoadFailure>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Nav,
    Search,
}

impl InputMode {
    const fn label(self) -> &'static str {
        match self {
            Self::Nav => "NAV",
            Self::Search => "SEARCH",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ViewData {
    mode: InputMode,
    selected_row: usize,
    selected_col: usize,
    help_visible: bool,
    source_label: String,
    status_line: Option<String>,
    status_token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableCommand {
    MoveRow(isize),
    MoveColumn(isize),
    JumpFirst,
    JumpLast,
    SortColumn(SortKey),
    SortSelected,
    NextSeason,
    PrevSeason,
    ClearSeason,
    Reset,
    StartSearch,
    ToggleHelp,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableStatus {
    Sorted {
        key: SortKey,
        direction: SortDirection,
    },
    Season(Option<u32>),
    Reset,
}

impl TableStatus {
    fn message(&self) -> String {
        match self {
            Self::Sorted { key, direction } => format!("sort {}", sort_label(*key, *direction)),
            Self::Season(Some(season)) => format!("season {}", season_selector_value(*season)),
            Self::Season(None) => "season: all".to_owned(),
            Self::Reset => "view reset".to_owned(),
        }
    }
}

pub fn run_app<R: AppRuntime>(controller: &mut TableController, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        source_label: runtime.source_label(),
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();
    tracing::info!(source = %view_data.source_label, "tui started");

    let mut result = runtime.spawn_load(internal_tx.clone());
    if result.is_ok() {
        loop {
            process_internal_events(controller, &mut view_data, &internal_tx, &internal_rx);

            if let Err(error) = terminal.draw(|frame| render(frame, controller, &view_data)) {
                result = Err(error).context("draw frame");
                break;
            }

            let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
                Ok(has_event) => has_event,
                Err(error) => {
                    result = Err(error);
                    break;
                }
            };
            if has_event {
                match event::read().context("read event") {
                    Ok(Event::Key(key)) => {
                        if handle_key_event(controller, &mut view_data, &internal_tx, key) {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(error) => {
                        result = Err(error);
                        break;
                    }
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    tracing::info!("tui stopped");
    result
}

fn process_internal_events(
    controller: &mut TableController,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::DatasetLoaded(result) => {
                let failed = result.is_err();
                if !controller.finish_load(result) {
                    continue;
                }
                clamp_selection(controller, view_data);
                let message = if failed {
                    "load failed".to_owned()
                } else {
                    format!("loaded {} rows", controller.entries().len())
                };
                emit_status(view_data, tx, message);
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event(
    controller: &mut TableController,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    match view_data.mode {
        InputMode::Search => {
            handle_search_key(controller, view_data, key);
            false
        }
        InputMode::Nav => {
            let Some(command) = table_command_for_key(key) else {
                return false;
            };
            if command == TableCommand::Quit {
                return true;
            }
            if let Some(status) = apply_table_command(controller, view_data, command) {
                emit_status(view_data, internal_tx, status.message());
            }
            false
        }
    }
}

fn handle_search_key(controller: &mut TableController, view_data: &mut ViewData, key: KeyEvent) {
    let command = match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            view_data.mode = InputMode::Nav;
            return;
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            ViewCommand::SetQuery(String::new())
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            ViewCommand::PushQueryChar(ch)
        }
        KeyCode::Backspace => ViewCommand::PopQueryChar,
        _ => return,
    };

    if !controller.dispatch(command).is_empty() {
        view_data.selected_row = 0;
    }
}

fn table_command_for_key(key: KeyEvent) -> Option<TableCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('d') => Some(TableCommand::MoveRow(HALF_PAGE_ROWS as isize)),
            KeyCode::Char('u') => Some(TableCommand::MoveRow(-(HALF_PAGE_ROWS as isize))),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some(TableCommand::MoveRow(1)),
        KeyCode::Char('k') | KeyCode::Up => Some(TableCommand::MoveRow(-1)),
        KeyCode::PageDown => Some(TableCommand::MoveRow(HALF_PAGE_ROWS as isize)),
        KeyCode::PageUp => Some(TableCommand::MoveRow(-(HALF_PAGE_ROWS as isize))),
        KeyCode::Char('h') | KeyCode::Left => Some(TableCommand::MoveColumn(-1)),
        KeyCode::Char('l') | KeyCode::Right => Some(TableCommand::MoveColumn(1)),
        KeyCode::Char('g') | KeyCode::Home => Some(TableCommand::JumpFirst),
        KeyCode::Char('G') | KeyCode::End => Some(TableCommand::JumpLast),
        KeyCode::Char(digit @ '1'..='5') => {
            let index = digit as usize - '1' as usize;
            Some(TableCommand::SortColumn(SortKey::ALL[index]))
        }
        KeyCode::Char('s') => Some(TableCommand::SortSelected),
        KeyCode::Char(']') => Some(TableCommand::NextSeason),
        KeyCode::Char('[') => Some(TableCommand::PrevSeason),
        KeyCode::Char('0') => Some(TableCommand::ClearSeason),
        KeyCode::Char('r') => Some(TableCommand::Reset),
        KeyCode::Char('/') => Some(TableCommand::StartSearch),
        KeyCode::Char('?') => Some(TableCommand::ToggleHelp),
        KeyCode::Char('q') => Some(TableCommand::Quit),
        _ => None,
    }
}

fn apply_table_command(
    controller: &mut TableController,
    view_data: &mut ViewData,
    command: TableCommand,
) -> Option<TableStatus> {
    let max_season = controller.max_season().unwrap_or(0);
    let view_command = match command {
        TableCommand::MoveRow(delta) => {
            let last = controller.count().saturating_sub(1);
            view_data.selected_row = view_data
                .selected_row
                .saturating_add_signed(delta)
                .min(last);
            return None;
        }
        TableCommand::MoveColumn(delta) => {
            view_data.selected_col = view_data
                .selected_col
                .saturating_add_signed(delta)
                .min(SortKey::ALL.len() - 1);
            return None;
        }
        TableCommand::JumpFirst => {
            view_data.selected_row = 0;
            return None;
        }
        TableCommand::JumpLast => {
            view_data.selected_row = controller.count().saturating_sub(1);
            return None;
        }
        TableCommand::StartSearch => {
            view_data.mode = InputMode::Search;
            return None;
        }
        TableCommand::ToggleHelp => {
            view_data.help_visible = !view_data.help_visible;
            return None;
        }
        TableCommand::Quit => return None,
        TableCommand::SortColumn(key) => {
            view_data.selected_col = key.column_index();
            ViewCommand::SortBy(key)
        }
        TableCommand::SortSelected => ViewCommand::SortBy(SortKey::ALL[view_data.selected_col]),
        TableCommand::NextSeason => ViewCommand::CycleSeason {
            delta: 1,
            max: max_season,
        },
        TableCommand::PrevSeason => ViewCommand::CycleSeason {
            delta: -1,
            max: max_season,
        },
        TableCommand::ClearSeason => ViewCommand::SetSeason(None),
        TableCommand::Reset => ViewCommand::Reset,
    };

    let events = controller.dispatch(view_command);
    clamp_selection(controller, view_data);
    events.into_iter().last().map(|event| match event {
        ViewEvent::SortChanged { key, direction } => TableStatus::Sorted { key, direction },
        ViewEvent::SeasonChanged(season) => TableStatus::Season(season),
        ViewEvent::QueryChanged(_) | ViewEvent::Reset => TableStatus::Reset,
    })
}

fn clamp_selection(controller: &TableController, view_data: &mut ViewData) {
    view_data.selected_row = view_data
        .selected_row
        .min(controller.count().saturating_sub(1));
}

fn render(frame: &mut ratatui::Frame<'_>, controller: &TableController, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let summary = Paragraph::new(summary_text(controller))
        .block(Block::default().title("castlist").borders(Borders::ALL));
    frame.render_widget(summary, layout[0]);

    let search_style = if view_data.mode == InputMode::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search = Paragraph::new(sanitize_cell(&controller.state().query)).block(
        Block::default()
            .title("search")
            .borders(Borders::ALL)
            .border_style(search_style),
    );
    frame.render_widget(search, layout[1]);

    match controller.load_state() {
        LoadState::Failed(failure) => render_load_failure(frame, layout[2], failure),
        LoadState::Pending | LoadState::Loaded => {
            render_table(frame, layout[2], controller, view_data);
        }
    }

    let status_widget = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[3]);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    controller: &TableController,
    view_data: &ViewData,
) {
    let title = match controller.load_state() {
        LoadState::Pending => format!("loading {}", view_data.source_label),
        LoadState::Loaded | LoadState::Failed(_) => view_data.source_label.clone(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let header = Row::new(SortKey::ALL.into_iter().map(|key| {
        Cell::from(header_label(controller, key)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let widths = COLUMN_WIDTHS.map(Constraint::Percentage);

    if controller.count() == 0 {
        let placeholder = Row::new([Cell::from(NO_MATCHES)]);
        let table = Table::new([placeholder], [Constraint::Percentage(100)])
            .header(Row::new([Cell::from("")]))
            .block(block);
        frame.render_widget(table, area);
        return;
    }

    let rows = controller.rows().enumerate().map(|(row_index, entry)| {
        let selected_row = row_index == view_data.selected_row;
        let cells = SortKey::ALL
            .into_iter()
            .map(|key| {
                let mut style = cell_style(entry, key);
                if selected_row && key.column_index() == view_data.selected_col {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                Cell::from(sanitize_cell(entry.field(key))).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(block);
    let mut table_state = TableState::default().with_selected(Some(view_data.selected_row));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn cell_style(entry: &CastEntry, key: SortKey) -> Style {
    let episode = match key {
        SortKey::First => entry.first_episode(),
        SortKey::Last => entry.last_episode(),
        SortKey::Character | SortKey::Actor | SortKey::End => return Style::default(),
    };
    match episode {
        EpisodeKey::Code { .. } => Style::default()
            .fg(Color::Black)
            .bg(Color::LightYellow),
        EpisodeKey::Unparsed => Style::default().fg(Color::DarkGray),
    }
}

fn render_load_failure(frame: &mut ratatui::Frame<'_>, area: Rect, failure: &LoadFailure) {
    let text = format!(
        "Couldn't load the data file.\nMake sure {} exists and is reachable from here.\nDetails: {}",
        sanitize_cell(&failure.source),
        sanitize_cell(&failure.message),
    );
    let warning = Paragraph::new(text)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("load failed").borders(Borders::ALL));
    frame.render_widget(warning, area);
}

fn summary_text(controller: &TableController) -> String {
    let season = controller
        .state()
        .season
        .map_or_else(|| "all".to_owned(), season_selector_value);
    format!(
        "sort {} | season {season} | {} matches",
        controller.sort_label(),
        controller.count()
    )
}

fn header_label(controller: &TableController, key: SortKey) -> String {
    let state = controller.state();
    let mut label = format!("{} {}", key.column_index() + 1, key.label());
    if state.sort_key == key {
        let suffix = match state.sort_direction {
            SortDirection::Asc => " ↑",
            SortDirection::Desc => " ↓",
        };
        label.push_str(suffix);
    }
    label
}

fn status_text(view_data: &ViewData) -> String {
    let hints = match view_data.mode {
        InputMode::Nav => "/ search | 1-5 sort | [ ] season | r reset | ? help | q quit",
        InputMode::Search => "type to filter | enter/esc done | ctrl+u clear",
    };
    match &view_data.status_line {
        Some(status) => format!("{} | {status} | {hints}", view_data.mode.label()),
        None => format!("{} | {hints}", view_data.mode.label()),
    }
}

/// Flattens whitespace controls and drops the rest so dataset text cannot
/// emit terminal escape sequences.
fn sanitize_cell(value: &str) -> String {
    value
        .chars()
        .filter_map(|ch| match ch {
            '\n' | '\r' | '\t' => Some(' '),
            ch if ch.is_control() => None,
            ch => Some(ch),
        })
        .collect()
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q/ctrl+c quit\n\
nav: j/k rows | h/l columns | g/G first/last | ctrl+d/ctrl+u half page\n\
nav: 1-5 sort by column | s sort selected column (again flips)\n\
nav: ] next season | [ previous season | 0 all seasons | r reset\n\
nav: / search | ? help | q quit\n\
search: type to filter | backspace delete | ctrl+u clear | enter/esc nav\n\
help: any key close"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
