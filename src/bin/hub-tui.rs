//! Terminal browser for an ArcGIS Hub.
//!
//! Connect to a portal, pick an initiative, see its events.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

use hub_client::{Event as HubEvent, HubClient, Initiative};

const TICK: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Screen {
    Connect,
    Initiatives,
    Events,
}

/// A blocking fetch queued to run between the next draw and the next poll,
/// so the "Loading..." status is on screen while the request is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Initiatives,
    Events,
}

struct App {
    screen: Screen,
    portal_url: String,
    cursor: usize,
    client: Option<HubClient>,
    initiatives: Vec<Initiative>,
    initiative_table: TableState,
    events: Vec<HubEvent>,
    event_table: TableState,
    pending: Option<Pending>,
    status: Option<String>,
    quit: bool,
}

impl App {
    fn new() -> Self {
        let portal_url = String::from("https://");
        Self {
            screen: Screen::Connect,
            cursor: portal_url.len(),
            portal_url,
            client: None,
            initiatives: Vec::new(),
            initiative_table: TableState::default(),
            events: Vec::new(),
            event_table: TableState::default(),
            pending: None,
            status: None,
            quit: false,
        }
    }

    fn selected_initiative(&self) -> Option<&Initiative> {
        self.initiatives.get(self.initiative_table.selected()?)
    }

    /// Run the queued fetch, if any, and move to the matching screen.
    fn run_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match pending {
            Pending::Initiatives => match self.load_initiatives() {
                Ok(()) => {
                    self.screen = Screen::Initiatives;
                    self.status = None;
                }
                Err(message) => {
                    self.screen = Screen::Connect;
                    self.status = Some(message);
                }
            },
            Pending::Events => match self.load_events() {
                Ok(()) => {
                    self.screen = Screen::Events;
                    self.status = None;
                }
                Err(message) => {
                    self.screen = Screen::Initiatives;
                    self.status = Some(message);
                }
            },
        }
    }

    fn load_initiatives(&mut self) -> Result<(), String> {
        let client = HubClient::new(&self.portal_url).map_err(|e| e.to_string())?;
        let initiatives = client
            .initiatives()
            .fetch()
            .map_err(|e| format!("Could not load initiatives: {e}"))?;
        if initiatives.is_empty() {
            return Err(String::from("This hub has no initiatives"));
        }
        self.client = Some(client);
        self.initiatives = initiatives;
        self.initiative_table.select(Some(0));
        Ok(())
    }

    fn load_events(&mut self) -> Result<(), String> {
        let client = self.client.as_ref().ok_or("Not connected")?;
        let id = self
            .selected_initiative()
            .map(|i| i.id.clone())
            .ok_or("No initiative selected")?;

        let mut events = client
            .events()
            .fetch()
            .map_err(|e| format!("Could not load events: {e}"))?;
        events.retain(|e| e.initiative_id.as_deref() == Some(id.as_str()));

        self.event_table
            .select(if events.is_empty() { None } else { Some(0) });
        self.events = events;
        Ok(())
    }
}

/// Move a table selection by `delta`, clamped to `len`.
fn step(table: &mut TableState, len: usize, delta: i64) {
    if len == 0 {
        return;
    }
    let current = table.selected().unwrap_or(0) as i64;
    let next = (current + delta).clamp(0, len as i64 - 1);
    table.select(Some(next as usize));
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Connect => draw_connect(f, app),
        Screen::Initiatives => draw_initiatives(f, app),
        Screen::Events => draw_events(f, app),
    }
}

fn split_screen(f: &Frame, middle: Constraint) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            middle,
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area())
}

fn draw_connect(f: &mut Frame, app: &App) {
    let areas = split_screen(f, Constraint::Length(3));

    f.render_widget(header("ArcGIS Hub"), areas[0]);

    let input = Paragraph::new(app.portal_url.as_str())
        .block(Block::default().borders(Borders::ALL).title(" Portal URL "));
    f.render_widget(input, areas[1]);
    f.set_cursor_position((areas[1].x + 1 + app.cursor as u16, areas[1].y + 1));

    f.render_widget(hint("Enter connect | Esc quit"), areas[2]);
    f.render_widget(status_line(app), areas[3]);
}

fn draw_initiatives(f: &mut Frame, app: &mut App) {
    let areas = split_screen(f, Constraint::Min(5));

    let title = format!("Initiatives ({})", app.initiatives.len());
    f.render_widget(header(&title), areas[0]);

    let rows: Vec<Row> = app
        .initiatives
        .iter()
        .map(|i| {
            Row::new(vec![
                i.title.clone(),
                i.owner.clone(),
                i.created.clone(),
                i.tags.join(", "),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(15),
            Constraint::Length(23),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["Title", "Owner", "Created", "Tags"]).style(bold()))
    .row_highlight_style(bold().bg(Color::Blue).fg(Color::White))
    .block(Block::default().borders(Borders::ALL));
    f.render_stateful_widget(table, areas[1], &mut app.initiative_table);

    // Description preview for the highlighted row.
    let preview = app
        .selected_initiative()
        .and_then(|i| i.description.clone())
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(preview).block(Block::default().borders(Borders::ALL)),
        areas[2],
    );

    f.render_widget(status_line(app), areas[3]);
}

fn draw_events(f: &mut Frame, app: &mut App) {
    let areas = split_screen(f, Constraint::Min(5));

    let name = app
        .selected_initiative()
        .map(|i| i.title.as_str())
        .unwrap_or("?");
    f.render_widget(
        header(&format!("{name} - events ({})", app.events.len())),
        areas[0],
    );

    let rows: Vec<Row> = app
        .events
        .iter()
        .map(|e| {
            let status = if e.is_cancelled {
                "cancelled"
            } else {
                e.status.as_deref().unwrap_or("")
            };
            Row::new(vec![
                e.title.clone(),
                e.location.clone().unwrap_or_default(),
                e.start_date.clone(),
                status.to_string(),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Length(23),
            Constraint::Min(9),
        ],
    )
    .header(Row::new(vec!["Title", "Location", "Start", "Status"]).style(bold()))
    .row_highlight_style(bold().bg(Color::Blue).fg(Color::White))
    .block(Block::default().borders(Borders::ALL));
    f.render_stateful_widget(table, areas[1], &mut app.event_table);

    f.render_widget(hint("Esc back | q quit"), areas[2]);
    f.render_widget(status_line(app), areas[3]);
}

fn header(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(bold().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}

fn hint(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
}

fn status_line(app: &App) -> Paragraph<'static> {
    let line = if app.pending.is_some() {
        Line::styled("Loading...", Style::default().fg(Color::Yellow))
    } else if let Some(message) = &app.status {
        Line::styled(message.clone(), Style::default().fg(Color::Red))
    } else if app.client.is_some() {
        Line::styled(
            format!("Connected to {}", app.portal_url),
            Style::default().fg(Color::Green),
        )
    } else {
        Line::raw("")
    };
    Paragraph::new(line)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

fn on_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }
    match app.screen {
        Screen::Connect => on_key_connect(app, key.code),
        Screen::Initiatives => on_key_initiatives(app, key.code),
        Screen::Events => on_key_events(app, key.code),
    }
}

fn on_key_connect(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char(c) => {
            app.portal_url.insert(app.cursor, c);
            app.cursor += c.len_utf8();
            app.status = None;
        }
        KeyCode::Backspace => {
            if let Some(prev) = app.portal_url[..app.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
            {
                app.portal_url.remove(prev);
                app.cursor = prev;
                app.status = None;
            }
        }
        KeyCode::Left => {
            app.cursor = app.portal_url[..app.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
        KeyCode::Right => {
            app.cursor = app.portal_url[app.cursor..]
                .chars()
                .next()
                .map(|c| app.cursor + c.len_utf8())
                .unwrap_or(app.portal_url.len());
        }
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.cursor = app.portal_url.len(),
        KeyCode::Enter => app.pending = Some(Pending::Initiatives),
        KeyCode::Esc => app.quit = true,
        _ => {}
    }
}

fn on_key_initiatives(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => step(&mut app.initiative_table, app.initiatives.len(), -1),
        KeyCode::Down | KeyCode::Char('j') => step(&mut app.initiative_table, app.initiatives.len(), 1),
        KeyCode::Enter => app.pending = Some(Pending::Events),
        KeyCode::Char('r') => app.pending = Some(Pending::Initiatives),
        KeyCode::Esc => app.screen = Screen::Connect,
        KeyCode::Char('q') => app.quit = true,
        _ => {}
    }
}

fn on_key_events(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up | KeyCode::Char('k') => step(&mut app.event_table, app.events.len(), -1),
        KeyCode::Down | KeyCode::Char('j') => step(&mut app.event_table, app.events.len(), 1),
        KeyCode::Esc => {
            app.screen = Screen::Initiatives;
            app.status = None;
        }
        KeyCode::Char('q') => app.quit = true,
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn main() -> io::Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new();

    while !app.quit {
        terminal.draw(|f| draw(f, &mut app))?;

        // Fetches block, so the frame above already shows "Loading...".
        app.run_pending();

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                on_key(&mut app, key);
            }
        }
    }

    restore_terminal(&mut terminal)
}
