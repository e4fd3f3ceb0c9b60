// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use rectify_app::{
    Endpoint, FieldKind, FieldSpec, FormSide, FormState, LookupOutcome, SaveStart, Session,
    StatusTone, TOWER, WING, submit_in_order,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const DISABLED_MARK: &str = "(disabled)";
const HELP_LINE: &str = "tab/shift-tab move · enter search (in booking id) · ←/→ choose · ctrl-y copy field · ctrl-a copy all · ctrl-s save · esc quit";

#[derive(Debug)]
pub enum InternalEvent {
    SearchFinished {
        booking_id: String,
        outcome: Result<LookupOutcome>,
    },
    SaveFinished(Result<()>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    BookingId,
    Field { side: FormSide, index: usize },
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::BookingId => Self::Field {
                side: FormSide::Primary,
                index: 0,
            },
            Self::Field { side, index } if index + 1 < side.fields().len() => Self::Field {
                side,
                index: index + 1,
            },
            Self::Field {
                side: FormSide::Primary,
                ..
            } => Self::Field {
                side: FormSide::Secondary,
                index: 0,
            },
            Self::Field {
                side: FormSide::Secondary,
                ..
            } => Self::BookingId,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::BookingId => Self::Field {
                side: FormSide::Secondary,
                index: FormSide::Secondary.fields().len() - 1,
            },
            Self::Field { side, index } if index > 0 => Self::Field {
                side,
                index: index - 1,
            },
            Self::Field {
                side: FormSide::Secondary,
                ..
            } => Self::Field {
                side: FormSide::Primary,
                index: FormSide::Primary.fields().len() - 1,
            },
            Self::Field {
                side: FormSide::Primary,
                ..
            } => Self::BookingId,
        }
    }

    fn field(self) -> Option<(FormSide, &'static FieldSpec)> {
        match self {
            Self::BookingId => None,
            Self::Field { side, index } => side.fields().get(index).map(|spec| (side, spec)),
        }
    }

    fn for_field(side: FormSide, name: &str) -> Option<Self> {
        side.fields()
            .iter()
            .position(|spec| spec.name == name)
            .map(|index| Self::Field { side, index })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewData {
    focus: Focus,
    notice: Option<String>,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            focus: Focus::BookingId,
            notice: None,
        }
    }
}

pub fn run_app<E>(session: &mut Session, endpoint: E) -> Result<()>
where
    E: Endpoint + Clone + Send + 'static,
{
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(session, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, session, &view_data)) {
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
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(session, &endpoint, &mut view_data, &internal_tx, key) {
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

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    session: &mut Session,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        apply_internal_event(session, view_data, event);
    }
}

fn apply_internal_event(session: &mut Session, view_data: &mut ViewData, event: InternalEvent) {
    match event {
        InternalEvent::SearchFinished {
            booking_id,
            outcome,
        } => {
            session.finish_search(&booking_id, outcome);
            view_data.notice = None;
        }
        InternalEvent::SaveFinished(result) => {
            session.finish_save(result);
            view_data.notice = None;
        }
    }
}

fn spawn_search<E>(endpoint: &E, booking_id: String, tx: &Sender<InternalEvent>)
where
    E: Endpoint + Clone + Send + 'static,
{
    let mut endpoint = endpoint.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        let outcome = endpoint.lookup_booking(&booking_id);
        if tx
            .send(InternalEvent::SearchFinished {
                booking_id,
                outcome,
            })
            .is_err()
        {
            debug!("search finished after the UI closed");
        }
    });
}

fn spawn_save<E>(endpoint: &E, plan: rectify_app::SavePlan, tx: &Sender<InternalEvent>)
where
    E: Endpoint + Clone + Send + 'static,
{
    let mut endpoint = endpoint.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        let result = submit_in_order(&mut endpoint, &plan);
        if tx.send(InternalEvent::SaveFinished(result)).is_err() {
            warn!("save finished after the UI closed");
        }
    });
}

fn handle_key_event<E>(
    session: &mut Session,
    endpoint: &E,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool
where
    E: Endpoint + Clone + Send + 'static,
{
    if session.alert().is_some() {
        session.take_alert();
        return false;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('q') if ctrl => return true,
        KeyCode::Char('f') if ctrl => start_search(session, endpoint, view_data, internal_tx),
        KeyCode::Char('s') if ctrl => start_save(session, endpoint, view_data, internal_tx),
        KeyCode::Char('y') if ctrl => copy_focused(session, view_data),
        KeyCode::Char('a') if ctrl => {
            let copied = session.copy_all();
            view_data.notice = Some(format!("copied {copied} fields"));
        }
        KeyCode::Tab => view_data.focus = view_data.focus.next(),
        KeyCode::BackTab => view_data.focus = view_data.focus.prev(),
        KeyCode::Enter => {
            if view_data.focus == Focus::BookingId {
                start_search(session, endpoint, view_data, internal_tx);
            }
        }
        KeyCode::Left => cycle_choice(session, view_data.focus, -1),
        KeyCode::Right => cycle_choice(session, view_data.focus, 1),
        KeyCode::Backspace => edit_focused(session, view_data.focus, |value| {
            value.pop();
        }),
        KeyCode::Char(ch) if !ctrl => edit_focused(session, view_data.focus, |value| {
            value.push(ch);
        }),
        _ => {}
    }
    false
}

fn start_search<E>(
    session: &mut Session,
    endpoint: &E,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) where
    E: Endpoint + Clone + Send + 'static,
{
    if let Some(booking_id) = session.begin_search() {
        view_data.notice = None;
        spawn_search(endpoint, booking_id, internal_tx);
    }
}

fn start_save<E>(
    session: &mut Session,
    endpoint: &E,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) where
    E: Endpoint + Clone + Send + 'static,
{
    match session.begin_save() {
        SaveStart::Blocked => {}
        SaveStart::Invalid(reported) => {
            if let Some(focus) = Focus::for_field(reported.side, reported.violation.field) {
                view_data.focus = focus;
            }
        }
        SaveStart::Ready(plan) => {
            view_data.notice = None;
            spawn_save(endpoint, plan, internal_tx);
        }
    }
}

fn copy_focused(session: &mut Session, view_data: &mut ViewData) {
    let Some((FormSide::Secondary, spec)) = view_data.focus.field() else {
        view_data.notice = Some("focus a client field to copy it".to_owned());
        return;
    };
    view_data.notice = if session.copy_field(spec.name) {
        Some(format!("copied {}", spec.label))
    } else {
        Some(format!("{} has no Salesforce counterpart", spec.label))
    };
}

fn edit_focused(session: &mut Session, focus: Focus, edit: impl FnOnce(&mut String)) {
    match focus.field() {
        None => {
            let mut value = session.booking_id().to_owned();
            edit(&mut value);
            session.set_booking_id(&value);
        }
        Some((side, spec)) if is_free_text(spec.kind) => {
            let mut value = session
                .form(side)
                .value(spec.name)
                .unwrap_or_default()
                .to_owned();
            edit(&mut value);
            session.set_field(side, spec.name, &value);
        }
        Some(_) => {}
    }
}

fn cycle_choice(session: &mut Session, focus: Focus, delta: isize) {
    let Some((side, spec)) = focus.field() else {
        return;
    };
    let choices = match spec.kind {
        FieldKind::Tower => tower_choices(session),
        FieldKind::Wing => {
            let selector = session.form(side).wing_selector();
            if !selector.is_enabled() {
                return;
            }
            selector
                .options()
                .iter()
                .map(|option| option.value.clone())
                .collect()
        }
        _ => return,
    };
    let current = session.form(side).value(spec.name).unwrap_or_default();
    let position = choices
        .iter()
        .position(|choice| choice == current)
        .unwrap_or(0) as isize;
    let len = choices.len() as isize;
    let next = (position + delta).rem_euclid(len) as usize;
    let value = choices[next].clone();
    session.set_field(side, spec.name, &value);
}

fn tower_choices(session: &Session) -> Vec<String> {
    std::iter::once(String::new())
        .chain(session.table().towers().map(str::to_owned))
        .collect()
}

const fn is_free_text(kind: FieldKind) -> bool {
    !matches!(kind, FieldKind::Tower | FieldKind::Wing)
}

fn field_display(form: &FormState, spec: &FieldSpec) -> String {
    let value = form.value(spec.name).unwrap_or_default();
    match spec.name {
        TOWER if value.is_empty() => "‹Select›".to_owned(),
        TOWER => format!("‹{value}›"),
        WING => {
            let selector = form.wing_selector();
            if !selector.is_enabled() {
                return DISABLED_MARK.to_owned();
            }
            let current = if value.is_empty() { "Select" } else { value };
            format!("‹{current}› of {}", selector.wing_values().join(" | "))
        }
        _ => value.to_owned(),
    }
}

fn header_line(session: &Session) -> String {
    let search = if session.search_enabled() {
        "[ctrl-f Search]"
    } else {
        "[Search …]"
    };
    let save = if session.save_enabled() {
        format!("[ctrl-s {}]", session.save_label())
    } else {
        format!("[{}]", session.save_label())
    };
    format!(
        "Booking ID: {}  {search}  {save}  {}",
        session.booking_id(),
        session.status().text()
    )
}

fn footer_text(session: &Session, view_data: &ViewData) -> String {
    if let Some(reported) = session.reported_violation() {
        return format!("{} form: {}", reported.side.title(), reported.violation);
    }
    if let Some(notice) = &view_data.notice {
        return notice.clone();
    }
    HELP_LINE.to_owned()
}

const fn tone_color(tone: StatusTone) -> Color {
    match tone {
        StatusTone::Neutral => Color::Gray,
        StatusTone::Success => Color::Green,
        StatusTone::Danger => Color::Red,
    }
}

fn render(frame: &mut ratatui::Frame<'_>, session: &Session, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header_style = if view_data.focus == Focus::BookingId {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(header_line(session), header_style),
    ]))
    .style(Style::default().fg(tone_color(session.status().tone())))
    .block(Block::default().title("rectify").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);
    for (side, area) in FormSide::ALL.into_iter().zip(columns.iter()) {
        render_form(frame, *area, session.form(side), view_data.focus);
    }

    let footer_style = if session.reported_violation().is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let footer = Paragraph::new(footer_text(session, view_data))
        .style(footer_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, layout[2]);

    if let Some(alert) = session.alert() {
        let area = centered_rect(50, 5, frame.area());
        frame.render_widget(Clear, area);
        let popup = Paragraph::new(alert.message())
            .wrap(Wrap { trim: true })
            .block(Block::default().title("alert").borders(Borders::ALL));
        frame.render_widget(popup, area);
    }
}

fn render_form(frame: &mut ratatui::Frame<'_>, area: Rect, form: &FormState, focus: Focus) {
    let side = form.side();
    let lines = form
        .specs()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let focused = focus == Focus::Field { side, index };
            let marker = if spec.required { "*" } else { " " };
            let label_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{marker}{:<15}", spec.label), label_style),
                Span::raw(field_display(form, spec)),
            ])
        })
        .collect::<Vec<Line>>();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(side.title())
            .borders(Borders::ALL),
    );
    frame.render_widget(widget, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width.saturating_mul(percent_x) / 100;
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height.min(area.height))
}
