use crate::client::AppSnapshot;
use color_eyre::eyre::Result;
use crossterm::event::{
    self,
    Event,
    KeyCode,
    KeyEvent,
    KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{
    disable_raw_mode,
    enable_raw_mode,
};
use itertools::Itertools;
use ratatui::prelude::*;
use ratatui::widgets::*;
use roulette_session::{
    Bet,
    Chips,
    RoundReport,
    SessionState,
    Settlement,
    bet::{
        Column,
        ColorPick,
        Dozen,
        Half,
        Parity,
    },
    wheel::Color as PocketColor,
};
use std::io::stdout;
use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserEvent {
    Quit,
    Redraw,
    PlaceBet(Bet),
    SetChip(Chips),
    Remove(usize),
    ClearSlip,
    Spin,
    InvalidInput(String),
}

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
    selected: usize,
    spinner_frame: usize,
}

impl UiState {
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    ChipModal(String),
    StraightModal(String),
    QuitModal,
}

/// Terminal events read on a dedicated thread, since `event::read` blocks.
pub struct InputEventReceiver {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl InputEventReceiver {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            loop {
                match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::error!("terminal input failed: {err}");
                        break;
                    }
                }
            }
        });
        Self { rx }
    }

    pub async fn next_raw_event(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    state.selected = state.selected.min(snap.bets.len().saturating_sub(1));
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

/// Maps a terminal event to an action. `slip_len` bounds the row selection.
pub fn interpret_event(state: &mut UiState, ev: Event, slip_len: usize) -> Option<UserEvent> {
    let Event::Key(k) = ev else {
        return match ev {
            Event::Resize(..) => Some(UserEvent::Redraw),
            _ => None,
        };
    };
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(UserEvent::Quit);
    }
    match &mut state.mode {
        Mode::ChipModal(input) => {
            return match edit_input(input, k, |c| c.is_ascii_digit() || c == '.' || c == ',') {
                InputStep::Editing => Some(UserEvent::Redraw),
                InputStep::Cancelled => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                InputStep::Submitted(raw) => {
                    state.mode = Mode::Normal;
                    Some(match raw.parse::<Chips>() {
                        Ok(chip) if !chip.is_zero() => UserEvent::SetChip(chip),
                        Ok(_) => UserEvent::InvalidInput("chip value must be greater than zero".into()),
                        Err(err) => UserEvent::InvalidInput(format!("chip value: {err}")),
                    })
                }
            };
        }
        Mode::StraightModal(input) => {
            return match edit_input(input, k, |c| c.is_ascii_digit()) {
                InputStep::Editing => Some(UserEvent::Redraw),
                InputStep::Cancelled => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                InputStep::Submitted(raw) => {
                    state.mode = Mode::Normal;
                    Some(match Bet::parse("straight", Some(&raw)) {
                        Ok(bet) => UserEvent::PlaceBet(bet),
                        Err(err) => UserEvent::InvalidInput(err.to_string()),
                    })
                }
            };
        }
        Mode::QuitModal => {
            return match k.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::Normal => {}
    }
    let event = match k.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            UserEvent::Redraw
        }
        KeyCode::Char('r') => UserEvent::PlaceBet(Bet::Color(ColorPick::Red)),
        KeyCode::Char('k') => UserEvent::PlaceBet(Bet::Color(ColorPick::Black)),
        KeyCode::Char('e') => UserEvent::PlaceBet(Bet::Parity(Parity::Even)),
        KeyCode::Char('o') => UserEvent::PlaceBet(Bet::Parity(Parity::Odd)),
        KeyCode::Char('l') => UserEvent::PlaceBet(Bet::Half(Half::Low)),
        KeyCode::Char('h') => UserEvent::PlaceBet(Bet::Half(Half::High)),
        KeyCode::Char('1') => UserEvent::PlaceBet(Bet::Dozen(Dozen::First)),
        KeyCode::Char('2') => UserEvent::PlaceBet(Bet::Dozen(Dozen::Second)),
        KeyCode::Char('3') => UserEvent::PlaceBet(Bet::Dozen(Dozen::Third)),
        KeyCode::Char('4') => UserEvent::PlaceBet(Bet::Column(Column::First)),
        KeyCode::Char('5') => UserEvent::PlaceBet(Bet::Column(Column::Second)),
        KeyCode::Char('6') => UserEvent::PlaceBet(Bet::Column(Column::Third)),
        KeyCode::Char('n') => {
            state.mode = Mode::StraightModal(String::new());
            UserEvent::Redraw
        }
        KeyCode::Char('b') => {
            state.mode = Mode::ChipModal(String::new());
            UserEvent::Redraw
        }
        KeyCode::Up => {
            state.selected = state.selected.saturating_sub(1);
            UserEvent::Redraw
        }
        KeyCode::Down => {
            state.selected = (state.selected + 1).min(slip_len.saturating_sub(1));
            UserEvent::Redraw
        }
        KeyCode::Char('d') if slip_len > 0 => UserEvent::Remove(state.selected.min(slip_len - 1)),
        KeyCode::Char('x') => UserEvent::ClearSlip,
        KeyCode::Char(' ') | KeyCode::Enter => UserEvent::Spin,
        _ => return None,
    };
    Some(event)
}

enum InputStep {
    Editing,
    Cancelled,
    Submitted(String),
}

fn edit_input(input: &mut String, k: KeyEvent, accept: impl Fn(char) -> bool) -> InputStep {
    match k.code {
        KeyCode::Esc => InputStep::Cancelled,
        KeyCode::Enter => InputStep::Submitted(std::mem::take(input)),
        KeyCode::Backspace => {
            input.pop();
            InputStep::Editing
        }
        KeyCode::Char(c) if accept(c) && input.len() < 12 => {
            input.push(c);
            InputStep::Editing
        }
        _ => InputStep::Editing,
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // status
            Constraint::Min(10),   // slip + results
            Constraint::Length(7), // errors
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_status(f, state, chunks[0], snap);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_slip(f, state, middle[0], snap);
    draw_results(f, middle[1], snap);
    draw_errors(f, chunks[2], snap);
    draw_help(f, chunks[3]);
    draw_modals(f, state);
}

fn draw_status(f: &mut Frame, state: &UiState, area: Rect, snap: &AppSnapshot) {
    let state_line = match snap.state {
        SessionState::Idle => Line::from(snap.status.clone()),
        SessionState::AwaitingResolution => {
            let spinner = [PocketColor::Red, PocketColor::Black, PocketColor::Green]
                [state.spinner_frame % 3];
            Line::from(vec![
                Span::styled("● ", Style::default().fg(pocket_style(spinner))),
                Span::raw("Spinning... waiting for the resolver"),
            ])
        }
    };
    let lines = vec![
        Line::from(format!(
            "Bankroll: {} | Staked: {} | Chip: {} | Resolver: {}",
            snap.bankroll, snap.staked, snap.chip, snap.resolver
        )),
        state_line,
    ];
    let status = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, area);
}

fn draw_slip(f: &mut Frame, state: &UiState, area: Rect, snap: &AppSnapshot) {
    let header = Row::new(vec!["#", "Kind", "Selector", "Stake"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = snap.bets.iter().enumerate().map(|(i, staged)| {
        let bet = staged.bet();
        let row = Row::new(vec![
            Cell::from((i + 1).to_string()),
            Cell::from(bet.kind().to_string()),
            Cell::from(bet.selector()),
            Cell::from(staged.stake().to_string()),
        ]);
        if i == state.selected {
            row.style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            row
        }
    });
    let widths = [
        Constraint::Length(3),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Min(8),
    ];
    let title = format!("Bet Slip ({} bets, {} staked)", snap.bets.len(), snap.staked);
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, area);
}

fn draw_results(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines = Vec::new();
    match snap.history.first() {
        None => lines.push(Line::styled("No spins yet", Style::default().fg(Color::DarkGray))),
        Some(last) => {
            lines.push(Line::from(Span::styled(
                "Last result",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(round_line(last));
            lines.push(Line::from(format!(
                "  bets: {}",
                last.bets
                    .iter()
                    .map(|staged| format!("{} x{}", staged.bet(), staged.stake()))
                    .join(", ")
            )));
        }
    }
    if snap.history.len() > 1 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "History",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(snap.history.iter().skip(1).map(round_line));
    }
    let results = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Results"));
    f.render_widget(results, area);
}

fn round_line(report: &RoundReport) -> Line<'static> {
    let prefix = format!(
        "#{} {} ",
        report.round,
        report.at.with_timezone(&chrono::Local).format("%H:%M:%S")
    );
    match &report.settlement {
        Settlement::Settled(outcome) => {
            let returned = outcome
                .winnings
                .map(|w| format!(" (returned {w})"))
                .unwrap_or_default();
            Line::from(vec![
                Span::raw(prefix),
                Span::styled(
                    format!("{} {}", outcome.pocket, outcome.color),
                    Style::default().fg(pocket_style(outcome.color)).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "  {} -> {}{}",
                    report.balance_before, report.balance_after, returned
                )),
            ])
        }
        Settlement::Refunded { failure, refunded } => Line::from(vec![
            Span::raw(prefix),
            Span::styled(
                format!("refunded {refunded}: {failure}"),
                Style::default().fg(Color::Magenta),
            ),
        ]),
    }
}

fn draw_errors(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let lines: Vec<Line> = if snap.errors.is_empty() {
        vec![Line::from("No errors")]
    } else {
        snap.errors.iter().map(|e| Line::from(e.clone())).collect()
    };
    let color = if snap.errors.is_empty() { Color::DarkGray } else { Color::Red };
    let errors = Paragraph::new(lines)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title("Errors"));
    f.render_widget(errors, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "r/k red/black | e/o even/odd | l/h 1-18/19-36 | 1-3 dozen | 4-6 column | n number | b chip | ↑/↓ select | d remove | x clear | space spin | q quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    let (title, body) = match &state.mode {
        Mode::ChipModal(input) => (
            "Chip Value",
            format!("Amount: {input}_\nEnter=confirm Esc=cancel"),
        ),
        Mode::StraightModal(input) => (
            "Straight Bet",
            format!("Number (0, 00, 1-36): {input}_\nEnter=place Esc=cancel"),
        ),
        Mode::QuitModal => ("Confirm Quit", "Leave the table? (Y/N)".to_string()),
        Mode::Normal => return,
    };
    let area = centered_rect(40, 20, f.area());
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(Clear, area);
    f.render_widget(block.clone(), area);
    f.render_widget(Paragraph::new(body), block.inner(area));
}

fn pocket_style(color: PocketColor) -> Color {
    match color {
        PocketColor::Red => Color::Red,
        PocketColor::Black => Color::Gray,
        PocketColor::Green => Color::Green,
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    horizontal[1]
}
