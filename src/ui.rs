//! Terminal front end: layout, key handling and the draw loop.
//!
//! The loop runs on a blocking thread. It only ever reads the shared
//! dashboard; anything that changes state goes back to the async side as a
//! [`UiCommand`].
//!
//! Keys:
//! - `t`: trigger a trade cycle
//! - `r`: refresh now
//! - `q`/`Esc`/`Ctrl-C`: quit

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::dashboard::{lock, Dashboard, SharedDashboard};
use crate::logging::{log, obj, set_console, v_str, Domain, Level};
use crate::trigger::{TriggerHandler, TriggerOutcome};
use crate::widgets::{LeaderboardTable, PortfolioChart, StatusBar, TradeFeedList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Trigger,
    Refresh,
    Quit,
}

/// Map a key press to a command.
pub fn command_for_key(code: KeyCode, modifiers: KeyModifiers) -> Option<UiCommand> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(UiCommand::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(UiCommand::Trigger),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UiCommand::Refresh),
        _ => None,
    }
}

/// Serve commands from the terminal until it quits or hangs up. Triggers
/// and refreshes run in their own tasks so the screen never waits on them.
pub async fn serve_commands(mut commands: UnboundedReceiver<UiCommand>, trigger: TriggerHandler) {
    while let Some(command) = commands.recv().await {
        match command {
            UiCommand::Quit => break,
            UiCommand::Refresh => {
                let refresher = trigger.refresher().clone();
                tokio::spawn(async move {
                    refresher.refresh_once().await;
                });
            }
            UiCommand::Trigger => {
                let trigger = trigger.clone();
                tokio::spawn(async move {
                    if trigger.on_trigger().await == TriggerOutcome::Busy {
                        log(
                            Level::Debug,
                            Domain::Trigger,
                            "trigger_ignored",
                            obj(&[("reason", v_str("in_flight"))]),
                        );
                    }
                });
            }
        }
    }
}

/// Rows plus borders and header, saturating at `u16::MAX`.
fn leaderboard_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(3)
}

/// Lay the whole dashboard out on one frame.
pub fn draw(frame: &mut Frame, board: &Dashboard, backend_label: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(leaderboard_height(board.leaderboard.rows().len())),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Line::from(vec![
        Span::styled(
            " AI Trading Leaderboard ",
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", backend_label), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    frame.render_widget(LeaderboardTable::new(board.leaderboard.rows()), rows[1]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[2]);
    frame.render_widget(PortfolioChart::new(&board.chart), middle[0]);
    frame.render_widget(TradeFeedList::new(board.trade_feed.lines()), middle[1]);

    frame.render_widget(
        StatusBar::new(&board.control, board.notice.as_ref(), &board.health),
        rows[3],
    );
}

/// Owns the terminal for the lifetime of the dashboard screen.
pub struct TerminalUi {
    board: SharedDashboard,
    commands: UnboundedSender<UiCommand>,
    frame_interval: Duration,
    backend_label: String,
}

impl TerminalUi {
    pub fn new(board: SharedDashboard, commands: UnboundedSender<UiCommand>) -> Self {
        Self {
            board,
            commands,
            frame_interval: Duration::from_millis(250),
            backend_label: String::new(),
        }
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn backend_label(mut self, label: impl Into<String>) -> Self {
        self.backend_label = label.into();
        self
    }

    /// Blocks until the user quits. Structured logs stop echoing to stderr
    /// while the alternate screen is up.
    pub fn run(self) -> io::Result<()> {
        set_console(false);
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        set_console(true);

        // Always release the async side, even on a draw error.
        let _ = self.commands.send(UiCommand::Quit);
        result
    }

    fn run_loop(&self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
        let mut last_frame = Instant::now();
        loop {
            terminal.draw(|f| draw(f, &lock(&self.board), &self.backend_label))?;

            let timeout = self
                .frame_interval
                .checked_sub(last_frame.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(command) = command_for_key(key.code, key.modifiers) {
                            log(
                                Level::Debug,
                                Domain::Render,
                                "ui_command",
                                obj(&[("command", v_str(&format!("{:?}", command)))]),
                            );
                            if self.commands.send(command).is_err() || command == UiCommand::Quit {
                                return Ok(());
                            }
                        }
                    }
                }
            }

            if last_frame.elapsed() >= self.frame_interval {
                last_frame = Instant::now();
            }
        }
    }
}
