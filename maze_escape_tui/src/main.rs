use anyhow::Result;
use clap::Parser;
use maze_escape_core::{
    Position,
    maze::{Cell, Maze},
    session::{Intent, Session, SessionConfig, SessionState},
};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Grid rows (even values are rounded down to odd)
    #[arg(long, default_value_t = 15)]
    rows: usize,

    /// Grid columns (even values are rounded down to odd)
    #[arg(long, default_value_t = 20)]
    cols: usize,

    /// Number of items to scatter
    #[arg(long, default_value_t = 5)]
    items: usize,

    /// Number of traps to scatter
    #[arg(long, default_value_t = 3)]
    traps: usize,

    /// Seed for the maze and object layout; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Milliseconds between game ticks
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
}

struct App {
    /// The core game session.
    session: Session,
    /// Direction gathered from key events since the last tick.
    pending: Intent,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let config = SessionConfig {
            rows: args.rows,
            cols: args.cols,
            item_count: args.items,
            trap_count: args.traps,
        };
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let session = Session::new(config, &mut rng)?;
        Ok(App {
            session,
            pending: Intent::Stay,
            should_quit: false,
        })
    }

    /// Handles one game tick, consuming whatever intent the input
    /// gathered. The latest arrow key within a tick window wins, so at
    /// most one direction is applied per tick.
    fn tick(&mut self) {
        let intent = std::mem::replace(&mut self.pending, Intent::Stay);
        let _ = self.session.tick(intent);
    }

    /// Records a key event; unrelated keys are ignored.
    fn on_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Left => self.pending = Intent::Left,
            KeyCode::Right => self.pending = Intent::Right,
            KeyCode::Up => self.pending = Intent::Up,
            KeyCode::Down => self.pending = Intent::Down,
            _ => {}
        }
    }

    /// Sets the quit flag and tells the core the run was aborted.
    fn quit(&mut self) {
        self.session.abort();
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build the game before touching the terminal so configuration
    // errors print normally.
    let mut app = App::new(&args)?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, Duration::from_millis(args.tick_ms));
    restore_terminal(&mut terminal)?;
    result?;

    if let SessionState::Won { score } = app.session.state() {
        println!("You escaped the maze! Final Score: {score}");
    }

    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop: draw, gather input until the tick deadline,
/// advance the session by one tick.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.on_key(key.code);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Area for the maze
            Constraint::Length(3), // Area for score and status
        ])
        .split(frame.area());

    render_maze(frame, main_layout[0], &app.session);
    render_status(frame, main_layout[1], &app.session);
}

/// Renders the maze, objects, exit, and player onto the frame.
fn render_maze(frame: &mut Frame, area: Rect, session: &Session) {
    let maze: &Maze = session.maze();
    let player = session.player_position();
    let exit = session.exit();

    let mut lines: Vec<Line> = Vec::with_capacity(maze.rows());

    for row in 0..maze.rows() {
        let mut spans: Vec<Span> = Vec::with_capacity(maze.cols());
        for col in 0..maze.cols() {
            let pos = Position::new(row, col);
            // Draw order from the original game: the player covers
            // everything, objects cover the exit and floor.
            let span = if pos == player {
                Span::styled("@", Style::default().fg(Color::Blue).bold())
            } else if session.items().contains(&pos) {
                Span::styled("o", Style::default().fg(Color::Green))
            } else if session.traps().contains(&pos) {
                Span::styled("x", Style::default().fg(Color::Red))
            } else if pos == exit {
                Span::styled("E", Style::default().fg(Color::White).bold())
            } else {
                match maze[pos] {
                    Cell::Wall => Span::styled("#", Style::default().fg(Color::DarkGray)),
                    Cell::Path => Span::raw(" "),
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let maze_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Escape the Maze").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(maze_paragraph, area);
}

/// Renders the score line and either the controls help or the win
/// banner.
fn render_status(frame: &mut Frame, area: Rect, session: &Session) {
    let status = match session.state() {
        SessionState::Won { score } => Line::from(Span::styled(
            format!("You escaped the maze! Final Score: {score}"),
            Style::default().fg(Color::Green).bold(),
        )),
        _ => Line::from(format!(
            "Score: {}  Items left: {}  Arrow keys to move, 'q' or 'Esc' to quit.",
            session.score(),
            session.items().len()
        )),
    };

    let status_widget = Paragraph::new(status)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, area);
}
