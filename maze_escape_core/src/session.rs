use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{
    Position,
    maze::{self, Maze, MazeError},
    placement::{self, PlacementError},
    player::Player,
};

/// Represents errors that can occur while setting up a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Dimensions and object counts for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub rows: usize,
    pub cols: usize,
    pub item_count: usize,
    pub trap_count: usize,
}

/// The classic setup: a 640x480 window of 32-pixel tiles (15 rows by
/// 20 columns) holding 5 items and 3 traps.
impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            rows: 15,
            cols: 20,
            item_count: 5,
            trap_count: 3,
        }
    }
}

/// A single directional movement request for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Stay,
    Up,
    Down,
    Left,
    Right,
}

impl Intent {
    /// The (row, col) delta this intent asks for.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Intent::Stay => (0, 0),
            Intent::Up => (-1, 0),
            Intent::Down => (1, 0),
            Intent::Left => (0, -1),
            Intent::Right => (0, 1),
        }
    }
}

/// Where a session stands after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Running,
    Won { score: i64 },
    Aborted,
}

impl SessionState {
    /// `Won` and `Aborted` are terminal; ticks no longer change state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionState::Running)
    }
}

/// One run of the game: the maze, its scattered objects, the player,
/// and the exit, advanced one tick at a time by an external driver.
///
/// The session holds every piece of mutable game state; the driver
/// only feeds it intents and reads its accessors to draw a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    maze: Maze,
    items: HashSet<Position>,
    traps: HashSet<Position>,
    player: Player,
    exit: Position,
    state: SessionState,
}

impl Session {
    /// Generates a maze, scatters objects onto it, and seats the
    /// player at the start cell.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the grid is too small or the object
    /// counts exceed the maze's free path cells.
    pub fn new<R: Rng + ?Sized>(config: SessionConfig, rng: &mut R) -> Result<Self, SetupError> {
        let maze = maze::generate(config.rows, config.cols, rng)?;
        let placement = placement::place(&maze, config.item_count, config.trap_count, rng)?;
        let player = Player::new(maze.start());
        let exit = maze.exit();
        Ok(Session {
            maze,
            items: placement.items,
            traps: placement.traps,
            player,
            exit,
            state: SessionState::Running,
        })
    }

    /// Advances the game by one tick.
    ///
    /// Resolution order is fixed: apply the movement intent, then
    /// collect any item and trigger any trap under the post-move
    /// position (every tick, moved or not), then check the exit. A
    /// terminal session ignores intents and reports its state
    /// unchanged.
    pub fn tick(&mut self, intent: Intent) -> SessionState {
        if self.state.is_terminal() {
            return self.state;
        }

        let (dr, dc) = intent.delta();
        self.player.step(dr, dc, &self.maze);
        self.player.collect_item(&mut self.items);
        self.player.trigger_trap(&mut self.traps);

        if self.player.position() == self.exit {
            self.state = SessionState::Won {
                score: self.player.score(),
            };
        }
        self.state
    }

    /// External quit signal; accepted between any two ticks.
    pub fn abort(&mut self) {
        if self.state == SessionState::Running {
            self.state = SessionState::Aborted;
        }
    }

    #[inline]
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    #[inline]
    pub fn items(&self) -> &HashSet<Position> {
        &self.items
    }

    #[inline]
    pub fn traps(&self) -> &HashSet<Position> {
        &self.traps
    }

    #[inline]
    pub fn player_position(&self) -> Position {
        self.player.position()
    }

    #[inline]
    pub fn score(&self) -> i64 {
        self.player.score()
    }

    #[inline]
    pub fn exit(&self) -> Position {
        self.exit
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashMap;

    /// A 3x5 straight corridor from the start to the exit.
    fn corridor_session(items: &[Position], traps: &[Position]) -> Session {
        let maze = Maze::parse(&[
            "#####", //
            "#...#",
            "#####",
        ]);
        let exit = maze.exit();
        let player = Player::new(maze.start());
        Session {
            maze,
            items: items.iter().copied().collect(),
            traps: traps.iter().copied().collect(),
            player,
            exit,
            state: SessionState::Running,
        }
    }

    /// Shortest start-to-exit route as a sequence of intents.
    fn solve(maze: &Maze) -> Vec<Intent> {
        let mut parents: HashMap<Position, (Position, Intent)> = HashMap::new();
        let mut frontier = vec![maze.start()];
        while let Some(pos) = frontier.pop() {
            for intent in [Intent::Left, Intent::Right, Intent::Up, Intent::Down] {
                let (dr, dc) = intent.delta();
                let Some(next) = pos.offset(dr, dc) else { continue };
                if maze.is_path(next) && next != maze.start() && !parents.contains_key(&next) {
                    parents.insert(next, (pos, intent));
                    frontier.push(next);
                }
            }
        }

        let mut route = Vec::new();
        let mut cursor = maze.exit();
        while cursor != maze.start() {
            let (prev, intent) = parents[&cursor];
            route.push(intent);
            cursor = prev;
        }
        route.reverse();
        route
    }

    #[test]
    fn walking_the_corridor_wins_with_collected_score() {
        let mut session = corridor_session(&[Position::new(1, 2)], &[]);
        assert_eq!(session.tick(Intent::Right), SessionState::Running);
        assert_eq!(session.score(), 10);
        assert!(session.items().is_empty());
        assert_eq!(session.tick(Intent::Right), SessionState::Won { score: 10 });
    }

    #[test]
    fn item_and_trap_on_the_exit_settle_before_the_win_check() {
        let exit = Position::new(1, 3);
        let mut session = corridor_session(&[exit], &[exit]);
        assert_eq!(session.tick(Intent::Right), SessionState::Running);
        assert_eq!(session.tick(Intent::Right), SessionState::Won { score: 5 });
    }

    #[test]
    fn blocked_ticks_still_resolve_objects_under_the_player() {
        let start = Position::new(1, 1);
        let mut session = corridor_session(&[], &[start]);
        // Up is a wall; the player stays on the trap and triggers it.
        assert_eq!(session.tick(Intent::Up), SessionState::Running);
        assert_eq!(session.score(), -5);
        // The trap is consumed, so staying put costs nothing more.
        assert_eq!(session.tick(Intent::Stay), SessionState::Running);
        assert_eq!(session.score(), -5);
    }

    #[test]
    fn terminal_states_ignore_further_ticks() {
        let mut session = corridor_session(&[], &[]);
        session.tick(Intent::Right);
        assert_eq!(session.tick(Intent::Right), SessionState::Won { score: 0 });
        // Won is sticky, even against an abort or more movement.
        session.abort();
        assert_eq!(session.tick(Intent::Left), SessionState::Won { score: 0 });

        let mut aborted = corridor_session(&[], &[]);
        aborted.abort();
        assert_eq!(aborted.state(), SessionState::Aborted);
        assert_eq!(aborted.tick(Intent::Right), SessionState::Aborted);
        assert_eq!(aborted.player_position(), Position::new(1, 1));
    }

    #[test]
    fn generated_session_is_winnable_end_to_end() {
        let config = SessionConfig {
            rows: 5,
            cols: 5,
            item_count: 1,
            trap_count: 0,
        };
        let mut rng = StdRng::seed_from_u64(2024);
        let mut session = Session::new(config, &mut rng).unwrap();
        let route = solve(session.maze());

        let mut collected = 0;
        for (steps, intent) in route.iter().enumerate() {
            assert_eq!(session.state(), SessionState::Running, "ended early at step {steps}");
            session.tick(*intent);
            collected = session.score();
        }
        assert_eq!(session.state(), SessionState::Won { score: collected });
        assert_eq!(session.player_position(), session.exit());
    }

    #[test]
    fn sessions_are_deterministic_for_a_fixed_seed() {
        let config = SessionConfig::default();
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let first = Session::new(config, &mut a).unwrap();
        let second = Session::new(config, &mut b).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn setup_surfaces_configuration_errors() {
        let mut rng = StdRng::seed_from_u64(1);
        let too_small = SessionConfig {
            rows: 2,
            cols: 2,
            item_count: 0,
            trap_count: 0,
        };
        assert!(matches!(
            Session::new(too_small, &mut rng),
            Err(SetupError::Maze(MazeError::TooSmall { .. }))
        ));

        let overfull = SessionConfig {
            rows: 5,
            cols: 5,
            item_count: 1000,
            trap_count: 0,
        };
        assert!(matches!(
            Session::new(overfull, &mut rng),
            Err(SetupError::Placement(PlacementError::NotEnoughPathCells { .. }))
        ));
    }
}
