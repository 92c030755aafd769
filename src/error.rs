use crate::common::defs::Coord;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MdpError>;

#[derive(Error, Debug)]
pub enum MdpError {
    #[error("Grid must have a positive width and height, got {0}x{1}")]
    EmptyGrid(i32, i32),
    #[error("{what} at {cell} is outside the grid")]
    OutOfBounds { what: &'static str, cell: Coord },
    #[error("{what} at {cell} is placed on an obstacle")]
    OnObstacle { what: &'static str, cell: Coord },
    #[error("Grid world maps need a goal cell")]
    MissingGoal,
    #[error("Sokoban maps need at least one crate")]
    NoCrates,
    #[error("Sokoban maps need at least one target")]
    NoTargets,
    #[error("Two crates placed on {0}")]
    DuplicateCrate(Coord),
    #[error("Player starts on the crate at {0}")]
    PlayerOnCrate(Coord),
    #[error("Map has {crates} crates but {targets} targets")]
    CrateTargetMismatch { crates: usize, targets: usize },
    #[error("State space has {states} states, limit is {limit}")]
    StateSpaceTooLarge { states: String, limit: usize },
    #[error("Transition produced a state outside the state space: {0}")]
    UnknownState(String),
    #[error("Map parse error: {0}")]
    MapParse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
