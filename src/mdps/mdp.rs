use crate::common::defs::*;
use std::fmt::Debug;
use std::hash::Hash;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// Deterministic and finite: the capability set every domain provides. The domain is chosen
/// once at setup, after which solvers only talk to this trait.
pub trait Mdp {
    type State: Clone + Eq + Hash + Debug;

    fn name(&self) -> &str;

    /// The closed state universe, in the fixed enumeration order used by every sweep.
    fn states(&self) -> &[Self::State];

    fn start(&self) -> &Self::State;

    fn next_state(&self, s: &Self::State, a: Action) -> Self::State;

    fn valid_actions(&self, s: &Self::State) -> Vec<Action>;

    fn immediate_reward(&self, s: &Self::State, a: Action) -> Continous;

    fn is_end(&self, s: &Self::State) -> bool;

    /// Value table entry before any solver has run.
    fn initial_value(&self, s: &Self::State) -> Continous;

    /// Whether moves between non-terminal states can earn reward. Policy improvement then ranks
    /// actions by the full backup instead of the successor value alone.
    fn has_transient_rewards(&self) -> bool {
        false
    }
}

/// What occupies a cell, as seen by a display adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Obstacle,
    Goal,
    Target,
    Crate { on_target: bool },
    Player,
}

/// Grid-shaped domains that a display adapter can draw.
pub trait GridView: Mdp {
    fn size(&self) -> (Discrete, Discrete);

    /// The tile at `cell` when the world is in state `current`.
    fn tile(&self, current: &Self::State, cell: Coord) -> Tile;

    /// `current` with the agent moved onto `cell`, used to look up per-cell policy entries.
    fn with_agent_at(&self, current: &Self::State, cell: Coord) -> Self::State;
}
