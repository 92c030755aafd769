use super::map::{Limits, MapDescriptor};
use crate::common::defs::*;
use crate::common::utils::{binomial, combinations};
use crate::error::{MdpError, Result};
use crate::mdps::mdp::{GridView, Mdp, Tile};
use itertools::Itertools;
use log::info;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Player position plus the crate configuration. Crates are kept in a sorted set, so equality
/// and hashing ignore the order in which crates were placed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SokobanState {
    pub player: Coord,
    pub crates: BTreeSet<Coord>,
}

impl SokobanState {
    pub fn new<I: IntoIterator<Item = Coord>>(player: Coord, crates: I) -> Self {
        Self {
            player,
            crates: crates.into_iter().collect(),
        }
    }
}

impl fmt::Display for SokobanState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "@{} ${}", self.player, self.crates.iter().join(""))
    }
}

#[derive(Debug, Clone)]
pub struct Sokoban {
    name: String,
    width: Discrete,
    height: Discrete,
    obstacles: HashSet<Coord>,
    targets: BTreeSet<Coord>,
    start: SokobanState,
    states: Vec<SokobanState>,
}

impl Sokoban {
    pub fn new(map: &MapDescriptor, limits: Limits) -> Result<Self> {
        map.check_size()?;
        let obstacles = map.obstacle_set();

        if map.crates.is_empty() {
            return Err(MdpError::NoCrates);
        }
        if map.targets.is_empty() {
            return Err(MdpError::NoTargets);
        }

        let mut crates = BTreeSet::new();
        for &c in &map.crates {
            map.check_free("Crate", c, &obstacles)?;
            if !crates.insert(c) {
                return Err(MdpError::DuplicateCrate(c));
            }
        }

        let mut targets = BTreeSet::new();
        for &t in &map.targets {
            map.check_free("Target", t, &obstacles)?;
            targets.insert(t);
        }

        map.check_free("Start", map.start, &obstacles)?;
        if crates.contains(&map.start) {
            return Err(MdpError::PlayerOnCrate(map.start));
        }

        if crates.len() != targets.len() {
            return Err(MdpError::CrateTargetMismatch {
                crates: crates.len(),
                targets: targets.len(),
            });
        }

        let free = map
            .cells()
            .filter(|c| !obstacles.contains(c))
            .collect::<Vec<_>>();
        let k = crates.len();
        let count = state_count(free.len(), k);
        match (count, limits.max_states) {
            (None, Some(limit)) => {
                return Err(MdpError::StateSpaceTooLarge {
                    states: format!("more than {}", usize::MAX),
                    limit,
                })
            }
            (Some(n), Some(limit)) if n > limit => {
                return Err(MdpError::StateSpaceTooLarge {
                    states: n.to_string(),
                    limit,
                })
            }
            _ => {}
        }

        let states = generate_states(&free, k);

        let name = format!("Sokoban-{}x{}-{}crates", map.width, map.height, k);
        info!(
            "{name}: {} states from {} free cells, {} obstacles",
            states.len(),
            free.len(),
            obstacles.len()
        );

        Ok(Self {
            name,
            width: map.width,
            height: map.height,
            obstacles,
            targets,
            start: SokobanState {
                player: map.start,
                crates,
            },
            states,
        })
    }

    pub fn targets(&self) -> &BTreeSet<Coord> {
        &self.targets
    }

    pub fn crates_on_target(&self, s: &SokobanState) -> usize {
        s.crates.iter().filter(|c| self.targets.contains(c)).count()
    }

    fn is_free(&self, c: Coord) -> bool {
        0 <= c.x && c.x < self.width && 0 <= c.y && c.y < self.height && !self.obstacles.contains(&c)
    }

    fn on_target_fraction(&self, s: &SokobanState) -> Continous {
        self.crates_on_target(s) as Continous / s.crates.len() as Continous
    }
}

/// `C(F, k) × (F − k)`, or `None` on overflow.
pub fn state_count(free_cells: usize, k: usize) -> Option<usize> {
    binomial(free_cells, k)?.checked_mul(free_cells.saturating_sub(k))
}

/// Every placement of `k` crates on `free` cells crossed with every remaining player cell.
/// Combinations are the outer loop and player cells the inner loop, both in `free` order.
pub fn generate_states(free: &[Coord], k: usize) -> Vec<SokobanState> {
    let mut states = Vec::with_capacity(state_count(free.len(), k).unwrap_or(0));

    for combo in combinations(free, k) {
        let crates = combo.into_iter().collect::<BTreeSet<_>>();
        for &player in free.iter().filter(|p| !crates.contains(p)) {
            states.push(SokobanState {
                player,
                crates: crates.clone(),
            });
        }
    }

    states
}

impl Mdp for Sokoban {
    type State = SokobanState;

    fn name(&self) -> &str {
        &self.name
    }

    fn states(&self) -> &[SokobanState] {
        &self.states
    }

    fn start(&self) -> &SokobanState {
        &self.start
    }

    fn next_state(&self, s: &SokobanState, a: Action) -> SokobanState {
        let next = s.player.step(a);
        if !self.is_free(next) {
            return s.clone();
        }

        if !s.crates.contains(&next) {
            return SokobanState {
                player: next,
                crates: s.crates.clone(),
            };
        }

        let dest = next.step(a);
        if !self.is_free(dest) || s.crates.contains(&dest) {
            return s.clone();
        }

        let mut crates = s.crates.clone();
        crates.remove(&next);
        crates.insert(dest);
        SokobanState {
            player: next,
            crates,
        }
    }

    fn valid_actions(&self, s: &SokobanState) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|&a| self.next_state(s, a) != *s)
            .collect()
    }

    /// Change in the fraction of crates sitting on targets.
    fn immediate_reward(&self, s: &SokobanState, a: Action) -> Continous {
        let next = self.next_state(s, a);
        self.on_target_fraction(&next) - self.on_target_fraction(s)
    }

    fn is_end(&self, s: &SokobanState) -> bool {
        s.crates.len() == self.targets.len() && s.crates.iter().all(|c| self.targets.contains(c))
    }

    fn initial_value(&self, s: &SokobanState) -> Continous {
        self.on_target_fraction(s)
    }

    fn has_transient_rewards(&self) -> bool {
        true
    }
}

impl GridView for Sokoban {
    fn size(&self) -> (Discrete, Discrete) {
        (self.width, self.height)
    }

    fn tile(&self, current: &SokobanState, cell: Coord) -> Tile {
        if self.obstacles.contains(&cell) {
            Tile::Obstacle
        } else if current.player == cell {
            Tile::Player
        } else if current.crates.contains(&cell) {
            Tile::Crate {
                on_target: self.targets.contains(&cell),
            }
        } else if self.targets.contains(&cell) {
            Tile::Target
        } else {
            Tile::Floor
        }
    }

    fn with_agent_at(&self, current: &SokobanState, cell: Coord) -> SokobanState {
        SokobanState {
            player: cell,
            crates: current.crates.clone(),
        }
    }
}
