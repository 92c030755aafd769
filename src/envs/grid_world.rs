use super::map::{Limits, MapDescriptor};
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::{GridView, Mdp, Tile};
use log::info;
use std::collections::HashSet;

/// Free-movement grid world with a single goal.
///
/// Moves are not clamped: stepping off the grid or into an obstacle leaves the agent where it
/// was, and such moves are not reported as valid.
#[derive(Debug, Clone)]
pub struct GridWorld {
    name: String,
    width: Discrete,
    height: Discrete,
    obstacles: HashSet<Coord>,
    start: Coord,
    goal: Coord,
    states: Vec<Coord>,
}

impl GridWorld {
    pub fn new(map: &MapDescriptor, limits: Limits) -> Result<Self> {
        map.check_size()?;
        let obstacles = map.obstacle_set();
        let goal = map.goal.ok_or(MdpError::MissingGoal)?;
        map.check_free("Goal", goal, &obstacles)?;
        map.check_free("Start", map.start, &obstacles)?;

        let states = generate_states(map, &obstacles);
        if let Some(limit) = limits.max_states {
            if states.len() > limit {
                return Err(MdpError::StateSpaceTooLarge {
                    states: states.len().to_string(),
                    limit,
                });
            }
        }

        let name = format!("GridWorld-{}x{}", map.width, map.height);
        info!(
            "{name}: {} states, {} obstacles, start {}, goal {goal}",
            states.len(),
            obstacles.len(),
            map.start
        );

        Ok(Self {
            name,
            width: map.width,
            height: map.height,
            obstacles,
            start: map.start,
            goal,
            states,
        })
    }

    pub fn goal(&self) -> Coord {
        self.goal
    }

    fn is_free(&self, c: Coord) -> bool {
        0 <= c.x && c.x < self.width && 0 <= c.y && c.y < self.height && !self.obstacles.contains(&c)
    }
}

/// One state per non-obstacle cell.
pub fn generate_states(map: &MapDescriptor, obstacles: &HashSet<Coord>) -> Vec<Coord> {
    map.cells().filter(|c| !obstacles.contains(c)).collect()
}

impl Mdp for GridWorld {
    type State = Coord;

    fn name(&self) -> &str {
        &self.name
    }

    fn states(&self) -> &[Coord] {
        &self.states
    }

    fn start(&self) -> &Coord {
        &self.start
    }

    fn next_state(&self, s: &Coord, a: Action) -> Coord {
        let next = s.step(a);
        if self.is_free(next) {
            next
        } else {
            *s
        }
    }

    fn valid_actions(&self, s: &Coord) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|&a| self.is_free(s.step(a)))
            .collect()
    }

    fn immediate_reward(&self, s: &Coord, a: Action) -> Continous {
        if self.next_state(s, a) == self.goal {
            1.
        } else {
            0.
        }
    }

    fn is_end(&self, s: &Coord) -> bool {
        *s == self.goal
    }

    fn initial_value(&self, s: &Coord) -> Continous {
        if self.is_end(s) {
            1.
        } else {
            0.
        }
    }
}

impl GridView for GridWorld {
    fn size(&self) -> (Discrete, Discrete) {
        (self.width, self.height)
    }

    fn tile(&self, current: &Coord, cell: Coord) -> Tile {
        if self.obstacles.contains(&cell) {
            Tile::Obstacle
        } else if cell == self.goal {
            Tile::Goal
        } else if cell == *current {
            Tile::Player
        } else {
            Tile::Floor
        }
    }

    fn with_agent_at(&self, _current: &Coord, cell: Coord) -> Coord {
        cell
    }
}
