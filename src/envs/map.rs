use crate::common::defs::*;
use crate::error::{MdpError, Result};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    GridWorld,
    Sokoban,
}

/// Caller-imposed bounds on setup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    pub max_states: Option<usize>,
}

/// Static puzzle definition. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDescriptor {
    pub width: Discrete,
    pub height: Discrete,
    #[serde(default)]
    pub obstacles: Vec<Coord>,
    /// Sokoban only.
    #[serde(default)]
    pub targets: Vec<Coord>,
    pub start: Coord,
    /// Sokoban only.
    #[serde(default)]
    pub crates: Vec<Coord>,
    /// Grid world only.
    #[serde(default)]
    pub goal: Option<Coord>,
}

impl MapDescriptor {
    pub fn in_bounds(&self, c: Coord) -> bool {
        0 <= c.x && c.x < self.width && 0 <= c.y && c.y < self.height
    }

    /// Every cell, `x` outer and `y` inner. This is the state enumeration order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        iproduct!(0..self.width, 0..self.height).map(Coord::from)
    }

    pub fn obstacle_set(&self) -> HashSet<Coord> {
        self.obstacles.iter().copied().collect()
    }

    pub(crate) fn check_size(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(MdpError::EmptyGrid(self.width, self.height));
        }

        if let Some(&cell) = self.obstacles.iter().find(|&&c| !self.in_bounds(c)) {
            return Err(MdpError::OutOfBounds {
                what: "Obstacle",
                cell,
            });
        }

        Ok(())
    }

    pub(crate) fn check_free(
        &self,
        what: &'static str,
        cell: Coord,
        obstacles: &HashSet<Coord>,
    ) -> Result<()> {
        if !self.in_bounds(cell) {
            Err(MdpError::OutOfBounds { what, cell })
        } else if obstacles.contains(&cell) {
            Err(MdpError::OnObstacle { what, cell })
        } else {
            Ok(())
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// `.json` files are parsed as JSON, anything else as an ASCII level.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        if path.extension().map_or(false, |e| e == "json") {
            Ok(serde_json::from_reader(reader)?)
        } else {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            Self::parse_ascii(&text)
        }
    }

    /// Classic Sokoban text levels: `#` obstacle, `@` player, `+` player on target, `$` crate,
    /// `*` crate on target, `.` target, `G` goal, space / `-` / `_` floor.
    /// The first line is the top row (`y = height - 1`).
    pub fn parse_ascii(text: &str) -> Result<Self> {
        let lines = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .skip_while(|l| l.trim().is_empty())
            .collect::<Vec<_>>();
        let lines = match lines.iter().rposition(|l| !l.trim().is_empty()) {
            Some(last) => &lines[..=last],
            None => return Err(MdpError::MapParse("map is empty".to_string())),
        };

        let height = lines.len() as Discrete;
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as Discrete;

        let mut map = MapDescriptor {
            width,
            height,
            obstacles: vec![],
            targets: vec![],
            start: Coord::new(0, 0),
            crates: vec![],
            goal: None,
        };
        let mut player = None;

        for (row, line) in lines.iter().enumerate() {
            let y = height - 1 - row as Discrete;
            for (col, ch) in line.chars().enumerate() {
                let c = Coord::new(col as Discrete, y);
                match ch {
                    '#' => map.obstacles.push(c),
                    '.' => map.targets.push(c),
                    '$' => map.crates.push(c),
                    '*' => {
                        map.crates.push(c);
                        map.targets.push(c);
                    }
                    '@' | '+' => {
                        if player.replace(c).is_some() {
                            return Err(MdpError::MapParse(format!(
                                "second player found at {c}"
                            )));
                        }
                        if ch == '+' {
                            map.targets.push(c);
                        }
                    }
                    'G' => {
                        if map.goal.replace(c).is_some() {
                            return Err(MdpError::MapParse(format!("second goal found at {c}")));
                        }
                    }
                    ' ' | '-' | '_' => {}
                    other => {
                        return Err(MdpError::MapParse(format!(
                            "unexpected character '{other}' at {c}"
                        )))
                    }
                }
            }
        }

        map.start = player.ok_or_else(|| MdpError::MapParse("no player found".to_string()))?;
        Ok(map)
    }
}
