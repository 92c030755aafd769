use crate::common::defs::*;
use crate::mdps::mdp::{GridView, Mdp, Tile};
use crate::mdps::tables::{Policy, ValueTable};
use itertools::Itertools;
use log::info;

/// Display adapter, notified after setup and after every solver run.
pub trait Renderer<M: Mdp + ?Sized> {
    fn redraw(
        &mut self,
        mdp: &M,
        policy: &Policy<M::State>,
        values: &ValueTable<M::State>,
        current: &M::State,
    );
}

impl<M, F> Renderer<M> for F
where
    M: Mdp + ?Sized,
    F: FnMut(&M, &Policy<M::State>, &ValueTable<M::State>, &M::State),
{
    fn redraw(
        &mut self,
        mdp: &M,
        policy: &Policy<M::State>,
        values: &ValueTable<M::State>,
        current: &M::State,
    ) {
        self(mdp, policy, values, current)
    }
}

/// Logs the board, policy and value grids. The first frame also carries the cell coordinates.
#[derive(Debug, Default)]
pub struct TextRenderer {
    pub last_frame: Option<String>,
}

impl<M: GridView + ?Sized> Renderer<M> for TextRenderer {
    fn redraw(
        &mut self,
        mdp: &M,
        policy: &Policy<M::State>,
        values: &ValueTable<M::State>,
        current: &M::State,
    ) {
        let mut frame = format!(
            "{}\n\n{}\n\n{}",
            render_board(mdp, current),
            render_policy(mdp, policy, current),
            render_values(mdp, values, current)
        );
        if self.last_frame.is_none() {
            frame = format!("{frame}\n\n{}", render_coordinates(mdp));
        }
        info!("{}\n{frame}", mdp.name());
        self.last_frame = Some(frame);
    }
}

fn rows<M: GridView + ?Sized, F>(mdp: &M, mut cell: F, sep: &str) -> String
where
    F: FnMut(Coord) -> String,
{
    let (w, h) = mdp.size();
    (0..h)
        .rev()
        .map(|y| (0..w).map(|x| cell(Coord::new(x, y))).join(sep))
        .join("\n")
}

fn tile_char(tile: Tile) -> char {
    match tile {
        Tile::Floor => '-',
        Tile::Obstacle => '#',
        Tile::Goal => 'G',
        Tile::Target => '.',
        Tile::Crate { on_target: false } => '$',
        Tile::Crate { on_target: true } => '*',
        Tile::Player => '@',
    }
}

/// The world in state `current`, top row first.
pub fn render_board<M: GridView + ?Sized>(mdp: &M, current: &M::State) -> String {
    rows(mdp, |c| tile_char(mdp.tile(current, c)).to_string(), " ")
}

/// Policy arrow for the agent standing on each cell, everything else as on the board.
pub fn render_policy<M: GridView + ?Sized>(
    mdp: &M,
    policy: &Policy<M::State>,
    current: &M::State,
) -> String {
    rows(
        mdp,
        |c| {
            let ch = match mdp.tile(current, c) {
                t @ (Tile::Obstacle | Tile::Goal | Tile::Crate { .. }) => tile_char(t),
                _ => policy
                    .get(&mdp.with_agent_at(current, c))
                    .map_or('?', Action::arrow),
            };
            ch.to_string()
        },
        " ",
    )
}

/// Values with two decimals, obstacles and crates as on the board.
pub fn render_values<M: GridView + ?Sized>(
    mdp: &M,
    values: &ValueTable<M::State>,
    current: &M::State,
) -> String {
    rows(
        mdp,
        |c| match mdp.tile(current, c) {
            t @ (Tile::Obstacle | Tile::Crate { .. }) => format!("{:>5}", tile_char(t)),
            _ => match values.get(&mdp.with_agent_at(current, c)) {
                Some(v) => format!("{v:>5.2}"),
                None => format!("{:>5}", '?'),
            },
        },
        " ",
    )
}

pub fn render_coordinates<M: GridView + ?Sized>(mdp: &M) -> String {
    rows(mdp, |c| format!("{},{}", c.x, c.y), " ")
}
