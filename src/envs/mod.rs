pub mod grid_world;
pub mod map;
pub mod sokoban;
