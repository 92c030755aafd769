use gridmdp::*;
use rand::prelude::*;
use std::path::PathBuf;

pub const SEED: u64 = 2718;

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn map_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "maps", name].iter().collect()
}

#[allow(dead_code)]
pub fn load_engine(name: &str, domain: Domain) -> Engine {
    let map = MapDescriptor::from_file(map_path(name)).unwrap();
    Engine::setup(&map, domain, StdRng::seed_from_u64(SEED), Limits::default()).unwrap()
}

#[allow(dead_code)]
pub fn grid_session(name: &str) -> Session<envs::grid_world::GridWorld> {
    match load_engine(name, Domain::GridWorld) {
        Engine::GridWorld(s) => s,
        Engine::Sokoban(_) => panic!("{name} did not set up as a grid world."),
    }
}

#[allow(dead_code)]
pub fn sokoban_session(name: &str) -> Session<envs::sokoban::Sokoban> {
    match load_engine(name, Domain::Sokoban) {
        Engine::Sokoban(s) => s,
        Engine::GridWorld(_) => panic!("{name} did not set up as Sokoban."),
    }
}
