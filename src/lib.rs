extern crate itertools;
extern crate log;
extern crate rand;
extern crate serde;
extern crate serde_json;
extern crate thiserror;

pub mod algos;
pub mod common;
pub mod envs;
pub mod error;
pub mod mdps;
pub mod session;
pub mod ui;

pub use common::defs::*;
pub use envs::map::{Domain, Limits, MapDescriptor};
pub use error::{MdpError, Result};
pub use mdps::mdp::{GridView, Mdp, Tile};
pub use mdps::mdp_simulator::MdpSimulator;
pub use mdps::tables::{Policy, ValueTable};
pub use session::{Engine, Session};
