pub mod gradient_free;

use crate::common::defs::*;
use rand::prelude::*;

/// With probability `epsilon` a uniformly random valid action, otherwise `greedy`.
pub fn epsilon_greedy<R: Rng + ?Sized>(
    rng: &mut R,
    epsilon: Continous,
    greedy: Action,
    valid: &[Action],
) -> Action {
    if rng.gen::<Continous>() < epsilon {
        valid.choose(rng).copied().unwrap_or(greedy)
    } else {
        greedy
    }
}
