pub mod common;
pub mod pi;
pub mod vi;

use crate::common::defs::Continous;
use crate::error::Result;
use crate::mdps::mdp::Mdp;
use crate::mdps::tables::{Policy, ValueTable};

/// Convergence threshold on the largest value change in a sweep.
pub const THETA: Continous = 1e-3;

/// Dynamic-programming solvers that sweep the whole state space in place.
pub trait MdpSolver<M: Mdp + ?Sized> {
    type Output;

    /// Runs until the solver's own stopping criterion holds, or for at most `num_iterations`
    /// rounds when a cap is given. Returns the solver output and the number of rounds run.
    fn exec(
        &mut self,
        mdp: &M,
        policy: &mut Policy<M::State>,
        values: &mut ValueTable<M::State>,
        theta: Continous,
        num_iterations: Option<usize>,
    ) -> Result<(Self::Output, usize)>;
}
