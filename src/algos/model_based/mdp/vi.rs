use super::common::{argmax, backup};
use super::MdpSolver;
use crate::common::defs::*;
use crate::error::Result;
use crate::mdps::mdp::Mdp;
use crate::mdps::tables::{Policy, ValueTable};
use log::{debug, info, trace};

/// Value iteration - Sutton & Barto 2018, section 4.4.
///
/// Gauss-Seidel sweeps: a state's new value is visible to the states after it in the same
/// sweep. Without an iteration cap it runs until the largest change in a sweep is at most
/// `theta`, and does not terminate if the values diverge.
#[derive(Debug, Clone)]
pub struct ValueIteration {
    pub gamma: Continous,
}

impl ValueIteration {
    pub fn new(gamma: Continous) -> Self {
        Self { gamma }
    }

    fn sweep<M: Mdp + ?Sized>(
        &self,
        mdp: &M,
        policy: &mut Policy<M::State>,
        values: &mut ValueTable<M::State>,
    ) -> Result<Continous> {
        let mut delta: Continous = 0.;
        for s in mdp.states() {
            if mdp.is_end(s) {
                continue;
            }

            let actions = mdp.valid_actions(s);
            let Some((a, v)) = argmax(&actions, |a| backup(mdp, values, s, a, self.gamma))? else {
                continue;
            };

            let old = values.checked(s)?;
            values.set(s, v);
            policy.update(s, a);
            trace!("{s:?}: {old} -> {v} via {a}");

            delta = delta.max((old - v).abs());
        }

        Ok(delta)
    }
}

impl<M: Mdp + ?Sized> MdpSolver<M> for ValueIteration {
    /// Largest value change in the last sweep.
    type Output = Continous;

    fn exec(
        &mut self,
        mdp: &M,
        policy: &mut Policy<M::State>,
        values: &mut ValueTable<M::State>,
        theta: Continous,
        num_iterations: Option<usize>,
    ) -> Result<(Continous, usize)> {
        let mut sweeps = 0;
        loop {
            let delta = self.sweep(mdp, policy, values)?;
            sweeps += 1;
            debug!("{}: value iteration sweep {sweeps}, delta {delta}", mdp.name());

            if delta <= theta || num_iterations.map_or(false, |n| sweeps >= n) {
                info!(
                    "{}: value iteration stopped after {sweeps} sweeps, delta {delta}",
                    mdp.name()
                );
                return Ok((delta, sweeps));
            }
        }
    }
}
