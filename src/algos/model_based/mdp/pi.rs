use super::common::{argmax, backup};
use super::MdpSolver;
use crate::common::defs::*;
use crate::error::Result;
use crate::mdps::mdp::Mdp;
use crate::mdps::tables::{Policy, ValueTable};
use log::{debug, info};

/// Iterative policy evaluation - Sutton & Barto 2018, section 4.1.
///
/// Same in-place sweep as value iteration, but each state is backed up through the action the
/// policy currently picks instead of the best one.
#[derive(Debug, Clone)]
pub struct PolicyEvaluation {
    pub gamma: Continous,
}

impl PolicyEvaluation {
    pub fn new(gamma: Continous) -> Self {
        Self { gamma }
    }

    fn sweep<M: Mdp + ?Sized>(
        &self,
        mdp: &M,
        policy: &Policy<M::State>,
        values: &mut ValueTable<M::State>,
    ) -> Result<Continous> {
        let mut delta: Continous = 0.;
        for s in mdp.states() {
            if mdp.is_end(s) {
                continue;
            }

            let old = values.checked(s)?;
            let v = backup(mdp, values, s, policy.action(s), self.gamma)?;
            values.set(s, v);

            delta = delta.max((old - v).abs());
        }

        Ok(delta)
    }
}

impl<M: Mdp + ?Sized> MdpSolver<M> for PolicyEvaluation {
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
            debug!("{}: policy evaluation sweep {sweeps}, delta {delta}", mdp.name());

            if delta <= theta || num_iterations.map_or(false, |n| sweeps >= n) {
                return Ok((delta, sweeps));
            }
        }
    }
}

/// Greedy one-step improvement on successor values, without the reward term. Domains with
/// rewarded non-terminal moves are ranked on the same backup evaluation uses.
/// Returns whether any state changed its action.
pub fn policy_improvement<M: Mdp + ?Sized>(
    mdp: &M,
    policy: &mut Policy<M::State>,
    values: &ValueTable<M::State>,
    gamma: Continous,
) -> Result<bool> {
    let full_backup = mdp.has_transient_rewards();
    let mut changed = 0;
    for s in mdp.states() {
        if mdp.is_end(s) {
            continue;
        }

        let actions = mdp.valid_actions(s);
        let best = argmax(&actions, |a| {
            if full_backup {
                backup(mdp, values, s, a, gamma)
            } else {
                values.checked(&mdp.next_state(s, a))
            }
        })?;
        if let Some((a, _)) = best {
            if policy.update(s, a) {
                changed += 1;
            }
        }
    }

    debug!("{}: policy improvement changed {changed} states", mdp.name());
    Ok(changed > 0)
}

/// Policy iteration - Sutton & Barto 2018, section 4.3.
#[derive(Debug, Clone)]
pub struct PolicyIteration {
    pub gamma: Continous,
}

impl PolicyIteration {
    pub fn new(gamma: Continous) -> Self {
        Self { gamma }
    }
}

impl<M: Mdp + ?Sized> MdpSolver<M> for PolicyIteration {
    /// Whether the policy is stable.
    type Output = bool;

    /// `num_iterations` caps the number of evaluation/improvement rounds. Each evaluation
    /// still runs to `theta`.
    fn exec(
        &mut self,
        mdp: &M,
        policy: &mut Policy<M::State>,
        values: &mut ValueTable<M::State>,
        theta: Continous,
        num_iterations: Option<usize>,
    ) -> Result<(bool, usize)> {
        let mut evaluation = PolicyEvaluation::new(self.gamma);
        let mut rounds = 0;
        loop {
            let (_, sweeps) = evaluation.exec(mdp, policy, values, theta, None)?;
            let changed = policy_improvement(mdp, policy, values, self.gamma)?;
            rounds += 1;
            debug!(
                "{}: policy iteration round {rounds}, {sweeps} evaluation sweeps",
                mdp.name()
            );

            let stable = !changed;
            if stable || num_iterations.map_or(false, |n| rounds >= n) {
                info!(
                    "{}: policy iteration stopped after {rounds} rounds, stable: {stable}",
                    mdp.name()
                );
                return Ok((stable, rounds));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::vi::ValueIteration;
    use super::super::THETA;
    use super::*;
    use crate::envs::grid_world::GridWorld;
    use crate::envs::map::{Limits, MapDescriptor};
    use float_eq::*;
    use rstest::*;

    fn world(ascii: &str) -> GridWorld {
        GridWorld::new(&MapDescriptor::parse_ascii(ascii).unwrap(), Limits::default()).unwrap()
    }

    #[test]
    fn evaluation_follows_the_policy_not_the_max() {
        let w = world("@--G");
        let mut pi = Policy::new(&w);
        let mut v = ValueTable::new(&w);
        pi.update(&Coord::new(1, 0), Action::Left);

        PolicyEvaluation::new(0.9)
            .exec(&w, &mut pi, &mut v, THETA, None)
            .unwrap();

        // (0,0) and (1,0) bounce between each other and never see the goal.
        assert_float_eq!(v.value(&Coord::new(0, 0)), 0., abs <= 1e-12);
        assert_float_eq!(v.value(&Coord::new(1, 0)), 0., abs <= 1e-12);
        assert_float_eq!(v.value(&Coord::new(2, 0)), 0.9, abs <= 1e-12);
    }

    #[test]
    fn improvement_reports_whether_anything_changed() {
        let w = world("@--G");
        let mut pi = Policy::new(&w);
        let mut v = ValueTable::new(&w);
        pi.update(&Coord::new(1, 0), Action::Left);
        PolicyEvaluation::new(0.9)
            .exec(&w, &mut pi, &mut v, THETA, None)
            .unwrap();

        assert!(policy_improvement(&w, &mut pi, &v, 0.9).unwrap());
        assert_eq!(pi.action(&Coord::new(1, 0)), Action::Right);
        assert!(!policy_improvement(&w, &mut pi, &v, 0.9).unwrap());
    }

    #[rstest]
    #[case("---G\n----\n----\n@---")]
    #[case("----G\n-----\n--#--\n-#-#-\n@----")]
    #[case("#--G\n-#--\n---#\n@---")]
    fn matches_value_iteration(#[case] ascii: &str) {
        let w = world(ascii);

        let mut pi_vi = Policy::new(&w);
        let mut v_vi = ValueTable::new(&w);
        ValueIteration::new(0.9)
            .exec(&w, &mut pi_vi, &mut v_vi, THETA, None)
            .unwrap();

        let mut pi_pi = Policy::new(&w);
        let mut v_pi = ValueTable::new(&w);
        let (stable, rounds) = PolicyIteration::new(0.9)
            .exec(&w, &mut pi_pi, &mut v_pi, THETA, None)
            .unwrap();

        assert!(stable);
        assert!(rounds >= 1);
        for s in w.states() {
            assert_float_eq!(v_pi.value(s), v_vi.value(s), abs <= THETA);
        }
    }
}
