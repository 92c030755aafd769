use crate::algos::model_based::mdp::common::argmax;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::Mdp;
use crate::mdps::mdp_simulator::{rollout, EpisodeEvent, EpisodeGenerator};
use crate::mdps::tables::Policy;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Ref: https://youtu.be/P0ZvxeQqv0A?si=RLKdOUTNEfKXE63C
pub fn mc_first_visit<S: Clone + Eq + Hash>(
    ep_gen: &mut dyn EpisodeGenerator<S>,
    gamma: Continous,
    n_ep: usize,
) -> HashMap<S, Continous> {
    mc_core(ep_gen, gamma, n_ep, true)
}

/// Ref: https://youtu.be/P0ZvxeQqv0A?si=RLKdOUTNEfKXE63C
pub fn mc_every_visit<S: Clone + Eq + Hash>(
    ep_gen: &mut dyn EpisodeGenerator<S>,
    gamma: Continous,
    n_ep: usize,
) -> HashMap<S, Continous> {
    mc_core(ep_gen, gamma, n_ep, false)
}

fn mc_core<S: Clone + Eq + Hash>(
    ep_gen: &mut dyn EpisodeGenerator<S>,
    gamma: Continous,
    n_ep: usize,
    first_visit: bool,
) -> HashMap<S, Continous> {
    let mut acc = ReturnAccumulator::default();
    for ep in ep_gen.generate(n_ep).iter().take(n_ep) {
        acc.record(ep, gamma, first_visit);
    }

    acc.averages()
}

/// Running sums of discounted returns and visit counts per state.
#[derive(Debug, Clone)]
pub struct ReturnAccumulator<S> {
    returns: HashMap<S, Continous>,
    visits: HashMap<S, usize>,
}

impl<S> Default for ReturnAccumulator<S> {
    fn default() -> Self {
        Self {
            returns: HashMap::new(),
            visits: HashMap::new(),
        }
    }
}

impl<S: Clone + Eq + Hash> ReturnAccumulator<S> {
    /// Walks the episode backwards with `G ← γ·G + r[t+1]`. In first-visit mode a state only
    /// contributes at its earliest occurrence in the episode.
    pub fn record(&mut self, ep: &[EpisodeEvent<S>], gamma: Continous, first_visit: bool) {
        if ep.len() < 2 {
            return;
        }

        let mut first_seen: HashMap<&S, usize> = HashMap::new();
        if first_visit {
            for (t, e) in ep.iter().enumerate() {
                first_seen.entry(&e.s).or_insert(t);
            }
        }

        let mut g = 0.;
        for t in (0..(ep.len() - 1)).rev() {
            g = gamma * g + ep[t + 1].r;
            let s = &ep[t].s;
            if !first_visit || first_seen.get(s) == Some(&t) {
                *self.returns.entry(s.clone()).or_default() += g;
                *self.visits.entry(s.clone()).or_default() += 1;
            }
        }
    }

    pub fn average(&self, s: &S) -> Option<Continous> {
        let v = *self.visits.get(s)?;
        let r = self.returns.get(s).copied().unwrap_or_default();
        Some(r / v as Continous)
    }

    pub fn averages(&self) -> HashMap<S, Continous> {
        self.visits
            .iter()
            .map(|(s, &v)| (s.clone(), self.returns[s] / v as Continous))
            .collect()
    }

    pub fn visits(&self, s: &S) -> usize {
        self.visits.get(s).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McParams {
    pub num_episodes: usize,
    pub gamma: Continous,
    pub max_steps: usize,
    pub epsilon: Continous,
    pub first_visit: bool,
}

/// On-policy Monte Carlo control - Sutton & Barto 2018, section 5.4.
///
/// Every episode starts from the map's start state and follows `policy` ε-greedily. After each
/// episode the policy is made greedy, for every non-terminal state, on the averaged returns of
/// its successors (unvisited successors count as 0). Returns the averaged return per visited
/// state.
pub fn monte_carlo_control<M: Mdp + ?Sized, R: Rng + ?Sized>(
    mdp: &M,
    policy: &mut Policy<M::State>,
    rng: &mut R,
    params: &McParams,
) -> Result<HashMap<M::State, Continous>> {
    let mut acc = ReturnAccumulator::default();

    for e in 0..params.num_episodes {
        let ep = rollout(mdp, policy, rng, params.epsilon, params.max_steps);
        if let Some(stray) = ep.iter().find(|x| policy.get(&x.s).is_none()) {
            return Err(MdpError::UnknownState(format!("{:?}", stray.s)));
        }

        acc.record(&ep, params.gamma, params.first_visit);
        let averages = acc.averages();
        let changed = improve(mdp, policy, &averages)?;
        debug!(
            "{}: episode {e}, {} steps, return {}, {changed} policy changes",
            mdp.name(),
            ep.len() - 2,
            ep.iter().map(|x| x.r).sum::<Continous>()
        );
    }

    let averages = acc.averages();
    info!(
        "{}: Monte Carlo control finished {} episodes, {} states visited",
        mdp.name(),
        params.num_episodes,
        averages.len()
    );

    Ok(averages)
}

fn improve<M: Mdp + ?Sized>(
    mdp: &M,
    policy: &mut Policy<M::State>,
    averages: &HashMap<M::State, Continous>,
) -> Result<usize> {
    let mut changed = 0;
    for s in mdp.states() {
        if mdp.is_end(s) {
            continue;
        }

        let actions = mdp.valid_actions(s);
        let best = argmax(&actions, |a| {
            Ok(averages
                .get(&mdp.next_state(s, a))
                .copied()
                .unwrap_or_default())
        })?;
        if let Some((a, _)) = best {
            if policy.update(s, a) {
                changed += 1;
            }
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algos::model_based::mdp::{pi::PolicyEvaluation, vi::ValueIteration};
    use crate::algos::model_based::mdp::{MdpSolver, THETA};
    use crate::envs::grid_world::GridWorld;
    use crate::envs::map::{Limits, MapDescriptor};
    use crate::mdps::mdp_simulator::{PolicyRollout, SUCCESS_REWARD};
    use crate::mdps::tables::ValueTable;
    use float_eq::*;
    use rand::prelude::*;
    use rstest::*;

    struct SimpleEnv {
        pub episodes: Vec<Vec<EpisodeEvent<Discrete>>>,
    }

    impl EpisodeGenerator<Discrete> for SimpleEnv {
        fn generate(&mut self, _n: usize) -> Vec<Vec<EpisodeEvent<Discrete>>> {
            self.episodes.clone()
        }
    }

    fn toy_env() -> SimpleEnv {
        SimpleEnv {
            episodes: vec![
                vec![
                    EpisodeEvent { s: 1, r: -3. },
                    EpisodeEvent { s: 4, r: -2. },
                    EpisodeEvent { s: 1, r: -1. },
                    EpisodeEvent { s: 2, r: -3. },
                    EpisodeEvent { s: 1, r: -1. },
                ],
                vec![EpisodeEvent { s: 1, r: -3. }, EpisodeEvent { s: 4, r: -0. }],
                vec![EpisodeEvent { s: 2, r: -3. }, EpisodeEvent { s: 4, r: -0. }],
            ],
        }
    }

    #[test]
    fn toy_example_with_first_vist() {
        let v = mc_first_visit(&mut toy_env(), 0.9, 3);

        assert_eq!(v.len(), 3);
        assert_float_eq!(v[&1], -6.059 / 2.0, abs <= 1e-5);
        assert_float_eq!(v[&2], -1. / 2.0, abs <= 1e-5);
        assert_float_eq!(v[&4], -4.51, abs <= 1e-5);
    }

    #[test]
    fn toy_example_with_every_vist() {
        let v = mc_every_visit(&mut toy_env(), 0.9, 3);

        assert_eq!(v.len(), 3);
        assert_float_eq!(v[&1], (-6.059 + -3.0 + -0.9) / 3.0, abs <= 1e-5);
        assert_float_eq!(v[&2], -1. / 2.0, abs <= 1e-5);
        assert_float_eq!(v[&4], -4.51, abs <= 1e-5);
    }

    fn world(ascii: &str) -> GridWorld {
        GridWorld::new(&MapDescriptor::parse_ascii(ascii).unwrap(), Limits::default()).unwrap()
    }

    #[test]
    fn greedy_returns_match_policy_evaluation() {
        let w = world("---G\n-#--\n----\n@---");
        let mut pi = Policy::new(&w);
        let mut v = ValueTable::new(&w);
        ValueIteration::new(0.9)
            .exec(&w, &mut pi, &mut v, THETA, None)
            .unwrap();
        PolicyEvaluation::new(0.9)
            .exec(&w, &mut pi, &mut v, THETA, None)
            .unwrap();

        let rng = &mut StdRng::seed_from_u64(2718);
        let mut gen = PolicyRollout {
            mdp: &w,
            policy: &pi,
            rng,
            epsilon: 0.,
            max_steps: 100,
        };
        let returns = mc_first_visit(&mut gen, 0.9, 5);

        assert_eq!(returns.len(), 7);
        for (s, g) in &returns {
            assert_float_eq!(*g, v.value(s), abs <= 1e-9);
        }
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn control_escapes_a_dead_end(#[case] first_visit: bool) {
        // Going Up first from the start traps the initial policy in a two-cell loop.
        let w = world("-#G\n@--");
        let mut pi = Policy::new(&w);
        assert_eq!(pi.action(&Coord::new(0, 0)), Action::Up);
        assert_eq!(pi.action(&Coord::new(0, 1)), Action::Down);

        let rng = &mut StdRng::seed_from_u64(2718);
        let params = McParams {
            num_episodes: 200,
            gamma: 0.9,
            max_steps: 30,
            epsilon: 0.1,
            first_visit,
        };
        let returns = monte_carlo_control(&w, &mut pi, rng, &params).unwrap();

        assert_eq!(pi.action(&Coord::new(0, 0)), Action::Right);
        assert_eq!(pi.action(&Coord::new(1, 0)), Action::Right);
        assert_eq!(pi.action(&Coord::new(2, 0)), Action::Up);
        assert_eq!(returns[&Coord::new(2, 1)], SUCCESS_REWARD);
    }
}
