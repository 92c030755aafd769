use super::mdp::Mdp;
use super::tables::Policy;
use crate::algos::model_free::epsilon_greedy;
use crate::common::defs::*;
use log::warn;
use rand::Rng;

/// Reward of the synthetic transition appended when an episode reaches a terminal state.
pub const SUCCESS_REWARD: Continous = 1.;
/// Reward of the synthetic transition appended when an episode runs out of steps.
pub const FAILURE_REWARD: Continous = -1.;

/// `r` is the reward received on entering `s`. The first event of an episode carries no reward.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EpisodeEvent<S> {
    pub s: S,
    pub r: Continous,
}

pub trait EpisodeGenerator<S> {
    fn generate(&mut self, n: usize) -> Vec<Vec<EpisodeEvent<S>>>;
}

/// Step-by-step playback, e.g. for animating a policy.
pub trait MdpSimulator {
    type State;

    fn current(&self) -> &Self::State;

    fn reset(&mut self);

    /// Advances one step. `None` once the current state is terminal.
    fn step(&mut self) -> Option<Self::State>;
}

/// ε-greedy episodes from the fixed start state under `policy`.
pub struct PolicyRollout<'a, M: Mdp + ?Sized, R: Rng + ?Sized> {
    pub mdp: &'a M,
    pub policy: &'a Policy<M::State>,
    pub rng: &'a mut R,
    pub epsilon: Continous,
    pub max_steps: usize,
}

impl<'a, M: Mdp + ?Sized, R: Rng + ?Sized> EpisodeGenerator<M::State> for PolicyRollout<'a, M, R> {
    fn generate(&mut self, n: usize) -> Vec<Vec<EpisodeEvent<M::State>>> {
        (0..n)
            .map(|_| rollout(self.mdp, self.policy, self.rng, self.epsilon, self.max_steps))
            .collect()
    }
}

/// Runs one episode. Entering a terminal state is rewarded 0; the terminal value arrives
/// through the synthetic success transition instead.
pub fn rollout<M: Mdp + ?Sized, R: Rng + ?Sized>(
    mdp: &M,
    policy: &Policy<M::State>,
    rng: &mut R,
    epsilon: Continous,
    max_steps: usize,
) -> Vec<EpisodeEvent<M::State>> {
    let mut s = mdp.start().clone();
    let mut ep = vec![EpisodeEvent {
        s: s.clone(),
        r: Default::default(),
    }];

    let mut steps = 0;
    loop {
        if mdp.is_end(&s) {
            ep.push(EpisodeEvent {
                s,
                r: SUCCESS_REWARD,
            });
            break;
        }

        if steps >= max_steps {
            warn!("Episode hit the step limit ({max_steps}) at {s:?}");
            ep.push(EpisodeEvent {
                s,
                r: FAILURE_REWARD,
            });
            break;
        }

        let a = epsilon_greedy(rng, epsilon, policy.action(&s), &mdp.valid_actions(&s));
        let next = mdp.next_state(&s, a);
        let r = if mdp.is_end(&next) {
            0.
        } else {
            mdp.immediate_reward(&s, a)
        };

        ep.push(EpisodeEvent { s: next.clone(), r });
        s = next;
        steps += 1;
    }

    ep
}
