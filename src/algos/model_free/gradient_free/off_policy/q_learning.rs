use crate::algos::model_free::epsilon_greedy;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::Mdp;
use crate::mdps::tables::Policy;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateAction<S> {
    pub state: S,
    pub action: Action,
}

/// Tabular action values. Pairs never written read as 0.
#[derive(Debug, Clone)]
pub struct QTable<S> {
    q: HashMap<StateAction<S>, Continous>,
}

impl<S> Default for QTable<S> {
    fn default() -> Self {
        Self { q: HashMap::new() }
    }
}

impl<S: Clone + Eq + Hash> QTable<S> {
    pub fn get(&self, s: &S, a: Action) -> Continous {
        let key = StateAction {
            state: s.clone(),
            action: a,
        };
        self.q.get(&key).copied().unwrap_or_default()
    }

    /// 0 when there are no actions.
    pub fn max_q(&self, s: &S, actions: &[Action]) -> Continous {
        self.greedy(s, actions).map_or(0., |(_, q)| q)
    }

    /// Highest valued action, first in `actions` order on ties.
    pub fn greedy_action(&self, s: &S, actions: &[Action]) -> Option<Action> {
        self.greedy(s, actions).map(|(a, _)| a)
    }

    /// `Q(s,a) ← Q(s,a) + α·(target − Q(s,a))`
    pub fn update(&mut self, s: &S, a: Action, target: Continous, alpha: Continous) {
        let q = self
            .q
            .entry(StateAction {
                state: s.clone(),
                action: a,
            })
            .or_default();
        *q += alpha * (target - *q);
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    fn greedy(&self, s: &S, actions: &[Action]) -> Option<(Action, Continous)> {
        let mut best: Option<(Action, Continous)> = None;
        for &a in actions {
            let v = self.get(s, a);
            if best.map_or(true, |(_, b)| v > b) {
                best = Some((a, v));
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QlParams {
    pub num_episodes: usize,
    pub alpha: Continous,
    pub gamma: Continous,
    pub epsilon: Continous,
    pub max_steps: usize,
}

/// Q-learning - Sutton & Barto 2018, section 6.5.
///
/// Episodes start from the map's start state and act ε-greedily on the Q-table. Once all
/// episodes ran, `policy` is set to the greedy action of every state.
pub fn q_learning<M: Mdp + ?Sized, R: Rng + ?Sized>(
    mdp: &M,
    policy: &mut Policy<M::State>,
    rng: &mut R,
    params: &QlParams,
) -> Result<QTable<M::State>> {
    let mut q = QTable::default();

    for e in 0..params.num_episodes {
        let mut s = mdp.start().clone();
        let mut steps = 0;
        while !mdp.is_end(&s) && steps < params.max_steps {
            let actions = mdp.valid_actions(&s);
            let greedy = q.greedy_action(&s, &actions).unwrap_or_default();
            let a = epsilon_greedy(rng, params.epsilon, greedy, &actions);

            let next = mdp.next_state(&s, a);
            if policy.get(&next).is_none() {
                return Err(MdpError::UnknownState(format!("{next:?}")));
            }

            let reward = mdp.immediate_reward(&s, a);
            let max_next = if mdp.is_end(&next) {
                0.
            } else {
                q.max_q(&next, &mdp.valid_actions(&next))
            };
            q.update(&s, a, reward + params.gamma * max_next, params.alpha);

            s = next;
            steps += 1;
        }

        debug!(
            "{}: episode {e} finished after {steps} steps, terminal: {}",
            mdp.name(),
            mdp.is_end(&s)
        );
    }

    for s in mdp.states() {
        if let Some(a) = q.greedy_action(s, &mdp.valid_actions(s)) {
            policy.update(s, a);
        }
    }

    info!(
        "{}: Q-learning finished {} episodes, {} state-action values",
        mdp.name(),
        params.num_episodes,
        q.len()
    );

    Ok(q)
}
