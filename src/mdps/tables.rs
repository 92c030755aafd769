use super::mdp::Mdp;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use log::warn;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Total mapping from state to the recommended action.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy<S: Eq + Hash> {
    actions: HashMap<S, Action>,
}

impl<S: Clone + Eq + Hash + Debug> Policy<S> {
    /// Every state starts on its first valid action, `Up` when it has none.
    pub fn new<M: Mdp<State = S> + ?Sized>(mdp: &M) -> Self {
        let actions = mdp
            .states()
            .iter()
            .map(|s| {
                let a = mdp.valid_actions(s).first().copied().unwrap_or_default();
                (s.clone(), a)
            })
            .collect();

        Self { actions }
    }

    /// Unknown states fall back to `Up`. That only happens when state generation and the
    /// transition model disagree, so it is logged.
    pub fn action(&self, s: &S) -> Action {
        match self.actions.get(s) {
            Some(&a) => a,
            None => {
                warn!("Policy has no entry for {s:?}, falling back to {}", Action::default());
                Action::default()
            }
        }
    }

    pub fn get(&self, s: &S) -> Option<Action> {
        self.actions.get(s).copied()
    }

    /// Overwrites unconditionally. Returns whether the action changed.
    pub fn update(&mut self, s: &S, a: Action) -> bool {
        match self.actions.get_mut(s) {
            Some(prev) => {
                let changed = *prev != a;
                *prev = a;
                changed
            }
            None => {
                self.actions.insert(s.clone(), a);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Action)> {
        self.actions.iter()
    }
}

/// Total mapping from state to a scalar estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable<S: Eq + Hash> {
    values: HashMap<S, Continous>,
}

impl<S: Clone + Eq + Hash + Debug> ValueTable<S> {
    pub fn new<M: Mdp<State = S> + ?Sized>(mdp: &M) -> Self {
        let values = mdp
            .states()
            .iter()
            .map(|s| (s.clone(), mdp.initial_value(s)))
            .collect();

        Self { values }
    }

    /// Unknown states read as 0, with a warning.
    pub fn value(&self, s: &S) -> Continous {
        match self.values.get(s) {
            Some(&v) => v,
            None => {
                warn!("Value table has no entry for {s:?}, reading 0");
                0.
            }
        }
    }

    pub fn get(&self, s: &S) -> Option<Continous> {
        self.values.get(s).copied()
    }

    /// Lookup used by the solvers: a missing successor means the transition model left the
    /// enumerated state space.
    pub fn checked(&self, s: &S) -> Result<Continous> {
        self.values
            .get(s)
            .copied()
            .ok_or_else(|| MdpError::UnknownState(format!("{s:?}")))
    }

    pub fn set(&mut self, s: &S, v: Continous) {
        match self.values.get_mut(s) {
            Some(prev) => *prev = v,
            None => {
                self.values.insert(s.clone(), v);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Continous)> {
        self.values.iter()
    }
}

impl<S: Eq + Hash> From<HashMap<S, Continous>> for ValueTable<S> {
    fn from(values: HashMap<S, Continous>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::grid_world::GridWorld;
    use crate::envs::map::{Limits, MapDescriptor};

    fn world() -> GridWorld {
        let map = MapDescriptor::parse_ascii("--G\n#--\n@--").unwrap();
        GridWorld::new(&map, Limits::default()).unwrap()
    }

    #[test]
    fn policy_starts_on_first_valid_action() {
        let w = world();
        let pi = Policy::new(&w);

        assert_eq!(pi.len(), w.states().len());
        assert_eq!(pi.action(&Coord::new(0, 0)), Action::Right);
        assert_eq!(pi.action(&Coord::new(0, 2)), Action::Right);
        assert_eq!(pi.action(&Coord::new(1, 1)), Action::Up);
    }

    #[test]
    fn policy_update_reports_change() {
        let w = world();
        let mut pi = Policy::new(&w);

        assert!(!pi.update(&Coord::new(0, 0), Action::Right));
        assert!(pi.update(&Coord::new(0, 0), Action::Up));
        assert_eq!(pi.get(&Coord::new(0, 0)), Some(Action::Up));
    }

    #[test]
    fn unknown_entries_read_as_defaults() {
        let w = world();
        let pi = Policy::new(&w);
        let v = ValueTable::new(&w);

        assert_eq!(pi.action(&Coord::new(0, 1)), Action::Up);
        assert_eq!(v.value(&Coord::new(0, 1)), 0.);
        assert!(matches!(
            v.checked(&Coord::new(7, 7)),
            Err(MdpError::UnknownState(_))
        ));
    }

    #[test]
    fn values_start_at_zero_except_goal() {
        let w = world();
        let v = ValueTable::new(&w);

        assert_eq!(v.len(), 8);
        assert_eq!(v.value(&Coord::new(2, 2)), 1.);
        assert_eq!(v.iter().filter(|(_, x)| **x == 0.).count(), 7);
    }
}
