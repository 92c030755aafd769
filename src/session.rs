use crate::algos::model_based::mdp::pi::{policy_improvement, PolicyEvaluation, PolicyIteration};
use crate::algos::model_based::mdp::vi::ValueIteration;
use crate::algos::model_based::mdp::{MdpSolver, THETA};
use crate::algos::model_free::gradient_free::off_policy::q_learning::{q_learning, QTable, QlParams};
use crate::algos::model_free::gradient_free::on_policy::monte_carlo::{
    monte_carlo_control, McParams,
};
use crate::common::defs::*;
use crate::envs::grid_world::GridWorld;
use crate::envs::map::{Domain, Limits, MapDescriptor};
use crate::envs::sokoban::Sokoban;
use crate::error::Result;
use crate::mdps::mdp::Mdp;
use crate::mdps::mdp_simulator::MdpSimulator;
use crate::mdps::tables::{Policy, ValueTable};
use crate::ui::Renderer;
use log::info;
use rand::prelude::*;

/// One engine run: the domain, its state space, the tables the solvers write and the random
/// source used for exploration. Nothing is shared between sessions; build a new one to reset.
pub struct Session<M: Mdp, R: Rng = StdRng> {
    mdp: M,
    policy: Policy<M::State>,
    values: ValueTable<M::State>,
    returns: Option<ValueTable<M::State>>,
    q: Option<QTable<M::State>>,
    rng: R,
    current: M::State,
    renderer: Option<Box<dyn Renderer<M>>>,
}

impl<M: Mdp, R: Rng> Session<M, R> {
    pub fn new(mdp: M, rng: R) -> Self {
        let policy = Policy::new(&mdp);
        let values = ValueTable::new(&mdp);
        let current = mdp.start().clone();
        info!(
            "{}: session ready with {} states",
            mdp.name(),
            mdp.states().len()
        );

        Self {
            mdp,
            policy,
            values,
            returns: None,
            q: None,
            rng,
            current,
            renderer: None,
        }
    }

    /// Installs the display adapter and draws the freshly set up state.
    pub fn set_renderer<D: Renderer<M> + 'static>(&mut self, renderer: D) {
        self.renderer = Some(Box::new(renderer));
        self.notify();
    }

    pub fn mdp(&self) -> &M {
        &self.mdp
    }

    pub fn policy(&self) -> &Policy<M::State> {
        &self.policy
    }

    pub fn values(&self) -> &ValueTable<M::State> {
        &self.values
    }

    /// Averaged returns from the last Monte Carlo run.
    pub fn returns(&self) -> Option<&ValueTable<M::State>> {
        self.returns.as_ref()
    }

    /// Q-table from the last Q-learning run.
    pub fn q_table(&self) -> Option<&QTable<M::State>> {
        self.q.as_ref()
    }

    /// Runs any dynamic-programming solver against this session's tables.
    pub fn run<S: MdpSolver<M>>(
        &mut self,
        solver: &mut S,
        num_iterations: Option<usize>,
    ) -> Result<(S::Output, usize)> {
        let ret = solver.exec(
            &self.mdp,
            &mut self.policy,
            &mut self.values,
            THETA,
            num_iterations,
        );
        self.notify();
        ret
    }

    /// Returns the number of sweeps.
    pub fn value_iteration(&mut self, gamma: Continous) -> Result<usize> {
        Ok(self.run(&mut ValueIteration::new(gamma), None)?.1)
    }

    /// Returns the number of sweeps.
    pub fn policy_evaluation(&mut self, gamma: Continous) -> Result<usize> {
        Ok(self.run(&mut PolicyEvaluation::new(gamma), None)?.1)
    }

    /// Returns whether any state changed its action.
    pub fn policy_improvement(&mut self, gamma: Continous) -> Result<bool> {
        let ret = policy_improvement(&self.mdp, &mut self.policy, &self.values, gamma);
        self.notify();
        ret
    }

    /// Returns the number of evaluation/improvement rounds.
    pub fn policy_iteration(&mut self, gamma: Continous) -> Result<usize> {
        Ok(self.run(&mut PolicyIteration::new(gamma), None)?.1)
    }

    pub fn monte_carlo_control(&mut self, params: &McParams) -> Result<&ValueTable<M::State>> {
        let ret = monte_carlo_control(&self.mdp, &mut self.policy, &mut self.rng, params);
        self.notify();

        Ok(self.returns.insert(ValueTable::from(ret?)))
    }

    pub fn q_learning(&mut self, params: &QlParams) -> Result<&QTable<M::State>> {
        let ret = q_learning(&self.mdp, &mut self.policy, &mut self.rng, params);
        self.notify();

        Ok(self.q.insert(ret?))
    }

    /// States visited when following the policy from the start state, start included. Stops
    /// at a terminal state or after `max_steps` moves.
    pub fn greedy_path(&self, max_steps: usize) -> Vec<M::State> {
        let mut s = self.mdp.start().clone();
        let mut path = vec![s.clone()];
        while !self.mdp.is_end(&s) && path.len() <= max_steps {
            s = self.mdp.next_state(&s, self.policy.action(&s));
            path.push(s.clone());
        }

        path
    }

    fn notify(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.redraw(&self.mdp, &self.policy, &self.values, &self.current);
        }
    }
}

impl<M: Mdp, R: Rng> MdpSimulator for Session<M, R> {
    type State = M::State;

    fn current(&self) -> &M::State {
        &self.current
    }

    fn reset(&mut self) {
        self.current = self.mdp.start().clone();
        self.notify();
    }

    fn step(&mut self) -> Option<M::State> {
        if self.mdp.is_end(&self.current) {
            return None;
        }

        let a = self.policy.action(&self.current);
        self.current = self.mdp.next_state(&self.current, a);
        self.notify();

        Some(self.current.clone())
    }
}

/// A session for whichever domain the map was set up as.
pub enum Engine<R: Rng = StdRng> {
    GridWorld(Session<GridWorld, R>),
    Sokoban(Session<Sokoban, R>),
}

impl<R: Rng> Engine<R> {
    /// Validates the map and builds the domain model, state space and initial tables.
    pub fn setup(map: &MapDescriptor, domain: Domain, rng: R, limits: Limits) -> Result<Self> {
        Ok(match domain {
            Domain::GridWorld => Engine::GridWorld(Session::new(GridWorld::new(map, limits)?, rng)),
            Domain::Sokoban => Engine::Sokoban(Session::new(Sokoban::new(map, limits)?, rng)),
        })
    }

    pub fn domain(&self) -> Domain {
        match self {
            Engine::GridWorld(_) => Domain::GridWorld,
            Engine::Sokoban(_) => Domain::Sokoban,
        }
    }
}
