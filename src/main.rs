use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use gridmdp::algos::model_free::gradient_free::off_policy::q_learning::QlParams;
use gridmdp::algos::model_free::gradient_free::on_policy::monte_carlo::McParams;
use gridmdp::ui::TextRenderer;
use gridmdp::*;
use log::{error, info};
use rand::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(version, about = "Solve grid world and Sokoban puzzles as MDPs")]
struct Args {
    /// Map file: `.json` descriptor or ASCII board.
    #[arg(long)]
    map: PathBuf,

    #[arg(long, value_enum, default_value_t = Domain::GridWorld)]
    domain: Domain,

    #[arg(long, default_value_t = 0.9)]
    gamma: Continous,

    #[arg(long, default_value_t = 2718)]
    seed: u64,

    /// Refuse maps whose state space is larger than this.
    #[arg(long)]
    max_states: Option<usize>,

    /// Walk the resulting policy from the start state, one frame per step.
    #[arg(long)]
    animate: bool,

    #[command(subcommand)]
    solver: Solver,
}

#[derive(Debug, Subcommand)]
enum Solver {
    ValueIteration,
    PolicyEvaluation,
    PolicyIteration,
    MonteCarlo {
        #[arg(long, default_value_t = 1000)]
        episodes: usize,
        #[arg(long, default_value_t = 0.1)]
        epsilon: Continous,
        #[arg(long, default_value_t = 100)]
        max_steps: usize,
        #[arg(long)]
        every_visit: bool,
    },
    QLearning {
        #[arg(long, default_value_t = 3000)]
        episodes: usize,
        #[arg(long, default_value_t = 0.5)]
        alpha: Continous,
        #[arg(long, default_value_t = 0.5)]
        epsilon: Continous,
        #[arg(long, default_value_t = 100)]
        max_steps: usize,
    },
}

fn solve<M: GridView>(mut session: Session<M>, args: &Args) -> Result<()> {
    session.set_renderer(TextRenderer::default());

    match args.solver {
        Solver::ValueIteration => {
            let sweeps = session.value_iteration(args.gamma)?;
            info!("Value iteration converged after {sweeps} sweeps");
        }
        Solver::PolicyEvaluation => {
            let sweeps = session.policy_evaluation(args.gamma)?;
            info!("Policy evaluation converged after {sweeps} sweeps");
        }
        Solver::PolicyIteration => {
            let rounds = session.policy_iteration(args.gamma)?;
            info!("Policy iteration stable after {rounds} rounds");
        }
        Solver::MonteCarlo {
            episodes,
            epsilon,
            max_steps,
            every_visit,
        } => {
            let params = McParams {
                num_episodes: episodes,
                gamma: args.gamma,
                max_steps,
                epsilon,
                first_visit: !every_visit,
            };
            let returns = session.monte_carlo_control(&params)?;
            info!("Monte Carlo control visited {} states", returns.len());
        }
        Solver::QLearning {
            episodes,
            alpha,
            epsilon,
            max_steps,
        } => {
            let params = QlParams {
                num_episodes: episodes,
                alpha,
                gamma: args.gamma,
                epsilon,
                max_steps,
            };
            let q = session.q_learning(&params)?;
            info!("Q-learning filled {} state-action pairs", q.len());
        }
    }

    if args.animate {
        let max_steps = session.mdp().states().len();
        let mut steps = 0;
        while steps < max_steps && session.step().is_some() {
            steps += 1;
        }
        if session.mdp().is_end(session.current()) {
            info!("Reached the end state in {steps} steps");
        } else {
            info!("Gave up after {steps} steps");
        }
    }

    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let map = MapDescriptor::from_file(&args.map)?;
    let limits = Limits {
        max_states: args.max_states,
    };
    let rng = StdRng::seed_from_u64(args.seed);

    match Engine::setup(&map, args.domain, rng, limits)? {
        Engine::GridWorld(session) => solve(session, args),
        Engine::Sokoban(session) => solve(session, args),
    }
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
