//! QAOA (Quantum Approximate Optimization Algorithm) Demo
//!
//! Solves Max-Cut on a seeded random graph and reports the approximation
//! ratio reached by the optimizer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use qflow::RunConfig;
use qflow::config::{OptimizerConfig, ProblemConfig};
use qflow_demos::{
    create_progress_bar, init_tracing, print_header, print_history, print_result, print_section,
    print_success, run,
};

#[derive(Parser, Debug)]
#[command(name = "demo-qaoa")]
#[command(about = "Solve Max-Cut with natural-gradient QAOA")]
struct Args {
    /// Run configuration file (YAML or JSON)
    #[arg(short, long, env = "QFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Number of graph nodes
    #[arg(short, long)]
    nodes: Option<usize>,

    /// QAOA depth p
    #[arg(short, long)]
    layers: Option<usize>,

    /// Seed of the random graph
    #[arg(short, long)]
    graph_seed: Option<u64>,

    /// Optimizer
    #[arg(short, long, value_parser = ["qng2", "qng", "adam", "gradient-descent"])]
    optimizer: Option<String>,

    /// Optimizer step size
    #[arg(long)]
    stepsize: Option<f64>,

    /// Number of optimizer steps
    #[arg(short, long)]
    steps: Option<usize>,

    /// Seed for the initial parameters
    #[arg(long)]
    seed: Option<u64>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> Result<RunConfig> {
        let mut config = RunConfig::load(self.config.as_deref())
            .context("failed to load run configuration")?;

        // A file for another problem only contributes optimizer and loop settings.
        if !matches!(config.problem, ProblemConfig::Maxcut { .. }) {
            config.problem = ProblemConfig::from_name("maxcut")?;
        }
        if let ProblemConfig::Maxcut {
            num_layers,
            num_nodes,
            graph_seed,
        } = &mut config.problem
        {
            *num_layers = self.layers.unwrap_or(*num_layers);
            *num_nodes = self.nodes.unwrap_or(*num_nodes);
            *graph_seed = self.graph_seed.unwrap_or(*graph_seed);
        }

        if let Some(name) = &self.optimizer {
            config.optimizer = OptimizerConfig::from_name(name)?;
        }
        if let Some(stepsize) = self.stepsize {
            config.optimizer.set_stepsize(stepsize);
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbose = args.verbose;
    let json = args.json;
    let config = args.into_config()?;
    init_tracing(&config.logging, verbose)?;

    if !json {
        print_header("QAOA Max-Cut Demo");
        print_section("Configuration");
        if let ProblemConfig::Maxcut {
            num_layers,
            num_nodes,
            graph_seed,
        } = config.problem
        {
            print_result("Nodes", num_nodes);
            print_result("Depth p", num_layers);
            print_result("Graph seed", graph_seed);
        }
        print_result("Optimizer", format!("{:?}", config.optimizer));
        print_result("Steps", config.steps);
    }

    let pb = create_progress_bar(config.steps as u64, "Optimizing...");
    if json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    let report = run(&config, |_, cost| {
        pb.set_message(format!("⟨C⟩ = {cost:.5}"));
        pb.inc(1);
    })
    .context("QAOA run failed")?;
    pb.finish_with_message("Optimization complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let result = &report.result;
    print_section("Results");
    print_result("Cost terms", report.n_terms);
    print_result("Initial ⟨C⟩", format!("{:.6}", result.initial_cost));
    print_result("Final ⟨C⟩", format!("{:.6}", result.final_cost()));
    print_result("Maximum cut", format!("{:.0}", -report.min_energy));
    if let Some(r) = report.approximation_ratio() {
        print_result("Approximation ratio", format!("{r:.4}"));
    }
    print_result("Elapsed", format!("{} ms", result.elapsed_ms));

    print_section("Cost Convergence");
    print_history(&result.cost_history, 10);

    println!();
    print_success("QAOA demo complete");
    Ok(())
}
