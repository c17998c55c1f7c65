//! VQE (Variational Quantum Eigensolver) Demo
//!
//! Minimizes the energy of a small molecule with a hardware-efficient ansatz
//! and compares it against the exact ground state of the active space.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use qflow::RunConfig;
use qflow::config::{OptimizerConfig, ProblemConfig};
use qflow::examples::Entangler;
use qflow_demos::{
    create_progress_bar, init_tracing, print_header, print_history, print_info, print_result,
    print_section, print_success, run,
};

#[derive(Parser, Debug)]
#[command(name = "demo-vqe")]
#[command(about = "Estimate molecular ground-state energies with natural-gradient VQE")]
struct Args {
    /// Run configuration file (YAML or JSON)
    #[arg(short, long, env = "QFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Molecule to simulate
    #[arg(short, long, value_parser = ["h2", "h4", "lih", "h2o"])]
    molecule: Option<String>,

    /// Number of ansatz layers
    #[arg(short, long)]
    layers: Option<usize>,

    /// Bond length in Ångström
    #[arg(short, long)]
    distance: Option<f64>,

    /// Entangling block of the ansatz
    #[arg(short, long, value_parser = ["basic", "strong"])]
    entangler: Option<String>,

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

    /// Directory holding `<molecule>.fcidump` files
    #[arg(long)]
    integrals_dir: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> Result<(RunConfig, bool)> {
        let mut config = RunConfig::load(self.config.as_deref())
            .context("failed to load run configuration")?;

        if let Some(name) = &self.molecule {
            config.problem = ProblemConfig::from_name(name)?;
        }
        if matches!(
            config.problem,
            ProblemConfig::Maxcut { .. } | ProblemConfig::BarrenPlateau { .. }
        ) {
            anyhow::bail!(
                "demo-vqe runs molecular problems, got {}",
                config.problem.name()
            );
        }
        if let Some(layers) = self.layers {
            config.problem.set_num_layers(layers);
        }
        if let Some(distance) = self.distance {
            config.problem.set_distance(distance)?;
        }
        if let Some(entangler) = &self.entangler {
            let entangler = match entangler.as_str() {
                "strong" => Entangler::Strong,
                _ => Entangler::Basic,
            };
            config.problem.set_entangler(entangler)?;
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
        if self.integrals_dir.is_some() {
            config.integrals_dir = self.integrals_dir;
        }
        config.validate()?;
        Ok((config, self.json))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbose = args.verbose;
    let (config, json) = args.into_config()?;
    init_tracing(&config.logging, verbose)?;

    if !json {
        print_header("VQE Molecular Ground State Demo");
        print_section("Configuration");
        print_result("Problem", config.problem.name());
        print_result("Optimizer", format!("{:?}", config.optimizer));
        print_result("Steps", config.steps);
        print_result("Diff method", format!("{:?}", config.diff_method));
        match &config.integrals_dir {
            Some(dir) => print_result("Integrals", dir.display()),
            None => print_result("Integrals", "built-in H2 (STO-3G)"),
        }
    }

    let pb = create_progress_bar(config.steps as u64, "Optimizing...");
    if json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    let report = run(&config, |_, cost| {
        pb.set_message(format!("E = {cost:.6} Ha"));
        pb.inc(1);
    })
    .with_context(|| format!("VQE run for {} failed", config.problem.name()))?;
    pb.finish_with_message("Optimization complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_section("Problem");
    print_result("Ansatz", &report.ansatz);
    print_result("Qubits", report.num_qubits);
    print_result("Parameters", report.num_params);
    print_result("Hamiltonian terms", report.n_terms);

    print_section("Results");
    let result = &report.result;
    print_result("Initial energy", format!("{:.8} Ha", result.initial_cost));
    print_result("Final energy", format!("{:.8} Ha", result.final_cost()));
    print_result("Best energy", format!("{:.8} Ha", result.best_cost()));
    print_result("Exact energy", format!("{:.8} Ha", report.min_energy));
    print_result("Error", format!("{:.3e} Ha", report.energy_error()));
    print_result("Elapsed", format!("{} ms", result.elapsed_ms));

    print_section("Energy Convergence");
    print_history(&result.cost_history, 10);

    println!();
    if report.energy_error() < 1.6e-3 {
        print_success("Reached chemical accuracy");
    } else {
        print_info("Above chemical accuracy; try more layers or steps");
    }
    Ok(())
}
