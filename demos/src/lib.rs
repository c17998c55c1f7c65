//! qflow demo suite
//!
//! Console helpers and a small run driver shared by the demo binaries:
//!
//! - **demo-vqe**: ground-state search for H2, H4, LiH and H2O
//! - **demo-qaoa**: Max-Cut on random graphs
//!
//! Both binaries accept a YAML/JSON run file, `QFLOW_*` environment
//! overrides and command-line flags, applied in that order.

pub mod runner;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qflow::config::{LogFormat, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

pub use runner::{RunReport, run};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Create a progress bar for an optimization loop.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Log level after applying `-v` flags: one raises to debug, two to trace.
pub fn effective_level(configured: &str, verbose: u8) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_tracing(config: &LoggingConfig, verbose: u8) -> anyhow::Result<()> {
    let level = effective_level(&config.level, verbose);
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(_) if verbose == 0 => EnvFilter::try_from_default_env()?,
        _ => EnvFilter::try_new(level)?,
    };

    let fmt_layer = match config.format {
        LogFormat::Console => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install tracing subscriber")
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Print up to `points` evenly spaced entries of a cost history.
pub fn print_history(history: &[f64], points: usize) {
    let stride = history.len().div_ceil(points.max(1)).max(1);
    for (i, cost) in history.iter().enumerate().step_by(stride) {
        println!("  Step {:4}: {:.8}", i + 1, cost);
    }
    if let Some(last) = history.last() {
        if (history.len() - 1) % stride != 0 {
            println!("  Step {:4}: {:.8}", history.len(), last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_level() {
        assert_eq!(effective_level("warn", 0), "warn");
        assert_eq!(effective_level("warn", 1), "debug");
        assert_eq!(effective_level("info", 4), "trace");
    }

    #[test]
    fn test_progress_bar_length() {
        let pb = create_progress_bar(25, "optimizing");
        assert_eq!(pb.length(), Some(25));
        assert_eq!(pb.message(), "optimizing");
    }
}
