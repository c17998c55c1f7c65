//! Run configuration for the demo binaries.
//!
//! A run is described by a problem, an optimizer and a handful of loop
//! settings. Configuration is layered:
//! 1. Default values
//! 2. A YAML or JSON file
//! 3. Environment variables with the `QFLOW_` prefix

use std::path::{Path, PathBuf};

use qflow_chem::solver::H2_BOND_LENGTH;
use qflow_chem::{BuiltinSolver, ElectronicStructureSolver, FcidumpSolver};
use qflow_sim::gradient::DiffMethod;
use qflow_sim::metric::MetricApprox;
use serde::{Deserialize, Serialize};

use crate::error::{QflowError, QflowResult};
use crate::examples::{self, Entangler, Example};
use crate::optimizer::{
    AdamOptimizer, GradientDescentOptimizer, Optimizer, Qng2Settings, QngOptimizer,
};

/// Complete description of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Problem to solve
    #[serde(default)]
    pub problem: ProblemConfig,

    /// Optimizer and its hyperparameters
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Number of optimizer steps
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Seed for the initial parameters; `None` draws from entropy
    #[serde(default)]
    pub seed: Option<u64>,

    /// Gradient evaluation method
    #[serde(default)]
    pub diff_method: DiffMethod,

    /// Directory holding `<molecule>.fcidump` files; the built-in H2
    /// integrals are used when unset
    #[serde(default)]
    pub integrals_dir: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Problem selection, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProblemConfig {
    H2 {
        #[serde(default = "default_layers")]
        num_layers: usize,
        #[serde(default = "default_h2_distance")]
        distance: f64,
    },
    H4 {
        #[serde(default = "default_layers")]
        num_layers: usize,
        #[serde(default = "default_h4_distance")]
        distance: f64,
        #[serde(default = "default_h4_angle")]
        angle: f64,
        #[serde(default)]
        entangler: Entangler,
    },
    Lih {
        #[serde(default = "default_layers")]
        num_layers: usize,
        #[serde(default = "default_lih_distance")]
        distance: f64,
        #[serde(default)]
        entangler: Entangler,
    },
    H2o {
        #[serde(default = "default_layers")]
        num_layers: usize,
        #[serde(default = "default_h2o_distance")]
        distance: f64,
        #[serde(default = "default_h2o_angle")]
        angle: f64,
        #[serde(default)]
        entangler: Entangler,
    },
    Maxcut {
        #[serde(default = "default_layers")]
        num_layers: usize,
        #[serde(default = "default_num_nodes")]
        num_nodes: usize,
        #[serde(default)]
        graph_seed: u64,
    },
    BarrenPlateau {
        #[serde(default = "default_bp_layers")]
        num_layers: usize,
        #[serde(default = "default_bp_qubits")]
        num_qubits: usize,
    },
}

/// Optimizer selection, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OptimizerConfig {
    Qng2(Qng2Settings),
    Qng {
        #[serde(default = "default_stepsize")]
        stepsize: f64,
        #[serde(default)]
        approx: MetricApprox,
        #[serde(default)]
        lam: f64,
    },
    Adam {
        #[serde(default = "default_stepsize")]
        stepsize: f64,
        #[serde(default = "default_beta1")]
        beta1: f64,
        #[serde(default = "default_beta2")]
        beta2: f64,
    },
    GradientDescent {
        #[serde(default = "default_stepsize")]
        stepsize: f64,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output
    #[default]
    Console,
    /// JSON lines
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,
}

fn default_steps() -> usize {
    100
}

fn default_layers() -> usize {
    1
}

fn default_h2_distance() -> f64 {
    H2_BOND_LENGTH
}

fn default_h4_distance() -> f64 {
    1.0
}

fn default_h4_angle() -> f64 {
    90.0
}

fn default_lih_distance() -> f64 {
    3.0
}

fn default_h2o_distance() -> f64 {
    1.32
}

fn default_h2o_angle() -> f64 {
    104.5
}

fn default_num_nodes() -> usize {
    4
}

fn default_bp_layers() -> usize {
    5
}

fn default_bp_qubits() -> usize {
    7
}

fn default_stepsize() -> f64 {
    0.01
}

fn default_beta1() -> f64 {
    0.9
}

fn default_beta2() -> f64 {
    0.99
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            problem: ProblemConfig::default(),
            optimizer: OptimizerConfig::default(),
            steps: default_steps(),
            seed: None,
            diff_method: DiffMethod::default(),
            integrals_dir: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ProblemConfig {
    fn default() -> Self {
        ProblemConfig::H2 {
            num_layers: default_layers(),
            distance: default_h2_distance(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Qng2(Qng2Settings::default())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl ProblemConfig {
    /// Short name for progress output.
    pub fn name(&self) -> &'static str {
        match self {
            ProblemConfig::H2 { .. } => "h2",
            ProblemConfig::H4 { .. } => "h4",
            ProblemConfig::Lih { .. } => "lih",
            ProblemConfig::H2o { .. } => "h2o",
            ProblemConfig::Maxcut { .. } => "maxcut",
            ProblemConfig::BarrenPlateau { .. } => "barren-plateau",
        }
    }

    /// Problem of the given kind with default settings.
    pub fn from_name(name: &str) -> QflowResult<Self> {
        let layers = default_layers();
        Ok(match name {
            "h2" => ProblemConfig::default(),
            "h4" => ProblemConfig::H4 {
                num_layers: layers,
                distance: default_h4_distance(),
                angle: default_h4_angle(),
                entangler: Entangler::default(),
            },
            "lih" => ProblemConfig::Lih {
                num_layers: layers,
                distance: default_lih_distance(),
                entangler: Entangler::default(),
            },
            "h2o" => ProblemConfig::H2o {
                num_layers: layers,
                distance: default_h2o_distance(),
                angle: default_h2o_angle(),
                entangler: Entangler::default(),
            },
            "maxcut" => ProblemConfig::Maxcut {
                num_layers: layers,
                num_nodes: default_num_nodes(),
                graph_seed: 0,
            },
            "barren-plateau" => ProblemConfig::BarrenPlateau {
                num_layers: default_bp_layers(),
                num_qubits: default_bp_qubits(),
            },
            other => return Err(QflowError::Config(format!("Unknown problem: {other}"))),
        })
    }

    pub fn set_num_layers(&mut self, value: usize) {
        match self {
            ProblemConfig::H2 { num_layers, .. }
            | ProblemConfig::H4 { num_layers, .. }
            | ProblemConfig::Lih { num_layers, .. }
            | ProblemConfig::H2o { num_layers, .. }
            | ProblemConfig::Maxcut { num_layers, .. }
            | ProblemConfig::BarrenPlateau { num_layers, .. } => *num_layers = value,
        }
    }

    /// Set the bond length of a molecular problem.
    pub fn set_distance(&mut self, value: f64) -> QflowResult<()> {
        match self {
            ProblemConfig::H2 { distance, .. }
            | ProblemConfig::H4 { distance, .. }
            | ProblemConfig::Lih { distance, .. }
            | ProblemConfig::H2o { distance, .. } => {
                *distance = value;
                Ok(())
            }
            other => Err(QflowError::Config(format!(
                "{} has no bond length",
                other.name()
            ))),
        }
    }

    /// Set the entangler of a molecular problem. H2 only has the basic one.
    pub fn set_entangler(&mut self, value: Entangler) -> QflowResult<()> {
        match self {
            ProblemConfig::H4 { entangler, .. }
            | ProblemConfig::Lih { entangler, .. }
            | ProblemConfig::H2o { entangler, .. } => {
                *entangler = value;
                Ok(())
            }
            ProblemConfig::H2 { .. } if value == Entangler::Basic => Ok(()),
            other => Err(QflowError::Config(format!(
                "{} does not support the {value:?} entangler",
                other.name()
            ))),
        }
    }

    /// Build the problem instance, reading integrals through `solver`.
    pub fn build(&self, solver: &dyn ElectronicStructureSolver) -> QflowResult<Example> {
        match *self {
            ProblemConfig::H2 {
                num_layers,
                distance,
            } => examples::h2_vqe_example(num_layers, distance, solver),
            ProblemConfig::H4 {
                num_layers,
                distance,
                angle,
                entangler,
            } => match entangler {
                Entangler::Basic => {
                    examples::h4_vqe_basic_entangler_example(num_layers, distance, angle, solver)
                }
                Entangler::Strong => {
                    examples::h4_vqe_strong_entangler_example(num_layers, distance, angle, solver)
                }
            },
            ProblemConfig::Lih {
                num_layers,
                distance,
                entangler,
            } => match entangler {
                Entangler::Basic => {
                    examples::lih_vqe_basic_entangler_example(num_layers, distance, solver)
                }
                Entangler::Strong => {
                    examples::lih_vqe_strong_entangler_example(num_layers, distance, solver)
                }
            },
            ProblemConfig::H2o {
                num_layers,
                distance,
                angle,
                entangler,
            } => match entangler {
                Entangler::Basic => {
                    examples::h2o_vqe_basic_entangler_example(num_layers, distance, angle, solver)
                }
                Entangler::Strong => {
                    examples::h2o_vqe_strong_entangler_example(num_layers, distance, angle, solver)
                }
            },
            ProblemConfig::Maxcut {
                num_layers,
                num_nodes,
                graph_seed,
            } => examples::maxcut_qaoa_example(num_layers, num_nodes, graph_seed),
            ProblemConfig::BarrenPlateau {
                num_layers,
                num_qubits,
            } => examples::barren_plateau_example(num_layers, num_qubits),
        }
    }
}

impl OptimizerConfig {
    /// Optimizer of the given kind with default hyperparameters.
    pub fn from_name(name: &str) -> QflowResult<Self> {
        Ok(match name {
            "qng2" => OptimizerConfig::Qng2(Qng2Settings::default()),
            "qng" => OptimizerConfig::Qng {
                stepsize: default_stepsize(),
                approx: MetricApprox::default(),
                lam: 0.0,
            },
            "adam" => OptimizerConfig::Adam {
                stepsize: default_stepsize(),
                beta1: default_beta1(),
                beta2: default_beta2(),
            },
            "gradient-descent" | "gd" => OptimizerConfig::GradientDescent {
                stepsize: default_stepsize(),
            },
            other => return Err(QflowError::Config(format!("Unknown optimizer: {other}"))),
        })
    }

    /// Construct the configured optimizer.
    pub fn build(&self) -> QflowResult<Box<dyn Optimizer>> {
        Ok(match *self {
            OptimizerConfig::Qng2(settings) => Box::new(settings.build()?),
            OptimizerConfig::Qng {
                stepsize,
                approx,
                lam,
            } => Box::new(QngOptimizer::new(stepsize, approx)?.with_lam(lam)?),
            OptimizerConfig::Adam {
                stepsize,
                beta1,
                beta2,
            } => Box::new(AdamOptimizer::new(stepsize)?.with_betas(beta1, beta2)),
            OptimizerConfig::GradientDescent { stepsize } => {
                Box::new(GradientDescentOptimizer::new(stepsize)?)
            }
        })
    }

    pub fn stepsize(&self) -> f64 {
        match self {
            OptimizerConfig::Qng2(settings) => settings.stepsize,
            OptimizerConfig::Qng { stepsize, .. }
            | OptimizerConfig::Adam { stepsize, .. }
            | OptimizerConfig::GradientDescent { stepsize } => *stepsize,
        }
    }

    pub fn set_stepsize(&mut self, value: f64) {
        match self {
            OptimizerConfig::Qng2(settings) => settings.stepsize = value,
            OptimizerConfig::Qng { stepsize, .. }
            | OptimizerConfig::Adam { stepsize, .. }
            | OptimizerConfig::GradientDescent { stepsize } => *stepsize = value,
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML or JSON file, chosen by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> QflowResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| QflowError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents)?,
            _ => Self::from_yaml_str(&contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> QflowResult<Self> {
        serde_yaml_ng::from_str(contents).map_err(|e| QflowError::Config(e.to_string()))
    }

    pub fn from_json_str(contents: &str) -> QflowResult<Self> {
        serde_json::from_str(contents).map_err(|e| QflowError::Config(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> QflowResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| QflowError::Config(e.to_string()))
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> QflowResult<Self> {
        let mut config = RunConfig::default();
        config.merge_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Environment variables
    /// 2. The file, if given
    /// 3. Default values
    pub fn load(config_file: Option<&Path>) -> QflowResult<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => RunConfig::default(),
        };
        config.merge_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QFLOW_*` overrides read through `lookup`. Variables that are
    /// absent leave the corresponding fields unchanged.
    pub fn merge_env<F>(&mut self, lookup: F) -> QflowResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QFLOW_STEPS") {
            self.steps = parse_env("QFLOW_STEPS", &v)?;
        }
        if let Some(v) = lookup("QFLOW_SEED") {
            self.seed = Some(parse_env("QFLOW_SEED", &v)?);
        }
        if let Some(v) = lookup("QFLOW_STEPSIZE") {
            self.optimizer.set_stepsize(parse_env("QFLOW_STEPSIZE", &v)?);
        }
        if let Some(v) = lookup("QFLOW_INTEGRALS_DIR") {
            self.integrals_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("QFLOW_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("QFLOW_LOG_FORMAT") {
            self.logging.format = match v.as_str() {
                "console" => LogFormat::Console,
                "json" => LogFormat::Json,
                other => {
                    return Err(QflowError::Config(format!("Invalid log format: {other}")));
                }
            };
        }
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> QflowResult<()> {
        if self.steps == 0 {
            return Err(QflowError::Config(
                "steps must be greater than 0".to_string(),
            ));
        }
        let stepsize = self.optimizer.stepsize();
        if !(stepsize.is_finite() && stepsize > 0.0) {
            return Err(QflowError::Config(format!(
                "stepsize must be positive, got {stepsize}"
            )));
        }
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(QflowError::Config(format!("Invalid log level: {other}")));
            }
        }
        Ok(())
    }

    /// The integral source implied by `integrals_dir`.
    pub fn solver(&self) -> Box<dyn ElectronicStructureSolver> {
        match &self.integrals_dir {
            Some(dir) => Box::new(FcidumpSolver::new(dir)),
            None => Box::new(BuiltinSolver),
        }
    }

    pub fn build_example(&self) -> QflowResult<Example> {
        self.problem.build(self.solver().as_ref())
    }

    pub fn build_optimizer(&self) -> QflowResult<Box<dyn Optimizer>> {
        self.optimizer.build()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> QflowResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| QflowError::Config(format!("{key}: cannot parse {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::Ansatz;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.steps, 100);
        assert_eq!(config.optimizer, OptimizerConfig::Qng2(Qng2Settings::default()));
        assert_eq!(config.problem.name(), "h2");
        assert_eq!(config.diff_method, DiffMethod::Adjoint);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_with_defaults() {
        let yaml = r#"
problem:
  kind: maxcut
  num_layers: 2
optimizer:
  kind: qng2
  stepsize: 0.05
steps: 30
seed: 7
"#;
        let config = RunConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.problem,
            ProblemConfig::Maxcut {
                num_layers: 2,
                num_nodes: 4,
                graph_seed: 0
            }
        );
        match config.optimizer {
            OptimizerConfig::Qng2(s) => {
                assert_eq!(s.stepsize, 0.05);
                assert_eq!(s.approx, MetricApprox::BlockDiag);
                assert!(s.reuse_metric);
            }
            other => panic!("unexpected optimizer {other:?}"),
        }
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_json_config() {
        let json = r#"{
            "problem": {"kind": "h4", "entangler": "strong"},
            "optimizer": {"kind": "qng", "approx": "diag", "lam": 0.01},
            "diff_method": "parameter-shift",
            "logging": {"level": "debug", "format": "json"}
        }"#;
        let config = RunConfig::from_json_str(json).unwrap();
        assert_eq!(
            config.problem,
            ProblemConfig::H4 {
                num_layers: 1,
                distance: 1.0,
                angle: 90.0,
                entangler: Entangler::Strong
            }
        );
        assert_eq!(config.diff_method, DiffMethod::ParameterShift);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.build_optimizer().unwrap().name(), "qng");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("QFLOW_STEPS", "12"),
            ("QFLOW_SEED", "3"),
            ("QFLOW_STEPSIZE", "0.2"),
            ("QFLOW_LOG_FORMAT", "json"),
            ("QFLOW_INTEGRALS_DIR", "/data/fcidump"),
        ]
        .into_iter()
        .collect();
        let mut config = RunConfig::default();
        config
            .merge_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.steps, 12);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.optimizer.stepsize(), 0.2);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.integrals_dir, Some(PathBuf::from("/data/fcidump")));

        let bad = config.merge_env(|k| (k == "QFLOW_STEPS").then(|| "many".to_string()));
        assert!(matches!(bad, Err(QflowError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = RunConfig::default();
        config.steps = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.optimizer = OptimizerConfig::GradientDescent { stepsize: -0.1 };
        assert!(config.validate().is_err());
        assert!(config.build_optimizer().is_err());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(RunConfig::from_yaml_str("problem:\n  kind: h3\n").is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = RunConfig {
            problem: ProblemConfig::BarrenPlateau {
                num_layers: 5,
                num_qubits: 7,
            },
            optimizer: OptimizerConfig::Adam {
                stepsize: 0.1,
                beta1: 0.9,
                beta2: 0.99,
            },
            ..Default::default()
        };
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(RunConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_from_name_matches_serde_defaults() {
        for name in ["h2", "h4", "lih", "h2o", "maxcut", "barren-plateau"] {
            let parsed = RunConfig::from_yaml_str(&format!("problem:\n  kind: {name}\n")).unwrap();
            assert_eq!(ProblemConfig::from_name(name).unwrap(), parsed.problem);
        }
        for name in ["qng2", "qng", "adam", "gradient-descent"] {
            let parsed =
                RunConfig::from_yaml_str(&format!("optimizer:\n  kind: {name}\n")).unwrap();
            assert_eq!(OptimizerConfig::from_name(name).unwrap(), parsed.optimizer);
        }
        assert!(ProblemConfig::from_name("h3").is_err());
        assert!(OptimizerConfig::from_name("lbfgs").is_err());
    }

    #[test]
    fn test_problem_setters() {
        let mut problem = ProblemConfig::from_name("lih").unwrap();
        problem.set_num_layers(3);
        problem.set_distance(2.5).unwrap();
        problem.set_entangler(Entangler::Strong).unwrap();
        assert_eq!(
            problem,
            ProblemConfig::Lih {
                num_layers: 3,
                distance: 2.5,
                entangler: Entangler::Strong
            }
        );

        let mut h2 = ProblemConfig::default();
        assert!(h2.set_entangler(Entangler::Basic).is_ok());
        assert!(h2.set_entangler(Entangler::Strong).is_err());

        let mut maxcut = ProblemConfig::from_name("maxcut").unwrap();
        assert!(maxcut.set_distance(1.0).is_err());
    }

    #[test]
    fn test_builds_default_problem() {
        let example = RunConfig::default().build_example().unwrap();
        assert_eq!(example.circuit.num_qubits(), 4);
    }
}
