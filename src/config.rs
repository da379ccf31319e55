//! Run configuration.
//!
//! Values come from three layers, highest precedence first: command line
//! flags, an optional TOML file, built-in defaults.

use crate::cli::args::CheckArgs;
use crate::error::ValidateError;
use crate::tolerances::{
    BARREL_TOLERANCE_CM, ENDCAP_TOLERANCE_CM, GEOMETRY_UNIT_SCALE, MIN_HITS_PER_EVENT,
};
use crate::CheckCategory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the position checks decide whether a layer is within tolerance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BoundPolicy {
    /// Compare only the smallest and largest position in each layer
    #[default]
    Extremal,
    /// Compare every hit and count the ones outside the window
    PerHit,
}

/// Acceptance thresholds the checks compare against.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Every event must have strictly more hits than this
    pub min_hits_per_event: i64,
    pub barrel_tolerance_cm: f64,
    pub endcap_tolerance_cm: f64,
    pub bound_policy: BoundPolicy,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            min_hits_per_event: MIN_HITS_PER_EVENT,
            barrel_tolerance_cm: BARREL_TOLERANCE_CM,
            endcap_tolerance_cm: ENDCAP_TOLERANCE_CM,
            bound_policy: BoundPolicy::Extremal,
        }
    }
}

/// Optional TOML configuration file. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub barrel_geometry: Option<PathBuf>,
    pub endcap_geometry: Option<PathBuf>,
    pub delimiter: Option<char>,
    pub bound_policy: Option<BoundPolicy>,
    pub min_hits_per_event: Option<i64>,
    pub barrel_tolerance_cm: Option<f64>,
    pub endcap_tolerance_cm: Option<f64>,
    pub geometry_unit_scale: Option<f64>,
    pub parallel: Option<bool>,
    pub fail_fast: Option<bool>,
}

impl FileConfig {
    /// Load and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ValidateError> {
        let content = std::fs::read_to_string(path).map_err(|source| ValidateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&path.display().to_string(), &content)
    }

    pub fn parse(source: &str, content: &str) -> Result<Self, ValidateError> {
        let config: FileConfig = toml::from_str(content).map_err(|e| ValidateError::Config {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        config.validate(source)?;
        Ok(config)
    }

    fn validate(&self, source: &str) -> Result<(), ValidateError> {
        let invalid = |message: &str| ValidateError::Config {
            path: source.to_string(),
            message: message.to_string(),
        };
        for (name, value) in [
            ("barrel_tolerance_cm", self.barrel_tolerance_cm),
            ("endcap_tolerance_cm", self.endcap_tolerance_cm),
            ("geometry_unit_scale", self.geometry_unit_scale),
        ] {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(invalid(&format!("{} must be a positive number", name)));
                }
            }
        }
        if matches!(self.delimiter, Some('"') | Some('\n') | Some('\r')) {
            return Err(invalid("delimiter cannot be a quote or line break"));
        }
        Ok(())
    }
}

/// Configuration for one validation session.
#[derive(Debug, Clone)]
pub struct ValidateConfig {
    /// Hit table to validate
    pub dataset: PathBuf,
    /// Barrel layer table; `None` uses the built-in table
    pub barrel_geometry: Option<PathBuf>,
    /// Endcap disk table; `None` uses the built-in table
    pub endcap_geometry: Option<PathBuf>,
    /// Cell delimiter of the hit table
    pub delimiter: char,
    /// Multiplier converting geometry lengths to cm
    pub geometry_unit_scale: f64,
    pub thresholds: Thresholds,
    /// Categories to run (None = all)
    pub categories: Option<Vec<CheckCategory>>,
    /// Specific checks to run (by ID)
    pub only_checks: Vec<String>,
    /// Specific checks to skip (by ID)
    pub skip_checks: Vec<String>,
    /// Run checks in parallel
    pub parallel: bool,
    /// Stop on first failure
    pub fail_fast: bool,
    pub max_parallel: usize,
}

impl ValidateConfig {
    /// Defaults for validating `dataset`.
    pub fn new(dataset: impl Into<PathBuf>) -> Self {
        ValidateConfig {
            dataset: dataset.into(),
            barrel_geometry: None,
            endcap_geometry: None,
            delimiter: ',',
            geometry_unit_scale: GEOMETRY_UNIT_SCALE,
            thresholds: Thresholds::default(),
            categories: None,
            only_checks: Vec::new(),
            skip_checks: Vec::new(),
            parallel: false,
            fail_fast: false,
            max_parallel: 4,
        }
    }

    /// Overlay values from a config file.
    pub fn apply_file(&mut self, file: &FileConfig) {
        if file.barrel_geometry.is_some() {
            self.barrel_geometry = file.barrel_geometry.clone();
        }
        if file.endcap_geometry.is_some() {
            self.endcap_geometry = file.endcap_geometry.clone();
        }
        if let Some(delimiter) = file.delimiter {
            self.delimiter = delimiter;
        }
        if let Some(scale) = file.geometry_unit_scale {
            self.geometry_unit_scale = scale;
        }
        if let Some(policy) = file.bound_policy {
            self.thresholds.bound_policy = policy;
        }
        if let Some(min) = file.min_hits_per_event {
            self.thresholds.min_hits_per_event = min;
        }
        if let Some(tol) = file.barrel_tolerance_cm {
            self.thresholds.barrel_tolerance_cm = tol;
        }
        if let Some(tol) = file.endcap_tolerance_cm {
            self.thresholds.endcap_tolerance_cm = tol;
        }
        if let Some(parallel) = file.parallel {
            self.parallel = parallel;
        }
        if let Some(fail_fast) = file.fail_fast {
            self.fail_fast = fail_fast;
        }
    }

    /// Build configuration from command line arguments, reading the config
    /// file they name.
    pub fn from_args(args: &CheckArgs) -> Result<Self, ValidateError> {
        let mut config = ValidateConfig::new(&args.dataset);

        if let Some(ref path) = args.config {
            let file = FileConfig::load(path)?;
            debug!(path = %path.display(), "config file loaded");
            config.apply_file(&file);
        }

        if args.barrel.is_some() {
            config.barrel_geometry = args.barrel.clone();
        }
        if args.endcap.is_some() {
            config.endcap_geometry = args.endcap.clone();
        }
        if let Some(delimiter) = args.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(policy) = args.bound_policy {
            config.thresholds.bound_policy = policy;
        }
        if let Some(min) = args.min_hits {
            config.thresholds.min_hits_per_event = min;
        }
        if !args.category.is_empty() {
            config.categories = Some(args.category.clone());
        }
        config.only_checks = args.only.clone();
        config.skip_checks = args.skip.clone();
        config.parallel |= args.parallel;
        config.fail_fast |= args.fail_fast;

        Ok(config)
    }
}
