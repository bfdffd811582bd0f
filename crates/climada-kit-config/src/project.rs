//! Project settings shared with every workflow.
//!
//! Workflows never read a mutable settings object. They receive these values
//! as environment variables on their own process (see [`ProjectSettings::env_vars`]).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Climate scenario defaults used by the scenario workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSettings {
  pub rcps: Vec<String>,
  pub ssps: Vec<String>,
  pub years: Vec<u32>,
}

impl Default for ScenarioSettings {
  fn default() -> Self {
    Self {
      rcps: ["RCP2.6", "RCP4.5", "RCP6.0", "RCP8.5"]
        .into_iter()
        .map(String::from)
        .collect(),
      ssps: ["SSP1", "SSP2", "SSP3", "SSP4", "SSP5"]
        .into_iter()
        .map(String::from)
        .collect(),
      years: vec![2030, 2050, 2100],
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
  /// Project root. Every other relative path resolves against it.
  pub root: PathBuf,
  pub data_dir: PathBuf,
  pub output_dir: PathBuf,
  pub results_dir: PathBuf,
  pub figures_dir: PathBuf,
  pub reference_year: u32,
  pub value_unit: String,
  /// ISO 3166 alpha-3 codes.
  pub example_countries: Vec<String>,
  pub scenarios: ScenarioSettings,
  /// Create the output directories before the first workflow runs.
  pub create_output_dirs: bool,
  /// Extra variables exported to every workflow.
  pub env: BTreeMap<String, String>,
}

impl Default for ProjectSettings {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      data_dir: PathBuf::from("data"),
      output_dir: PathBuf::from("outputs"),
      results_dir: PathBuf::from("outputs/results"),
      figures_dir: PathBuf::from("outputs/figures"),
      reference_year: 2024,
      value_unit: "USD".to_string(),
      example_countries: ["CHE", "AUT", "DEU"]
        .into_iter()
        .map(String::from)
        .collect(),
      scenarios: ScenarioSettings::default(),
      create_output_dirs: false,
      env: BTreeMap::new(),
    }
  }
}

impl ProjectSettings {
  /// Resolve a project-relative path. Absolute paths are returned unchanged.
  pub fn resolve(&self, path: &Path) -> PathBuf {
    self.root.join(path)
  }

  /// Variables exported to each workflow process, in a stable order.
  pub fn env_vars(&self) -> Vec<(String, String)> {
    let years: Vec<String> = self.scenarios.years.iter().map(u32::to_string).collect();

    let mut vars = vec![
      ("CLIMADA_KIT_PROJECT_ROOT", self.root.display().to_string()),
      ("CLIMADA_KIT_DATA_DIR", self.resolved_display(&self.data_dir)),
      ("CLIMADA_KIT_OUTPUT_DIR", self.resolved_display(&self.output_dir)),
      ("CLIMADA_KIT_RESULTS_DIR", self.resolved_display(&self.results_dir)),
      ("CLIMADA_KIT_FIGURES_DIR", self.resolved_display(&self.figures_dir)),
      ("CLIMADA_KIT_REFERENCE_YEAR", self.reference_year.to_string()),
      ("CLIMADA_KIT_VALUE_UNIT", self.value_unit.clone()),
      ("CLIMADA_KIT_EXAMPLE_COUNTRIES", self.example_countries.join(",")),
      ("CLIMADA_KIT_RCPS", self.scenarios.rcps.join(",")),
      ("CLIMADA_KIT_SSPS", self.scenarios.ssps.join(",")),
      ("CLIMADA_KIT_SCENARIO_YEARS", years.join(",")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect::<Vec<_>>();

    vars.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    vars
  }

  fn resolved_display(&self, path: &Path) -> String {
    self.resolve(path).display().to_string()
  }

  /// Create the output, results and figures directories.
  pub fn ensure_output_dirs(&self) -> Result<(), ConfigError> {
    for dir in [&self.output_dir, &self.results_dir, &self.figures_dir] {
      let path = self.resolve(dir);
      std::fs::create_dir_all(&path).map_err(|source| ConfigError::CreateDir { path, source })?;
    }
    Ok(())
  }
}
