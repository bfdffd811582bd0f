//! The workflow list for a run.
//!
//! A run uses one of three sources, in order of preference:
//!
//! 1. an explicit `workflows` list from the config file ([`from_defs`])
//! 2. directory discovery when enabled ([`discover`])
//! 3. the built-in kit catalog ([`builtin`])

use std::path::Path;

use climada_kit_config::WorkflowDef;
use tokio::fs;
use tracing::debug;

use crate::error::WorkflowError;
use crate::spec::WorkflowSpec;

/// Example workflows shipped with the kit, in run order.
pub const KIT_WORKFLOWS: &[&str] = &[
  "01_basic_risk_assessment.py",
  "02_exposure_integration.py",
  "03_hazard_integration.py",
  "04_cost_benefit_analysis.py",
  "05_scenario_development.py",
];

/// The built-in catalog rooted at `workflows_dir`.
pub fn builtin(workflows_dir: &Path) -> Vec<WorkflowSpec> {
  KIT_WORKFLOWS
    .iter()
    .enumerate()
    .map(|(i, file)| WorkflowSpec::from_path(workflows_dir.join(file), i + 1))
    .collect()
}

/// Specs for an explicit list of definitions.
pub fn from_defs(defs: &[WorkflowDef], workflows_dir: &Path) -> Vec<WorkflowSpec> {
  defs
    .iter()
    .enumerate()
    .map(|(i, def)| {
      let spec = WorkflowSpec::from_path(workflows_dir.join(&def.path), i + 1);
      match &def.name {
        Some(name) => WorkflowSpec { name: name.clone(), ..spec },
        None => spec,
      }
    })
    .collect()
}

/// List `*.{extension}` files in `dir`, sorted by file name.
///
/// A missing directory is an empty list, not an error.
pub async fn discover(dir: &Path, extension: &str) -> Result<Vec<WorkflowSpec>, WorkflowError> {
  let discovery_err = |source| WorkflowError::Discovery {
    dir: dir.to_path_buf(),
    source,
  };

  if !dir.exists() {
    debug!(dir = %dir.display(), "workflows directory does not exist");
    return Ok(Vec::new());
  }

  let mut entries = fs::read_dir(dir).await.map_err(discovery_err)?;
  let mut paths = Vec::new();

  while let Some(entry) = entries.next_entry().await.map_err(discovery_err)? {
    let path = entry.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
      paths.push(path);
    }
  }

  paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
  debug!(dir = %dir.display(), count = paths.len(), "discovered workflows");

  Ok(
    paths
      .into_iter()
      .enumerate()
      .map(|(i, path)| WorkflowSpec::from_path(path, i + 1))
      .collect(),
  )
}

fn name_matches(spec: &WorkflowSpec, name: &str) -> bool {
  spec.name == name
    || spec
      .path
      .file_stem()
      .is_some_and(|stem| stem.to_string_lossy() == name)
}

/// Keep only the named workflows. Declared order and `order` numbers are kept.
///
/// An empty `names` selects everything. Names match the spec name or the
/// script's file stem, so both `01_basic_risk_assessment.py` and
/// `01_basic_risk_assessment` work.
pub fn select(specs: Vec<WorkflowSpec>, names: &[String]) -> Result<Vec<WorkflowSpec>, WorkflowError> {
  if names.is_empty() {
    return Ok(specs);
  }

  if let Some(unknown) = names
    .iter()
    .find(|name| !specs.iter().any(|spec| name_matches(spec, name)))
  {
    return Err(WorkflowError::UnknownWorkflow {
      name: unknown.clone(),
    });
  }

  Ok(
    specs
      .into_iter()
      .filter(|spec| names.iter().any(|name| name_matches(spec, name)))
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  #[test]
  fn test_builtin_catalog_order() {
    let specs = builtin(Path::new("workflows"));
    assert_eq!(specs.len(), 5);
    assert_eq!(specs[0].name, "01_basic_risk_assessment.py");
    assert_eq!(specs[0].path, PathBuf::from("workflows/01_basic_risk_assessment.py"));
    assert_eq!(specs[4].order, 5);
    assert!(specs.windows(2).all(|w| w[0].order < w[1].order));
  }

  #[test]
  fn test_from_defs_names_and_paths() {
    let defs = vec![
      WorkflowDef {
        path: PathBuf::from("first.py"),
        name: None,
      },
      WorkflowDef {
        path: PathBuf::from("/abs/second.py"),
        name: Some("second".to_string()),
      },
    ];

    let specs = from_defs(&defs, Path::new("/kit/workflows"));
    assert_eq!(specs[0].name, "first.py");
    assert_eq!(specs[0].path, PathBuf::from("/kit/workflows/first.py"));
    assert_eq!(specs[1].name, "second");
    assert_eq!(specs[1].path, PathBuf::from("/abs/second.py"));
    assert_eq!(specs[1].order, 2);
  }

  #[test]
  fn test_select_keeps_declared_order() {
    let specs = builtin(Path::new("workflows"));
    let names = vec![
      "05_scenario_development".to_string(),
      "02_exposure_integration.py".to_string(),
    ];

    let selected = select(specs, &names).unwrap();
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0].order, 2);
    assert_eq!(selected[1].order, 5);
  }

  #[test]
  fn test_select_unknown_name() {
    let specs = builtin(Path::new("workflows"));
    let err = select(specs, &["99_missing".to_string()]).unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownWorkflow { name } if name == "99_missing"));
  }

  #[tokio::test]
  async fn test_discover_sorts_and_filters() {
    let temp = tempfile::tempdir().unwrap();
    for name in ["b_second.py", "a_first.py", "notes.txt"] {
      std::fs::write(temp.path().join(name), "").unwrap();
    }
    std::fs::create_dir(temp.path().join("c_dir.py")).unwrap();

    let specs = discover(temp.path(), "py").await.unwrap();
    let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["a_first.py", "b_second.py"]);
    assert_eq!(specs[1].order, 2);
  }

  #[tokio::test]
  async fn test_discover_missing_directory_is_empty() {
    let temp = tempfile::tempdir().unwrap();
    let specs = discover(&temp.path().join("nope"), "py").await.unwrap();
    assert!(specs.is_empty());
  }
}
