use crate::domain::{Diagnostic, MoleculeOutcome, ParityError, ParityResult, UnitOutcome};
use crate::numerics::ToleranceConfig;
use crate::reconcile::{ReconcileRequest, reconcile_files};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

pub const DEFAULT_STRIDE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ForceFieldVariant {
    #[serde(rename = "MMFF94")]
    Mmff94,
    #[serde(rename = "MMFF94s")]
    Mmff94s,
}

impl ForceFieldVariant {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mmff94 => "MMFF94",
            Self::Mmff94s => "MMFF94s",
        }
    }
}

impl Display for ForceFieldVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for ForceFieldVariant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "MMFF94" => Ok(Self::Mmff94),
            "MMFF94s" => Ok(Self::Mmff94s),
            other => Err(format!(
                "unknown force-field variant '{}' (expected MMFF94 or MMFF94s)",
                other
            )),
        }
    }
}

/// How the candidate molecules were supplied. Only 3-D structure files carry
/// the fixed geometry that makes energies reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoleculeFormat {
    Sdf,
    Smi,
}

impl MoleculeFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sdf => "sdf",
            Self::Smi => "smi",
        }
    }

    pub const fn has_fixed_geometry(self) -> bool {
        matches!(self, Self::Sdf)
    }
}

impl Display for MoleculeFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for MoleculeFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sdf" => Ok(Self::Sdf),
            "smi" => Ok(Self::Smi),
            other => Err(format!(
                "unknown molecule format '{}' (expected sdf or smi)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchRunnerConfig {
    pub manifest_path: PathBuf,
    pub variant: Option<ForceFieldVariant>,
    pub format: Option<MoleculeFormat>,
    /// Every variant, every molecule.
    pub full: bool,
    /// Replaces the candidate log of the single selected unit.
    pub candidate_log: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchRunReport {
    pub generated_at_unix_seconds: u64,
    pub passed: bool,
    pub manifest_path: String,
    pub full: bool,
    pub stride: usize,
    pub tolerance: ToleranceConfig,
    pub unit_count: usize,
    pub passed_unit_count: usize,
    pub failed_unit_count: usize,
    pub molecule_count: usize,
    pub passed_molecule_count: usize,
    pub failed_molecule_count: usize,
    pub units: Vec<UnitReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub unit_id: String,
    pub variant: Option<ForceFieldVariant>,
    pub format: Option<MoleculeFormat>,
    pub candidate_log: String,
    pub reference_log: String,
    pub check_energy: bool,
    pub passed: bool,
    pub molecule_count: usize,
    pub passed_molecule_count: usize,
    pub failed_molecule_count: usize,
    pub unchecked_molecule_count: usize,
    pub aborted: Option<Diagnostic>,
    pub failures: Vec<MoleculeOutcome>,
}

impl UnitReport {
    pub fn from_outcome(
        unit_id: impl Into<String>,
        candidate_log: &Path,
        reference_log: &Path,
        request: &ReconcileRequest,
        outcome: UnitOutcome,
    ) -> Self {
        let passed = outcome.passed();
        let passed_molecule_count = outcome.passed_count();
        let failed_molecule_count = outcome.failed_count();
        let molecule_count = outcome.molecules.len();
        let UnitOutcome {
            molecules,
            aborted,
            unchecked_molecules,
        } = outcome;

        Self {
            unit_id: unit_id.into(),
            variant: None,
            format: None,
            candidate_log: normalize_path(candidate_log),
            reference_log: normalize_path(reference_log),
            check_energy: request.check_energy,
            passed,
            molecule_count,
            passed_molecule_count,
            failed_molecule_count,
            unchecked_molecule_count: unchecked_molecules,
            aborted,
            failures: molecules
                .into_iter()
                .filter(|molecule| !molecule.passed)
                .collect(),
        }
    }
}

pub fn run_batch(config: &BatchRunnerConfig) -> ParityResult<BatchRunReport> {
    let manifest = load_manifest(&config.manifest_path).map_err(ParityError::from)?;
    let manifest_dir = config
        .manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let selected = select_units(&manifest, config);
    if selected.is_empty() {
        return Err(BatchError::NoUnitsSelected {
            path: config.manifest_path.clone(),
        }
        .into());
    }
    if config.candidate_log.is_some() && selected.len() > 1 {
        return Err(BatchError::AmbiguousCandidateLog {
            unit_count: selected.len(),
        }
        .into());
    }

    let stride = if config.full { 1 } else { manifest.stride };
    let mut unit_reports = Vec::with_capacity(selected.len());
    for unit in selected {
        let candidate_log = config
            .candidate_log
            .clone()
            .unwrap_or_else(|| resolve_path(&manifest_dir, &unit.candidate_log));
        let reference_log = resolve_path(&manifest_dir, &unit.reference_log);

        let mut request = ReconcileRequest::new(
            unit_molecules(&manifest_dir, unit).map_err(ParityError::from)?,
            normalize_path(&candidate_log),
            normalize_path(&reference_log),
        );
        request.stride = stride;
        request.banner = unit.banner.clone();
        request.check_energy = unit
            .check_energy
            .unwrap_or(unit.format.has_fixed_geometry());
        request.tolerance = manifest.tolerance;

        info!(
            unit = %unit.id,
            variant = %unit.variant,
            format = %unit.format,
            molecules = request.molecules.len(),
            stride,
            "checking unit"
        );
        let outcome = reconcile_files(&candidate_log, &reference_log, &request)?;
        let mut report =
            UnitReport::from_outcome(&unit.id, &candidate_log, &reference_log, &request, outcome);
        report.variant = Some(unit.variant);
        report.format = Some(unit.format);
        unit_reports.push(report);
    }

    let unit_count = unit_reports.len();
    let passed_unit_count = unit_reports.iter().filter(|unit| unit.passed).count();
    let molecule_count = unit_reports
        .iter()
        .map(|unit| unit.molecule_count)
        .sum::<usize>();
    let passed_molecule_count = unit_reports
        .iter()
        .map(|unit| unit.passed_molecule_count)
        .sum::<usize>();

    let report = BatchRunReport {
        generated_at_unix_seconds: current_unix_timestamp_seconds(),
        passed: passed_unit_count == unit_count,
        manifest_path: normalize_path(&config.manifest_path),
        full: config.full,
        stride,
        tolerance: manifest.tolerance,
        unit_count,
        passed_unit_count,
        failed_unit_count: unit_count.saturating_sub(passed_unit_count),
        molecule_count,
        passed_molecule_count,
        failed_molecule_count: molecule_count.saturating_sub(passed_molecule_count),
        units: unit_reports,
    };

    if let Some(report_path) = &config.report_path {
        write_json_report(report_path, &report).map_err(ParityError::from)?;
    }
    Ok(report)
}

/// "All N tests passed", or "N tests passed" followed by "M tests failed".
pub fn render_counts(passed: usize, failed: usize) -> Vec<String> {
    if failed == 0 {
        vec![format!("All {}", count_line(passed, "passed"))]
    } else {
        vec![count_line(passed, "passed"), count_line(failed, "failed")]
    }
}

fn count_line(count: usize, verdict: &str) -> String {
    let noun = if count == 1 { "test" } else { "tests" };
    format!("{} {} {}", count, noun, verdict)
}

/// An aborted unit still reports what was checked before the abort.
pub fn render_unit_summary(unit: &UnitReport) -> String {
    let mut lines = vec![format!(
        "Checking {} against {}...",
        unit.candidate_log, unit.reference_log
    )];
    for molecule in &unit.failures {
        lines.push(molecule.render());
    }
    match &unit.aborted {
        Some(diagnostic) => {
            lines.push(count_line(unit.passed_molecule_count, "passed"));
            lines.push(count_line(unit.failed_molecule_count, "failed"));
            lines.push(format!(
                "Aborted: {} ({} not checked)",
                diagnostic, unit.unchecked_molecule_count
            ));
        }
        None => lines.extend(render_counts(
            unit.passed_molecule_count,
            unit.failed_molecule_count,
        )),
    }
    lines.join("\n")
}

pub fn render_human_summary(report: &BatchRunReport) -> String {
    let mut lines = Vec::new();
    for unit in &report.units {
        lines.push(render_unit_summary(unit));
    }
    let status = if report.passed { "PASS" } else { "FAIL" };
    lines.push(format!(
        "Batch status: {} ({}/{} units passed, {} molecules checked)",
        status, report.passed_unit_count, report.unit_count, report.molecule_count
    ));
    lines.join("\n")
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read manifest '{}': {source}", path.display())]
    ReadManifest {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse manifest '{}': {source}", path.display())]
    ParseManifest {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid manifest '{}': {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },
    #[error("no manifest unit in '{}' matches the selected variant and format", path.display())]
    NoUnitsSelected { path: PathBuf },
    #[error("a candidate log override needs exactly one selected unit, {unit_count} selected")]
    AmbiguousCandidateLog { unit_count: usize },
    #[error("failed to read molecule list '{}': {source}", path.display())]
    ReadMoleculeList {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create report directory '{}': {source}", path.display())]
    ReportDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize report '{}': {source}", path.display())]
    SerializeReport {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write report '{}': {source}", path.display())]
    WriteReport {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<BatchError> for ParityError {
    fn from(error: BatchError) -> Self {
        let message = error.to_string();
        match error {
            BatchError::ReadManifest { .. } => {
                ParityError::io_system("IO.BATCH_MANIFEST", message)
            }
            BatchError::ParseManifest { .. } | BatchError::InvalidManifest { .. } => {
                ParityError::input_validation("INPUT.BATCH_MANIFEST", message)
            }
            BatchError::NoUnitsSelected { .. } | BatchError::AmbiguousCandidateLog { .. } => {
                ParityError::input_validation("INPUT.BATCH_SELECTION", message)
            }
            BatchError::ReadMoleculeList { .. } => {
                ParityError::io_system("IO.MOLECULE_LIST", message)
            }
            BatchError::ReportDirectory { .. } | BatchError::WriteReport { .. } => {
                ParityError::io_system("IO.BATCH_REPORT", message)
            }
            BatchError::SerializeReport { .. } => {
                ParityError::internal("SYS.BATCH_REPORT", message)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct BatchManifest {
    #[serde(default)]
    tolerance: ToleranceConfig,
    #[serde(default = "default_stride")]
    stride: usize,
    #[serde(default)]
    units: Vec<ManifestUnit>,
}

#[derive(Debug, Deserialize)]
struct ManifestUnit {
    id: String,
    variant: ForceFieldVariant,
    format: MoleculeFormat,
    #[serde(rename = "candidateLog")]
    candidate_log: PathBuf,
    #[serde(rename = "referenceLog")]
    reference_log: PathBuf,
    #[serde(default)]
    banner: Option<String>,
    #[serde(default)]
    molecules: Vec<String>,
    #[serde(rename = "moleculeList", default)]
    molecule_list: Option<PathBuf>,
    #[serde(rename = "checkEnergy", default)]
    check_energy: Option<bool>,
}

fn default_stride() -> usize {
    DEFAULT_STRIDE
}

fn load_manifest(manifest_path: &Path) -> Result<BatchManifest, BatchError> {
    let content = fs::read_to_string(manifest_path).map_err(|source| BatchError::ReadManifest {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    let manifest: BatchManifest =
        serde_json::from_str(&content).map_err(|source| BatchError::ParseManifest {
            path: manifest_path.to_path_buf(),
            source,
        })?;
    validate_manifest(&manifest).map_err(|message| BatchError::InvalidManifest {
        path: manifest_path.to_path_buf(),
        message,
    })?;
    Ok(manifest)
}

fn validate_manifest(manifest: &BatchManifest) -> Result<(), String> {
    manifest.tolerance.validate()?;
    if manifest.stride == 0 {
        return Err("stride must be at least 1".to_string());
    }

    let mut seen = BTreeSet::new();
    for unit in &manifest.units {
        if unit.id.trim().is_empty() {
            return Err("unit id must not be empty".to_string());
        }
        if !seen.insert(unit.id.as_str()) {
            return Err(format!("duplicate unit id '{}'", unit.id));
        }
        if unit.molecules.is_empty() && unit.molecule_list.is_none() {
            return Err(format!(
                "unit '{}' names no molecules (set 'molecules' or 'moleculeList')",
                unit.id
            ));
        }
    }
    Ok(())
}

fn select_units<'a>(
    manifest: &'a BatchManifest,
    config: &BatchRunnerConfig,
) -> Vec<&'a ManifestUnit> {
    manifest
        .units
        .iter()
        .filter(|unit| match config.variant {
            Some(variant) => unit.variant == variant,
            None => config.full || unit.variant == ForceFieldVariant::Mmff94,
        })
        .filter(|unit| config.format.is_none_or(|format| unit.format == format))
        .collect()
}

fn unit_molecules(manifest_dir: &Path, unit: &ManifestUnit) -> Result<Vec<String>, BatchError> {
    let mut names = unit.molecules.clone();
    if let Some(list) = &unit.molecule_list {
        let path = resolve_path(manifest_dir, list);
        let content = fs::read_to_string(&path).map_err(|source| BatchError::ReadMoleculeList {
            path: path.clone(),
            source,
        })?;
        names.extend(parse_molecule_list(&content));
        debug!(
            unit = %unit.id,
            list = %path.display(),
            names = names.len(),
            "loaded molecule list"
        );
    }
    Ok(names)
}

/// One name per line; blank lines and `#` comments are skipped.
pub fn parse_molecule_list(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn write_json_report<T: Serialize>(report_path: &Path, report: &T) -> Result<(), BatchError> {
    if let Some(parent_dir) = report_path.parent() {
        fs::create_dir_all(parent_dir).map_err(|source| BatchError::ReportDirectory {
            path: parent_dir.to_path_buf(),
            source,
        })?;
    }

    let report_json =
        serde_json::to_string_pretty(report).map_err(|source| BatchError::SerializeReport {
            path: report_path.to_path_buf(),
            source,
        })?;
    fs::write(report_path, report_json).map_err(|source| BatchError::WriteReport {
        path: report_path.to_path_buf(),
        source,
    })
}

fn current_unix_timestamp_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
