use super::CliError;
use ffparity_core::{ParityError, ParityErrorCategory};
use ffparity_core::batch::{
    BatchRunnerConfig, ForceFieldVariant, MoleculeFormat, UnitReport, normalize_path,
    parse_molecule_list, render_human_summary, render_unit_summary, run_batch, write_json_report,
};
use ffparity_core::numerics::{
    DEFAULT_ENERGY_TOLERANCE, DEFAULT_FORCE_CONSTANT_TOLERANCE, ToleranceConfig,
};
use ffparity_core::reconcile::{ReconcileRequest, reconcile_files};
use std::fs;
use std::path::PathBuf;

#[derive(clap::Args)]
#[command(group(
    clap::ArgGroup::new("molecule_names")
        .required(true)
        .multiple(true)
        .args(["molecule", "names"])
))]
pub(super) struct CheckArgs {
    /// Candidate energy report
    #[arg(long, value_name = "LOG")]
    candidate: PathBuf,

    /// Reference energy report
    #[arg(long, value_name = "LOG")]
    reference: PathBuf,

    /// Molecule to check, in report order (repeatable)
    #[arg(long, value_name = "NAME")]
    molecule: Vec<String>,

    /// File listing molecule names, one per line
    #[arg(long, value_name = "FILE")]
    names: Option<PathBuf>,

    /// Line after which the candidate's molecule records begin
    #[arg(long, value_name = "TEXT")]
    banner: Option<String>,

    /// Compare interaction parameters only, not energies
    #[arg(long)]
    no_energy: bool,

    /// Check only every N-th molecule
    #[arg(long, value_name = "N", default_value_t = 1)]
    stride: usize,

    /// Absolute tolerance for force constants
    #[arg(long, value_name = "F", default_value_t = DEFAULT_FORCE_CONSTANT_TOLERANCE)]
    force_constant_tolerance: f64,

    /// Absolute tolerance for energy totals
    #[arg(long, value_name = "F", default_value_t = DEFAULT_ENERGY_TOLERANCE)]
    energy_tolerance: f64,

    /// JSON report output path
    #[arg(long, value_name = "JSON")]
    report: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct BatchArgs {
    /// Batch manifest listing the report pairs
    #[arg(long, value_name = "JSON")]
    manifest: PathBuf,

    /// Only run units of this force-field variant (MMFF94 or MMFF94s)
    #[arg(short = 'f', long, value_name = "VARIANT")]
    variant: Option<ForceFieldVariant>,

    /// Only run units built from this molecule format (sdf or smi)
    #[arg(long, value_name = "FORMAT")]
    format: Option<MoleculeFormat>,

    /// Run every variant and check every molecule
    #[arg(short = 'L', long)]
    full: bool,

    /// Candidate report to use instead of the selected unit's own
    #[arg(short = 'l', long, value_name = "LOG")]
    candidate_log: Option<PathBuf>,

    /// JSON report output path
    #[arg(long, value_name = "JSON")]
    report: Option<PathBuf>,
}

impl CheckArgs {
    fn into_request(self) -> Result<(ReconcileRequest, CheckPaths), CliError> {
        if self.stride == 0 {
            return Err(CliError::Usage(
                "Invalid stride '0'; expected a positive integer.".to_string(),
            ));
        }
        let tolerance = ToleranceConfig {
            force_constant: self.force_constant_tolerance,
            energy: self.energy_tolerance,
        };
        tolerance.validate().map_err(CliError::Usage)?;

        let mut molecules = self.molecule;
        if let Some(names_path) = &self.names {
            let content = fs::read_to_string(names_path).map_err(|source| {
                CliError::Compute(ParityError::io_system(
                    "IO.MOLECULE_LIST",
                    format!(
                        "failed to read molecule list '{}': {}",
                        names_path.display(),
                        source
                    ),
                ))
            })?;
            molecules.extend(parse_molecule_list(&content));
        }

        let mut request = ReconcileRequest::new(
            molecules,
            normalize_path(&self.candidate),
            normalize_path(&self.reference),
        );
        request.stride = self.stride;
        request.banner = self.banner;
        request.check_energy = !self.no_energy;
        request.tolerance = tolerance;

        Ok((
            request,
            CheckPaths {
                candidate: self.candidate,
                reference: self.reference,
                report: self.report,
            },
        ))
    }
}

struct CheckPaths {
    candidate: PathBuf,
    reference: PathBuf,
    report: Option<PathBuf>,
}

impl BatchArgs {
    fn into_config(self) -> BatchRunnerConfig {
        BatchRunnerConfig {
            manifest_path: self.manifest,
            variant: self.variant,
            format: self.format,
            full: self.full,
            candidate_log: self.candidate_log,
            report_path: self.report,
        }
    }
}

pub(super) fn run_check_command(args: CheckArgs) -> Result<i32, CliError> {
    let (request, paths) = args.into_request()?;
    let outcome = reconcile_files(&paths.candidate, &paths.reference, &request)
        .map_err(CliError::Compute)?;
    let report = UnitReport::from_outcome(
        "check",
        &paths.candidate,
        &paths.reference,
        &request,
        outcome,
    );
    eprintln!("{}", render_unit_summary(&report));

    if let Some(report_path) = &paths.report {
        write_json_report(report_path, &report)
            .map_err(|error| CliError::Compute(error.into()))?;
        eprintln!("JSON report: {}", report_path.display());
    }

    Ok(ParityErrorCategory::from_verdict(report.passed).exit_code())
}

pub(super) fn run_batch_command(args: BatchArgs) -> Result<i32, CliError> {
    let config = args.into_config();
    let report = run_batch(&config).map_err(CliError::Compute)?;
    eprintln!("{}", render_human_summary(&report));
    if let Some(report_path) = &config.report_path {
        eprintln!("JSON report: {}", report_path.display());
    }

    Ok(ParityErrorCategory::from_verdict(report.passed).exit_code())
}
