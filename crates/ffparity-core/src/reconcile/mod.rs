//! Drives one candidate/reference report pair through every molecule.

use crate::domain::{
    Category, Diagnostic, MoleculeOutcome, ParityError, ParityResult, ReportSource, UnitOutcome,
};
use crate::energy::{ReferenceSummary, compare_energy, read_total, scan_reference_summary};
use crate::extract::{ScanError, Section, extract_section};
use crate::matcher::{MatchResult, match_records};
use crate::numerics::ToleranceConfig;
use crate::records::layout::MOLECULE_BOUNDARY_MARKER;
use crate::scanner::LineCursor;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileRequest {
    /// Names in report order. Only every `stride`-th one is checked.
    pub molecules: Vec<String>,
    pub stride: usize,
    /// Line after which the candidate's molecule records begin.
    pub banner: Option<String>,
    pub check_energy: bool,
    pub tolerance: ToleranceConfig,
    pub candidate_label: String,
    pub reference_label: String,
}

impl ReconcileRequest {
    pub fn new(
        molecules: Vec<String>,
        candidate_label: impl Into<String>,
        reference_label: impl Into<String>,
    ) -> Self {
        Self {
            molecules,
            stride: 1,
            banner: None,
            check_energy: true,
            tolerance: ToleranceConfig::default(),
            candidate_label: candidate_label.into(),
            reference_label: reference_label.into(),
        }
    }

    pub fn selected_molecules(&self) -> impl Iterator<Item = &str> {
        self.molecules
            .iter()
            .step_by(self.stride.max(1))
            .map(String::as_str)
    }

    /// The listed name following the `index`-th selected one. It ends the
    /// candidate block of the selected molecule, whether or not it is checked.
    fn name_after(&self, index: usize) -> Option<&str> {
        self.molecules
            .get(index * self.stride.max(1) + 1)
            .map(String::as_str)
    }

    fn label(&self, report: ReportSource) -> &str {
        match report {
            ReportSource::Candidate => &self.candidate_label,
            ReportSource::Reference => &self.reference_label,
        }
    }
}

/// Opens both reports and reconciles them. Only failing to open a file is
/// an error; everything found inside the reports lands in the outcome.
pub fn reconcile_files(
    candidate_path: &Path,
    reference_path: &Path,
    request: &ReconcileRequest,
) -> ParityResult<UnitOutcome> {
    let mut candidate = open_report(candidate_path, ReportSource::Candidate)?;
    let mut reference = open_report(reference_path, ReportSource::Reference)?;
    Ok(reconcile_reports(&mut candidate, &mut reference, request))
}

fn open_report(path: &Path, source: ReportSource) -> ParityResult<LineCursor<BufReader<File>>> {
    let file = File::open(path).map_err(|error| {
        ParityError::io_system(
            "IO.REPORT_OPEN",
            format!(
                "failed to open {} report '{}': {}",
                source,
                path.display(),
                error
            ),
        )
    })?;
    Ok(LineCursor::new(BufReader::new(file)))
}

pub fn reconcile_reports<C, F>(
    candidate: &mut LineCursor<C>,
    reference: &mut LineCursor<F>,
    request: &ReconcileRequest,
) -> UnitOutcome
where
    C: BufRead + Seek,
    F: BufRead + Seek,
{
    let mut outcome = UnitOutcome::default();
    let selected: Vec<&str> = request.selected_molecules().collect();
    outcome.unchecked_molecules = request.molecules.len() - selected.len();

    if let Some(banner) = request.banner.as_deref() {
        match candidate.skip_past(banner) {
            Ok(true) => {}
            Ok(false) => warn!(
                report = %request.candidate_label,
                banner,
                "banner not found, scanning from the current position"
            ),
            Err(error) => {
                outcome.aborted = Some(read_failure(request, ReportSource::Candidate, &error));
                outcome.unchecked_molecules = request.molecules.len();
                return outcome;
            }
        }
    }

    for (index, name) in selected.iter().enumerate() {
        let mut context = MoleculeContext {
            candidate: &mut *candidate,
            reference: &mut *reference,
            request,
            next_name: request.name_after(index),
            outcome: MoleculeOutcome::new(*name),
        };
        let abort = context.run();
        let molecule = context.outcome;
        debug!(molecule = %molecule.name, passed = molecule.passed, "checked molecule");
        outcome.molecules.push(molecule);

        if let Some(diagnostic) = abort {
            warn!(%diagnostic, "aborting report pair");
            outcome.aborted = Some(diagnostic);
            outcome.unchecked_molecules += selected.len() - index - 1;
            break;
        }
    }

    info!(
        candidate = %request.candidate_label,
        passed = outcome.passed_count(),
        failed = outcome.failed_count(),
        aborted = outcome.aborted.is_some(),
        "reconciled report pair"
    );
    outcome
}

fn read_failure(request: &ReconcileRequest, report: ReportSource, error: &io::Error) -> Diagnostic {
    Diagnostic::CorruptInput {
        report: request.label(report).to_string(),
        category: None,
        detail: format!("read failure: {}", error),
    }
}

/// Per-molecule state: both cursors plus the outcome being built.
struct MoleculeContext<'a, C, F> {
    candidate: &'a mut LineCursor<C>,
    reference: &'a mut LineCursor<F>,
    request: &'a ReconcileRequest,
    next_name: Option<&'a str>,
    outcome: MoleculeOutcome,
}

impl<C, F> MoleculeContext<'_, C, F>
where
    C: BufRead + Seek,
    F: BufRead + Seek,
{
    /// Returns the diagnostic that ends the report pair, if any. It is also
    /// recorded on the molecule.
    fn run(&mut self) -> Option<Diagnostic> {
        let abort = match self.locate() {
            Ok(summary) => self
                .compare(&summary)
                .err()
                .map(|error| {
                    let label = self.request.label(error.report()).to_string();
                    error.into_diagnostic(&label)
                }),
            Err(diagnostic) => Some(diagnostic),
        };
        if let Some(diagnostic) = &abort {
            self.outcome.record(diagnostic.clone());
        }
        abort
    }

    /// Positions both reports at the molecule, fences each cursor to the
    /// molecule's block and summarizes the reference block.
    ///
    /// The candidate block ends where the next listed molecule starts; the
    /// reference block ends at its boundary line.
    fn locate(&mut self) -> Result<ReferenceSummary, Diagnostic> {
        let request = self.request;
        let name = self.outcome.name.as_str();
        let candidate_error =
            |error: io::Error| read_failure(request, ReportSource::Candidate, &error);
        let reference_error =
            |error: io::Error| read_failure(request, ReportSource::Reference, &error);

        self.candidate.set_limit(None);
        if !self.candidate.skip_past(name).map_err(candidate_error)? {
            return Err(Diagnostic::MoleculeNotFound {
                report: request.candidate_label.clone(),
                molecule: name.to_string(),
            });
        }
        let candidate_end = match self.next_name {
            Some(next) => self.candidate.locate(next).map_err(candidate_error)?,
            None => None,
        };
        self.candidate.set_limit(candidate_end);

        self.reference.set_limit(None);
        if !self.reference.skip_past(name).map_err(reference_error)? {
            return Err(Diagnostic::MoleculeNotFound {
                report: request.reference_label.clone(),
                molecule: name.to_string(),
            });
        }
        let reference_end = self
            .reference
            .locate(MOLECULE_BOUNDARY_MARKER)
            .map_err(reference_error)?;
        self.reference.set_limit(reference_end);

        scan_reference_summary(self.reference).map_err(reference_error)
    }

    fn compare(&mut self, summary: &ReferenceSummary) -> Result<(), ScanError> {
        for category in Category::RECORD_SECTIONS {
            if summary.has_section(category) {
                self.compare_section(category)?;
            }
        }
        self.compare_nonbonded(summary)
    }

    fn compare_section(&mut self, category: Category) -> Result<(), ScanError> {
        let candidate = extract_section(self.candidate, category, ReportSource::Candidate)?;
        let candidate_total = read_total(self.candidate, category, ReportSource::Candidate)?;
        let reference = extract_section(self.reference, category, ReportSource::Reference)?;
        let reference_total = read_total(self.reference, category, ReportSource::Reference)?;

        let Section {
            records: candidate_records,
            start: candidate_start,
        } = candidate;
        let Section {
            records: reference_records,
            start: reference_start,
        } = reference;

        match match_records(
            category,
            candidate_records,
            reference_records,
            self.request.tolerance.force_constant,
        ) {
            MatchResult::Matched => {}
            MatchResult::CountMismatch { expected, found } => {
                self.outcome.record(Diagnostic::StructuralMismatch {
                    category,
                    expected,
                    found,
                });
            }
            MatchResult::FieldMismatches(pairs) => {
                for (found, expected) in pairs {
                    let found_line = self
                        .candidate
                        .line_at(candidate_start, found.source_line)
                        .map_err(|error| ScanError::Io {
                            report: ReportSource::Candidate,
                            category,
                            source: error,
                        })?;
                    let expected_line = self
                        .reference
                        .line_at(reference_start, expected.source_line)
                        .map_err(|error| ScanError::Io {
                            report: ReportSource::Reference,
                            category,
                            source: error,
                        })?;
                    self.outcome.record(Diagnostic::FieldMismatch {
                        category,
                        expected_line,
                        found_line,
                    });
                }
            }
        }

        self.check_energy(category, candidate_total, reference_total);
        Ok(())
    }

    /// Van der Waals and electrostatic totals are required for every
    /// molecule, whatever sections the reference lists.
    fn compare_nonbonded(&mut self, summary: &ReferenceSummary) -> Result<(), ScanError> {
        let mut totals = Vec::with_capacity(2);
        for category in [Category::VanDerWaals, Category::Electrostatic] {
            let candidate = read_total(self.candidate, category, ReportSource::Candidate)?;
            let reference = summary
                .total(category)
                .map_err(|reason| ScanError::corrupt(ReportSource::Reference, category, reason))?;
            totals.push((category, candidate, reference));
        }
        for (category, candidate, reference) in totals {
            self.check_energy(category, candidate, reference);
        }
        Ok(())
    }

    fn check_energy(&mut self, category: Category, candidate: f64, reference: f64) {
        if !self.request.check_energy {
            return;
        }
        if let Some(diagnostic) =
            compare_energy(category, candidate, reference, self.request.tolerance.energy)
        {
            self.outcome.record(diagnostic);
        }
    }
}
