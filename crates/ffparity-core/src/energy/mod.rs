//! Per-category energy totals and the reference molecule summary.

use crate::domain::{Category, Diagnostic, ReportSource};
use crate::extract::{CorruptReason, ScanError};
use crate::numerics::within_abs_tolerance;
use crate::records::layout::{MOLECULE_BOUNDARY_MARKER, TotalLine, section_layout};
use crate::scanner::{LineCursor, SEPARATOR_MARKER};
use std::collections::BTreeSet;
use std::io::{self, BufRead, Seek};

pub fn parse_total(line: &str, token: usize) -> Option<f64> {
    line.split_whitespace()
        .nth(token)
        .and_then(|value| value.parse::<f64>().ok())
}

fn total_from_line(line: &str, total: TotalLine) -> Result<f64, CorruptReason> {
    parse_total(line, total.token).ok_or(CorruptReason::MalformedTotal {
        marker: total.marker,
        token: total.token,
    })
}

/// Reads the next total line of `category` from a report positioned after
/// the category's rows.
///
/// Energy-only categories have no rows on the candidate side, so their header
/// and separator are located first. Reference summary values come from
/// [`ReferenceSummary`] instead.
pub fn read_total<R: BufRead + Seek>(
    cursor: &mut LineCursor<R>,
    category: Category,
    source: ReportSource,
) -> Result<f64, ScanError> {
    let layout = section_layout(category, source);
    let io_error = |error: io::Error| ScanError::Io {
        report: source,
        category,
        source: error,
    };

    if layout.columns.is_none() && source == ReportSource::Candidate {
        if !cursor.skip_past(layout.header).map_err(io_error)? {
            return Err(ScanError::corrupt(
                source,
                category,
                CorruptReason::MissingHeader(layout.header),
            ));
        }
        if !cursor.skip_past(SEPARATOR_MARKER).map_err(io_error)? {
            return Err(ScanError::corrupt(
                source,
                category,
                CorruptReason::MissingSeparator,
            ));
        }
    }

    let line = cursor
        .find(layout.total.marker)
        .map_err(io_error)?
        .ok_or_else(|| {
            ScanError::corrupt(
                source,
                category,
                CorruptReason::MissingTotal(layout.total.marker),
            )
        })?;
    total_from_line(&line, layout.total)
        .map_err(|reason| ScanError::corrupt(source, category, reason))
}

pub fn compare_energy(
    category: Category,
    candidate: f64,
    reference: f64,
    tolerance: f64,
) -> Option<Diagnostic> {
    if within_abs_tolerance(candidate, reference, tolerance) {
        None
    } else {
        Some(Diagnostic::EnergyMismatch {
            category,
            expected: reference,
            found: candidate,
        })
    }
}

/// What one reference molecule block contains, gathered before any section
/// is compared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSummary {
    sections: BTreeSet<Category>,
    van_der_waals: Option<String>,
    electrostatic: Option<String>,
}

impl ReferenceSummary {
    pub fn has_section(&self, category: Category) -> bool {
        self.sections.contains(&category)
    }

    /// Summary value for van der Waals or electrostatic.
    pub fn total(&self, category: Category) -> Result<f64, CorruptReason> {
        let total = section_layout(category, ReportSource::Reference).total;
        let line = match category {
            Category::VanDerWaals => self.van_der_waals.as_deref(),
            Category::Electrostatic => self.electrostatic.as_deref(),
            _ => None,
        }
        .ok_or(CorruptReason::MissingTotal(total.marker))?;
        total_from_line(line, total)
    }
}

/// Scans the reference from the current position to the molecule boundary
/// (or end of stream) and restores the position afterwards. The first
/// occurrence of each marker wins.
pub fn scan_reference_summary<R: BufRead + Seek>(
    cursor: &mut LineCursor<R>,
) -> io::Result<ReferenceSummary> {
    let start = cursor.position()?;
    let vdw_marker = section_layout(Category::VanDerWaals, ReportSource::Reference)
        .total
        .marker;
    let ele_marker = section_layout(Category::Electrostatic, ReportSource::Reference)
        .total
        .marker;

    let mut summary = ReferenceSummary::default();
    while let Some(line) = cursor.next_line()? {
        if line.contains(MOLECULE_BOUNDARY_MARKER) {
            break;
        }
        if summary.van_der_waals.is_none() && line.contains(vdw_marker) {
            summary.van_der_waals = Some(line.clone());
        }
        if summary.electrostatic.is_none() && line.contains(ele_marker) {
            summary.electrostatic = Some(line.clone());
        }
        for category in Category::RECORD_SECTIONS {
            if line.contains(section_layout(category, ReportSource::Reference).header) {
                summary.sections.insert(category);
            }
        }
    }

    cursor.seek(start)?;
    Ok(summary)
}
