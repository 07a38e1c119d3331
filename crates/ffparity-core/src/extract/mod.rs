//! Section extraction: header, separator, then one record per row until the
//! first blank line.

use crate::domain::{Category, Diagnostic, ReportSource};
use crate::numerics::is_zero;
use crate::records::layout::{RecordColumns, section_layout};
use crate::records::{
    AngleBend, AtomType, BondStretch, Interaction, InteractionRecord, OopBend, StretchBend,
    Torsion,
};
use crate::scanner::{LineCursor, SEPARATOR_MARKER};
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Seek};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorruptReason {
    MissingHeader(&'static str),
    MissingSeparator,
    Unterminated,
    MalformedRow { row: usize, token: usize },
    MissingTotal(&'static str),
    MalformedTotal { marker: &'static str, token: usize },
    NoRecordColumns,
}

impl Display for CorruptReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader(header) => write!(f, "header '{}' not found", header),
            Self::MissingSeparator => f.write_str("separator line not found after header"),
            Self::Unterminated => f.write_str("section not terminated by a blank line"),
            Self::MalformedRow { row, token } => write!(
                f,
                "row {} has no valid value at token {}",
                row, token
            ),
            Self::MissingTotal(marker) => write!(f, "line '{}' not found", marker),
            Self::MalformedTotal { marker, token } => write!(
                f,
                "line '{}' has no numeric value at token {}",
                marker, token
            ),
            Self::NoRecordColumns => f.write_str("category has no interaction rows"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("{category}: corrupted input data ({reason})")]
    Corrupt {
        report: ReportSource,
        category: Category,
        reason: CorruptReason,
    },
    #[error("{category}: failed to read {report} report: {source}")]
    Io {
        report: ReportSource,
        category: Category,
        source: io::Error,
    },
}

impl ScanError {
    pub fn corrupt(report: ReportSource, category: Category, reason: CorruptReason) -> Self {
        Self::Corrupt {
            report,
            category,
            reason,
        }
    }

    pub const fn report(&self) -> ReportSource {
        match self {
            Self::Corrupt { report, .. } | Self::Io { report, .. } => *report,
        }
    }

    /// Renders the failure as a `CorruptInput` diagnostic naming the
    /// offending report by `report_label`.
    pub fn into_diagnostic(self, report_label: &str) -> Diagnostic {
        match self {
            Self::Corrupt {
                category, reason, ..
            } => Diagnostic::CorruptInput {
                report: report_label.to_string(),
                category: Some(category),
                detail: reason.to_string(),
            },
            Self::Io {
                category, source, ..
            } => Diagnostic::CorruptInput {
                report: report_label.to_string(),
                category: Some(category),
                detail: format!("read failure: {}", source),
            },
        }
    }
}

/// Rows of one section, canonicalized, in report order.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub records: Vec<InteractionRecord>,
    /// Stream position of the first row, for [`LineCursor::line_at`].
    pub start: u64,
}

enum ExtractState {
    SeekHeader,
    SeekSeparator,
    ReadRecords { start: u64 },
    Done { start: u64 },
    Corrupt(CorruptReason),
}

pub fn extract_section<R: BufRead + Seek>(
    cursor: &mut LineCursor<R>,
    category: Category,
    source: ReportSource,
) -> Result<Section, ScanError> {
    let layout = section_layout(category, source);
    let Some(columns) = layout.columns else {
        return Err(ScanError::corrupt(
            source,
            category,
            CorruptReason::NoRecordColumns,
        ));
    };
    let io_error = |error: io::Error| ScanError::Io {
        report: source,
        category,
        source: error,
    };

    let mut records = Vec::new();
    let mut ordinal = 0usize;
    let mut dropped = 0usize;
    let mut state = ExtractState::SeekHeader;

    loop {
        state = match state {
            ExtractState::SeekHeader => {
                if cursor.skip_past(layout.header).map_err(io_error)? {
                    ExtractState::SeekSeparator
                } else {
                    ExtractState::Corrupt(CorruptReason::MissingHeader(layout.header))
                }
            }
            ExtractState::SeekSeparator => {
                if cursor.skip_past(SEPARATOR_MARKER).map_err(io_error)? {
                    ExtractState::ReadRecords {
                        start: cursor.position().map_err(io_error)?,
                    }
                } else {
                    ExtractState::Corrupt(CorruptReason::MissingSeparator)
                }
            }
            ExtractState::ReadRecords { start } => match cursor.next_line().map_err(io_error)? {
                None => ExtractState::Corrupt(CorruptReason::Unterminated),
                Some(line) if line.trim().is_empty() => ExtractState::Done { start },
                Some(line) => match parse_row(category, &columns, &line) {
                    Ok(row) => {
                        if row.zero_contribution() {
                            dropped += 1;
                        } else {
                            records.push(
                                InteractionRecord::new(ordinal, row.interaction).canonical(),
                            );
                        }
                        ordinal += 1;
                        ExtractState::ReadRecords { start }
                    }
                    Err(token) => ExtractState::Corrupt(CorruptReason::MalformedRow {
                        row: ordinal,
                        token,
                    }),
                },
            },
            ExtractState::Done { start } => {
                debug!(
                    %category,
                    report = %source,
                    rows = records.len(),
                    dropped,
                    "extracted section"
                );
                return Ok(Section { records, start });
            }
            ExtractState::Corrupt(reason) => {
                return Err(ScanError::corrupt(source, category, reason));
            }
        };
    }
}

struct ParsedRow {
    interaction: Interaction,
    energy: Option<f64>,
}

impl ParsedRow {
    /// A row with no coefficients and no energy contributes nothing; the
    /// candidate report leaves such interactions out entirely.
    fn zero_contribution(&self) -> bool {
        let Some(energy) = self.energy else {
            return false;
        };
        match self.interaction {
            Interaction::Torsion(term) => {
                is_zero(term.v1) && is_zero(term.v2) && is_zero(term.v3) && is_zero(energy)
            }
            _ => false,
        }
    }
}

/// Returns the offending token index on failure; a short row names its first
/// absent token.
fn parse_row(category: Category, columns: &RecordColumns, line: &str) -> Result<ParsedRow, usize> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < columns.min_token_count() {
        return Err(tokens.len());
    }
    let integer = |index: usize| -> Result<u32, usize> {
        tokens
            .get(index)
            .and_then(|token| token.parse::<u32>().ok())
            .ok_or(index)
    };
    let real = |index: usize| -> Result<f64, usize> {
        tokens
            .get(index)
            .and_then(|token| token.parse::<f64>().ok())
            .ok_or(index)
    };

    let mut atoms = [0 as AtomType; 4];
    for (slot, &index) in atoms.iter_mut().zip(columns.atoms) {
        *slot = integer(index)?;
    }
    let ff_type = columns.ff_type.map(integer).transpose()?.unwrap_or(0);
    let mut coefficients = [0.0f64; 3];
    for (slot, &index) in coefficients.iter_mut().zip(columns.coefficients) {
        *slot = real(index)?;
    }
    let energy = columns.energy.map(real).transpose()?;

    let [i, j, k, l] = atoms;
    let [c1, c2, c3] = coefficients;
    let interaction = match category {
        Category::BondStretch => Interaction::BondStretch(BondStretch {
            i,
            j,
            ff_type,
            kb: c1,
        }),
        Category::AngleBend => Interaction::AngleBend(AngleBend {
            i,
            j,
            k,
            ff_type,
            ka: c1,
        }),
        Category::StretchBend => Interaction::StretchBend(StretchBend {
            i,
            j,
            k,
            ff_type,
            kba: c1,
        }),
        Category::OopBend => Interaction::OopBend(OopBend {
            i,
            j,
            k,
            l,
            koop: c1,
        }),
        Category::Torsion => Interaction::Torsion(Torsion {
            i,
            j,
            k,
            l,
            ff_type,
            v1: c1,
            v2: c2,
            v3: c3,
        }),
        Category::VanDerWaals | Category::Electrostatic => return Err(0),
    };

    Ok(ParsedRow {
        interaction,
        energy,
    })
}
