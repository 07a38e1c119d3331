pub mod errors;

pub use errors::{ExitClass, ParityError, ParityErrorCategory, ParityResult};

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The seven interaction categories an energy report enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BondStretch,
    AngleBend,
    StretchBend,
    OopBend,
    Torsion,
    VanDerWaals,
    Electrostatic,
}

impl Category {
    /// Categories that carry per-interaction rows, in report order.
    pub const RECORD_SECTIONS: [Category; 5] = [
        Category::BondStretch,
        Category::AngleBend,
        Category::StretchBend,
        Category::OopBend,
        Category::Torsion,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::BondStretch => "Bond stretching",
            Self::AngleBend => "Angle bending",
            Self::StretchBend => "Stretch-bending",
            Self::OopBend => "Out-of-plane bending",
            Self::Torsion => "Torsional",
            Self::VanDerWaals => "Van der Waals",
            Self::Electrostatic => "Electrostatic",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).label())
    }
}

/// Which of the two reports a line, record or failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    Candidate,
    Reference,
}

impl ReportSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Reference => "reference",
        }
    }
}

impl Display for ReportSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    StructuralMismatch {
        category: Category,
        expected: usize,
        found: usize,
    },
    FieldMismatch {
        category: Category,
        expected_line: Option<String>,
        found_line: Option<String>,
    },
    EnergyMismatch {
        category: Category,
        expected: f64,
        found: f64,
    },
    CorruptInput {
        report: String,
        category: Option<Category>,
        detail: String,
    },
    MoleculeNotFound {
        report: String,
        molecule: String,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StructuralMismatch {
                category,
                expected,
                found,
            } => write!(
                f,
                "{}: expected {} interactions, found {}",
                category, expected, found
            ),
            Self::FieldMismatch {
                category,
                expected_line,
                found_line,
            } => {
                write!(f, "{}: found a difference", category)?;
                if let (Some(expected), Some(found)) = (expected_line, found_line) {
                    write!(f, "\nExpected:\n{}\nFound:\n{}", expected, found)?;
                }
                Ok(())
            }
            Self::EnergyMismatch {
                category,
                expected,
                found,
            } => write!(
                f,
                "{}: energies differ\nExpected {:.4}, found {:.4}",
                category, expected, found
            ),
            Self::CorruptInput {
                report,
                category: Some(category),
                detail,
            } => write!(
                f,
                "{}: {}: corrupted input data ({})",
                report, category, detail
            ),
            Self::CorruptInput {
                report,
                category: None,
                detail,
            } => write!(f, "{}: corrupted input data ({})", report, detail),
            Self::MoleculeNotFound { report, molecule } => {
                write!(f, "{}: molecule '{}' not found", report, molecule)
            }
        }
    }
}

/// Verdict for one molecule. Built fresh per molecule name and folded into
/// the owning [`UnitOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoleculeOutcome {
    pub name: String,
    pub passed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl MoleculeOutcome {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.passed = false;
        self.diagnostics.push(diagnostic);
    }

    pub fn render(&self) -> String {
        let mut text = format!("{}\n", self.name);
        for diagnostic in &self.diagnostics {
            text.push('\n');
            text.push_str(&diagnostic.to_string());
        }
        text
    }
}

/// Verdict for one candidate/reference report pair.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct UnitOutcome {
    pub molecules: Vec<MoleculeOutcome>,
    pub aborted: Option<Diagnostic>,
    pub unchecked_molecules: usize,
}

impl UnitOutcome {
    pub fn passed_count(&self) -> usize {
        self.molecules
            .iter()
            .filter(|molecule| molecule.passed)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.molecules.len() - self.passed_count()
    }

    pub fn passed(&self) -> bool {
        self.aborted.is_none() && self.failed_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Diagnostic, MoleculeOutcome, UnitOutcome};

    #[test]
    fn field_mismatch_renders_both_lines_only_when_available() {
        let with_lines = Diagnostic::FieldMismatch {
            category: Category::BondStretch,
            expected_line: Some("ref row".to_string()),
            found_line: Some("cand row".to_string()),
        };
        assert_eq!(
            with_lines.to_string(),
            "Bond stretching: found a difference\nExpected:\nref row\nFound:\ncand row"
        );

        let without_lines = Diagnostic::FieldMismatch {
            category: Category::Torsion,
            expected_line: Some("ref row".to_string()),
            found_line: None,
        };
        assert_eq!(without_lines.to_string(), "Torsional: found a difference");
    }

    #[test]
    fn energy_mismatch_uses_four_decimals() {
        let diagnostic = Diagnostic::EnergyMismatch {
            category: Category::Electrostatic,
            expected: -1.23456,
            found: -1.5,
        };
        assert_eq!(
            diagnostic.to_string(),
            "Electrostatic: energies differ\nExpected -1.2346, found -1.5000"
        );
    }

    #[test]
    fn recording_a_diagnostic_fails_the_molecule() {
        let mut molecule = MoleculeOutcome::new("AMHTAR01");
        assert!(molecule.passed);
        molecule.record(Diagnostic::StructuralMismatch {
            category: Category::AngleBend,
            expected: 3,
            found: 2,
        });
        assert!(!molecule.passed);
        assert_eq!(
            molecule.render(),
            "AMHTAR01\n\nAngle bending: expected 3 interactions, found 2"
        );
    }

    #[test]
    fn aborted_unit_never_passes() {
        let outcome = UnitOutcome {
            molecules: vec![MoleculeOutcome::new("A")],
            aborted: Some(Diagnostic::MoleculeNotFound {
                report: "ref.log".to_string(),
                molecule: "B".to_string(),
            }),
            unchecked_molecules: 1,
        };
        assert_eq!(outcome.passed_count(), 1);
        assert_eq!(outcome.failed_count(), 0);
        assert!(!outcome.passed());
    }
}
