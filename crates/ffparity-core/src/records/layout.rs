//! Fixed column layouts of the two report formats.
//!
//! The candidate and reference reports print the same quantities with
//! different leading columns, so every offset is looked up per
//! (category, source) pair. Offsets are zero-based whitespace token indices.

use crate::domain::{Category, ReportSource};

/// Reference molecule blocks are separated by a rule of asterisks.
pub const MOLECULE_BOUNDARY_MARKER: &str = "****";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordColumns {
    pub atoms: &'static [usize],
    pub ff_type: Option<usize>,
    pub coefficients: &'static [usize],
    /// Per-interaction energy column; only read where a filtering rule needs it.
    pub energy: Option<usize>,
}

impl RecordColumns {
    pub fn min_token_count(&self) -> usize {
        self.atoms
            .iter()
            .chain(self.coefficients.iter())
            .chain(self.ff_type.iter())
            .chain(self.energy.iter())
            .max()
            .map_or(0, |max| max + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalLine {
    pub marker: &'static str,
    pub token: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    pub header: &'static str,
    pub columns: Option<RecordColumns>,
    pub total: TotalLine,
}

const BOND_HEADER: &str = "B O N D   S T R E T C H I N G";
const ANGLE_HEADER: &str = "A N G L E   B E N D I N G";
const STRETCH_BEND_HEADER: &str = "S T R E T C H   B E N D I N G";
const CANDIDATE_OOP_HEADER: &str = "O U T - O F - P L A N E   B E N D I N G";
const REFERENCE_OOP_HEADER: &str = "O U T - O F - P L A N E    B E N D I N G";
const TORSION_HEADER: &str = "T O R S I O N A L";
const VDW_HEADER: &str = "V A N   D E R   W A A L S";
const ELECTROSTATIC_HEADER: &str = "E L E C T R O S T A T I C";

pub const fn section_layout(category: Category, source: ReportSource) -> SectionLayout {
    match source {
        ReportSource::Candidate => candidate_layout(category),
        ReportSource::Reference => reference_layout(category),
    }
}

const fn candidate_layout(category: Category) -> SectionLayout {
    match category {
        Category::BondStretch => SectionLayout {
            header: BOND_HEADER,
            columns: Some(RecordColumns {
                atoms: &[4, 5],
                ff_type: Some(6),
                coefficients: &[11],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL BOND STRETCH ENERGY",
                token: 5,
            },
        },
        Category::AngleBend => SectionLayout {
            header: ANGLE_HEADER,
            columns: Some(RecordColumns {
                atoms: &[6, 7, 8],
                ff_type: Some(9),
                coefficients: &[14],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL ANGLE BEND ENERGY",
                token: 5,
            },
        },
        Category::StretchBend => SectionLayout {
            header: STRETCH_BEND_HEADER,
            columns: Some(RecordColumns {
                atoms: &[6, 7, 8],
                ff_type: Some(9),
                coefficients: &[15],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL STRETCH-BEND ENERGY",
                token: 4,
            },
        },
        Category::OopBend => SectionLayout {
            header: CANDIDATE_OOP_HEADER,
            columns: Some(RecordColumns {
                atoms: &[8, 9, 10, 11],
                ff_type: None,
                coefficients: &[14],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL OUT-OF-PLANE BEND ENERGY",
                token: 5,
            },
        },
        Category::Torsion => SectionLayout {
            header: TORSION_HEADER,
            columns: Some(RecordColumns {
                atoms: &[8, 9, 10, 11],
                ff_type: Some(12),
                coefficients: &[15, 16, 17],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL TORSIONAL ENERGY",
                token: 4,
            },
        },
        Category::VanDerWaals => SectionLayout {
            header: VDW_HEADER,
            columns: None,
            total: TotalLine {
                marker: "TOTAL VAN DER WAALS ENERGY",
                token: 6,
            },
        },
        Category::Electrostatic => SectionLayout {
            header: ELECTROSTATIC_HEADER,
            columns: None,
            total: TotalLine {
                marker: "TOTAL ELECTROSTATIC ENERGY",
                token: 4,
            },
        },
    }
}

const fn reference_layout(category: Category) -> SectionLayout {
    match category {
        Category::BondStretch => SectionLayout {
            header: BOND_HEADER,
            columns: Some(RecordColumns {
                atoms: &[4, 5],
                ff_type: Some(6),
                coefficients: &[11],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL BOND STRAIN ENERGY",
                token: 5,
            },
        },
        Category::AngleBend => SectionLayout {
            header: ANGLE_HEADER,
            columns: Some(RecordColumns {
                atoms: &[4, 5, 6],
                ff_type: Some(7),
                coefficients: &[12],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL ANGLE STRAIN ENERGY",
                token: 5,
            },
        },
        Category::StretchBend => SectionLayout {
            header: STRETCH_BEND_HEADER,
            columns: Some(RecordColumns {
                atoms: &[4, 5, 6],
                ff_type: Some(7),
                coefficients: &[12],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL STRETCH-BEND STRAIN ENERGY",
                token: 5,
            },
        },
        Category::OopBend => SectionLayout {
            header: REFERENCE_OOP_HEADER,
            columns: Some(RecordColumns {
                atoms: &[5, 6, 7, 8],
                ff_type: None,
                coefficients: &[11],
                energy: None,
            }),
            total: TotalLine {
                marker: "TOTAL OUT-OF-PLANE STRAIN ENERGY",
                token: 5,
            },
        },
        Category::Torsion => SectionLayout {
            header: TORSION_HEADER,
            columns: Some(RecordColumns {
                atoms: &[6, 7, 8, 9],
                ff_type: Some(10),
                coefficients: &[13, 14, 15],
                energy: Some(12),
            }),
            total: TotalLine {
                marker: "TOTAL TORSION STRAIN ENERGY",
                token: 5,
            },
        },
        // The reference report carries these two totals on its summary lines
        // rather than after a dedicated section.
        Category::VanDerWaals => SectionLayout {
            header: VDW_HEADER,
            columns: None,
            total: TotalLine {
                marker: "Net vdW",
                token: 2,
            },
        },
        Category::Electrostatic => SectionLayout {
            header: ELECTROSTATIC_HEADER,
            columns: None,
            total: TotalLine {
                marker: "Electrostatic",
                token: 1,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordColumns, section_layout};
    use crate::domain::{Category, ReportSource};

    #[test]
    fn record_sections_have_columns_on_both_sides() {
        for category in Category::RECORD_SECTIONS {
            for source in [ReportSource::Candidate, ReportSource::Reference] {
                let layout = section_layout(category, source);
                assert!(
                    layout.columns.is_some(),
                    "{} {} should define record columns",
                    source,
                    category
                );
            }
        }
    }

    #[test]
    fn out_of_plane_headers_differ_only_in_spacing() {
        let candidate = section_layout(Category::OopBend, ReportSource::Candidate).header;
        let reference = section_layout(Category::OopBend, ReportSource::Reference).header;
        assert_ne!(candidate, reference);
        assert_eq!(
            candidate.split_whitespace().collect::<Vec<_>>(),
            reference.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn min_token_count_covers_the_rightmost_column() {
        let columns = RecordColumns {
            atoms: &[6, 7, 8, 9],
            ff_type: Some(10),
            coefficients: &[13, 14, 15],
            energy: Some(12),
        };
        assert_eq!(columns.min_token_count(), 16);
    }

    #[test]
    fn only_reference_torsions_read_the_energy_column() {
        for category in Category::RECORD_SECTIONS {
            let candidate = section_layout(category, ReportSource::Candidate);
            assert!(candidate.columns.and_then(|columns| columns.energy).is_none());
        }
        let reference = section_layout(Category::Torsion, ReportSource::Reference);
        assert_eq!(reference.columns.and_then(|columns| columns.energy), Some(12));
    }
}
