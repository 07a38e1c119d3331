//! Parity checking of force-field energy reports.
//!
//! A candidate report is reconciled against a trusted reference report one
//! molecule at a time: every interaction section is extracted from both
//! sides, canonicalized, sorted and compared within tolerance, and the
//! category energy totals are compared alongside.

pub mod batch;
pub mod domain;
pub mod energy;
pub mod extract;
pub mod matcher;
pub mod numerics;
pub mod reconcile;
pub mod records;
pub mod scanner;

pub use domain::{
    Category, Diagnostic, MoleculeOutcome, ParityError, ParityErrorCategory, ParityResult,
    ReportSource, UnitOutcome,
};
pub use reconcile::{ReconcileRequest, reconcile_files, reconcile_reports};
