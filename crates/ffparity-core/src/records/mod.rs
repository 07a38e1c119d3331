pub mod layout;

use crate::domain::Category;
use crate::numerics::within_abs_tolerance;
use serde::Serialize;
use std::cmp::Ordering;

pub type AtomType = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BondStretch {
    pub i: AtomType,
    pub j: AtomType,
    pub ff_type: u32,
    pub kb: f64,
}

impl BondStretch {
    pub fn canonical(self) -> Self {
        if self.i > self.j {
            Self {
                i: self.j,
                j: self.i,
                ..self
            }
        } else {
            self
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        (self.i, self.j, self.ff_type)
            .cmp(&(other.i, other.j, other.ff_type))
            .then_with(|| self.kb.total_cmp(&other.kb))
    }

    fn agrees_with(&self, other: &Self, tolerance: f64) -> bool {
        (self.i, self.j, self.ff_type) == (other.i, other.j, other.ff_type)
            && within_abs_tolerance(self.kb, other.kb, tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngleBend {
    pub i: AtomType,
    pub j: AtomType,
    pub k: AtomType,
    pub ff_type: u32,
    pub ka: f64,
}

impl AngleBend {
    /// `j` is the vertex; the two ends are interchangeable.
    pub fn canonical(self) -> Self {
        if self.i > self.k {
            Self {
                i: self.k,
                k: self.i,
                ..self
            }
        } else {
            self
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        (self.j, self.i, self.k, self.ff_type)
            .cmp(&(other.j, other.i, other.k, other.ff_type))
            .then_with(|| self.ka.total_cmp(&other.ka))
    }

    fn agrees_with(&self, other: &Self, tolerance: f64) -> bool {
        (self.i, self.j, self.k, self.ff_type) == (other.i, other.j, other.k, other.ff_type)
            && within_abs_tolerance(self.ka, other.ka, tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StretchBend {
    pub i: AtomType,
    pub j: AtomType,
    pub k: AtomType,
    pub ff_type: u32,
    pub kba: f64,
}

impl StretchBend {
    pub fn canonical(self) -> Self {
        if self.i > self.k {
            Self {
                i: self.k,
                k: self.i,
                ..self
            }
        } else {
            self
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        (self.j, self.i, self.k, self.ff_type)
            .cmp(&(other.j, other.i, other.k, other.ff_type))
            .then_with(|| self.kba.total_cmp(&other.kba))
    }

    fn agrees_with(&self, other: &Self, tolerance: f64) -> bool {
        (self.i, self.j, self.k, self.ff_type) == (other.i, other.j, other.k, other.ff_type)
            && within_abs_tolerance(self.kba, other.kba, tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OopBend {
    pub i: AtomType,
    pub j: AtomType,
    pub k: AtomType,
    pub l: AtomType,
    pub koop: f64,
}

impl OopBend {
    /// `j` is the central atom and `l` the out-of-plane atom; only `i` and
    /// `k` may trade places.
    pub fn canonical(self) -> Self {
        if self.i > self.k {
            Self {
                i: self.k,
                k: self.i,
                ..self
            }
        } else {
            self
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        (self.j, self.i, self.k, self.l)
            .cmp(&(other.j, other.i, other.k, other.l))
            .then_with(|| self.koop.total_cmp(&other.koop))
    }

    fn agrees_with(&self, other: &Self, tolerance: f64) -> bool {
        (self.i, self.j, self.k, self.l) == (other.i, other.j, other.k, other.l)
            && within_abs_tolerance(self.koop, other.koop, tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Torsion {
    pub i: AtomType,
    pub j: AtomType,
    pub k: AtomType,
    pub l: AtomType,
    pub ff_type: u32,
    pub v1: f64,
    pub v2: f64,
    pub v3: f64,
}

impl Torsion {
    /// A dihedral reads the same in both traversal directions: orient it so
    /// the central bond runs from the lower type to the higher one, falling
    /// back to the terminal atoms when the central pair is symmetric.
    pub fn canonical(self) -> Self {
        if self.j > self.k {
            Self {
                i: self.l,
                j: self.k,
                k: self.j,
                l: self.i,
                ..self
            }
        } else if self.j == self.k && self.i > self.l {
            Self {
                i: self.l,
                l: self.i,
                ..self
            }
        } else {
            self
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        (self.j, self.k, self.i, self.l, self.ff_type)
            .cmp(&(other.j, other.k, other.i, other.l, other.ff_type))
            .then_with(|| self.v1.total_cmp(&other.v1))
            .then_with(|| self.v2.total_cmp(&other.v2))
            .then_with(|| self.v3.total_cmp(&other.v3))
    }

    fn agrees_with(&self, other: &Self, tolerance: f64) -> bool {
        (self.i, self.j, self.k, self.l, self.ff_type)
            == (other.i, other.j, other.k, other.l, other.ff_type)
            && within_abs_tolerance(self.v1, other.v1, tolerance)
            && within_abs_tolerance(self.v2, other.v2, tolerance)
            && within_abs_tolerance(self.v3, other.v3, tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Interaction {
    BondStretch(BondStretch),
    AngleBend(AngleBend),
    StretchBend(StretchBend),
    OopBend(OopBend),
    Torsion(Torsion),
}

impl Interaction {
    pub const fn category(&self) -> Category {
        match self {
            Self::BondStretch(_) => Category::BondStretch,
            Self::AngleBend(_) => Category::AngleBend,
            Self::StretchBend(_) => Category::StretchBend,
            Self::OopBend(_) => Category::OopBend,
            Self::Torsion(_) => Category::Torsion,
        }
    }

    pub fn canonical(self) -> Self {
        match self {
            Self::BondStretch(term) => Self::BondStretch(term.canonical()),
            Self::AngleBend(term) => Self::AngleBend(term.canonical()),
            Self::StretchBend(term) => Self::StretchBend(term.canonical()),
            Self::OopBend(term) => Self::OopBend(term.canonical()),
            Self::Torsion(term) => Self::Torsion(term.canonical()),
        }
    }

    /// Total order used to align the two collections. Records of different
    /// categories order by category.
    pub fn canonical_order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::BondStretch(lhs), Self::BondStretch(rhs)) => lhs.order(rhs),
            (Self::AngleBend(lhs), Self::AngleBend(rhs)) => lhs.order(rhs),
            (Self::StretchBend(lhs), Self::StretchBend(rhs)) => lhs.order(rhs),
            (Self::OopBend(lhs), Self::OopBend(rhs)) => lhs.order(rhs),
            (Self::Torsion(lhs), Self::Torsion(rhs)) => lhs.order(rhs),
            _ => self.category().cmp(&other.category()),
        }
    }

    /// Atom types and ff type must be identical, every coefficient within
    /// `tolerance`.
    pub fn agrees_with(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (Self::BondStretch(lhs), Self::BondStretch(rhs)) => lhs.agrees_with(rhs, tolerance),
            (Self::AngleBend(lhs), Self::AngleBend(rhs)) => lhs.agrees_with(rhs, tolerance),
            (Self::StretchBend(lhs), Self::StretchBend(rhs)) => lhs.agrees_with(rhs, tolerance),
            (Self::OopBend(lhs), Self::OopBend(rhs)) => lhs.agrees_with(rhs, tolerance),
            (Self::Torsion(lhs), Self::Torsion(rhs)) => lhs.agrees_with(rhs, tolerance),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InteractionRecord {
    /// Zero-based row ordinal within the section; diagnostics only.
    pub source_line: usize,
    pub interaction: Interaction,
}

impl InteractionRecord {
    pub fn new(source_line: usize, interaction: Interaction) -> Self {
        Self {
            source_line,
            interaction,
        }
    }

    pub const fn category(&self) -> Category {
        self.interaction.category()
    }

    pub fn canonical(self) -> Self {
        Self {
            interaction: self.interaction.canonical(),
            ..self
        }
    }

    pub fn canonical_order(&self, other: &Self) -> Ordering {
        self.interaction.canonical_order(&other.interaction)
    }
}
