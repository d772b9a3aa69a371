//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subsystem a diagnostic originates from, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Traffic-flow routing and deadlock verification, prefixed with `R`.
    Routing,
    /// Cost bookkeeping and normalization, prefixed with `K`.
    Cost,
    /// Router block moves and placement output, prefixed with `P`.
    Placement,
    /// Option loading and validation, prefixed with `C`.
    Config,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Routing => 'R',
            Category::Cost => 'K',
            Category::Placement => 'P',
            Category::Config => 'C',
        }
    }
}

/// A category prefix plus a numeric identifier, displayed as e.g. `R001`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
