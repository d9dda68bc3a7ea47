//! Plots: named growing areas (greenhouses, beds).

use serde::{Deserialize, Serialize};

use zbalo_core::{DomainError, DomainResult};

/// A plot is identified by its name only; crop cycles and maintenance
/// events reference it by that name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plot {
    pub name: String,
}

impl Plot {
    /// Build a plot from operator input; the name is trimmed and required.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation("plot name is required"));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl core::fmt::Display for Plot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
