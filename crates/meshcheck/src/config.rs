//! Settings for loading and checking a mesh.
//!
//! Every field has a default matching the classic layout: three comma or
//! semicolon separated `Cell*Ds.csv` files, markers in `0..=8` and exact
//! comparisons against zero. A config can be read from a JSON file where
//! any missing field keeps its default.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cells::Marker;
use crate::error::ConfigError;
use crate::exchange::TableKind;

/// What to do with a record that doesn't match its table layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Drop the record and report it next to the other defects.
    #[default]
    Skip,
    /// Fail the whole load.
    Abort,
}

/// File names of the three tables inside the mesh directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableFiles {
    pub vertices: String,
    pub edges: String,
    pub faces: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            vertices: "Cell0Ds.csv".to_string(),
            edges: "Cell1Ds.csv".to_string(),
            faces: "Cell2Ds.csv".to_string(),
        }
    }
}

impl TableFiles {
    pub fn get(&self, table: TableKind) -> &str {
        match table {
            TableKind::Cell0D => &self.vertices,
            TableKind::Cell1D => &self.edges,
            TableKind::Cell2D => &self.faces,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub files: TableFiles,

    /// Field separator. When unset it is picked from the header line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,

    pub parse_policy: ParsePolicy,

    /// Smallest valid marker, inclusive.
    pub marker_min: Marker,
    /// Largest valid marker, inclusive.
    pub marker_max: Marker,

    /// Lengths and areas at or below this are degenerate. The default of
    /// zero only flags values that are exactly zero.
    pub zero_tolerance: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            files: TableFiles::default(),
            delimiter: None,
            parse_policy: ParsePolicy::default(),
            marker_min: 0,
            marker_max: 8,
            zero_tolerance: 0.0,
        }
    }
}

impl CheckConfig {
    pub fn marker_range(&self) -> RangeInclusive<Marker> {
        self.marker_min..=self.marker_max
    }

    /// Parse from a JSON string, validating the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker_min > self.marker_max {
            return Err(ConfigError::Invalid(format!(
                "marker_min {} is larger than marker_max {}",
                self.marker_min, self.marker_max
            )));
        }
        if self.zero_tolerance.is_nan() || self.zero_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "zero_tolerance must be a non-negative number, got {}",
                self.zero_tolerance
            )));
        }
        if let Some(d) = self.delimiter {
            // tab is the one whitespace separator we read, `e` appears in exponents
            let clashes = (d.is_whitespace() && d != '\t')
                || d.is_ascii_digit()
                || matches!(d, '-' | '+' | '.' | 'e' | 'E');
            if clashes {
                return Err(ConfigError::Invalid(format!(
                    "delimiter {d:?} would be confused with field contents"
                )));
            }
        }
        Ok(())
    }
}
