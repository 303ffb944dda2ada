//! Municipality catalog loaded from a three-column CSV
//! (municipality, population, province).
//!
//! Loading never fails: missing fields become empty strings, and rows that
//! are unreadable or have no name are skipped.

use crate::normalize::normalize_name;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Catalog compiled into the binary.
pub const BUNDLED_CSV: &str = include_str!("../data/municipalities.csv");

/// One catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub name: String,
    pub population: String,
    pub province: String,
}

/// Ordered, immutable list of municipalities
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Municipality>,
}

impl Catalog {
    /// Parse CSV from any reader. The first row is a header and is skipped.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (line, result) in rdr.byte_records().enumerate() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Skipping unreadable catalog row {}: {}", line + 2, e);
                    continue;
                }
            };

            let field = |i: usize| {
                record
                    .get(i)
                    .map(|b| String::from_utf8_lossy(b).trim().to_string())
                    .unwrap_or_default()
            };

            let row = Municipality {
                name: field(0),
                population: field(1),
                province: field(2),
            };

            // Nothing to select without a name.
            if row.name.is_empty() {
                if !row.population.is_empty() || !row.province.is_empty() {
                    tracing::debug!("Skipping unnamed catalog row {}", line + 2);
                }
                continue;
            }
            entries.push(row);
        }

        tracing::debug!("Loaded {} municipalities", entries.len());
        Self { entries }
    }

    /// Parse CSV text.
    pub fn parse(text: &str) -> Self {
        Self::from_reader(text.as_bytes())
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_CSV)
    }

    /// Load from an override file, falling back to the bundled catalog when
    /// no path is given or the file cannot be opened.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::bundled();
        };

        match std::fs::File::open(path) {
            Ok(file) => {
                tracing::info!("Loading municipality catalog from {}", path.display());
                Self::from_reader(file)
            }
            Err(e) => {
                tracing::warn!(
                    "Cannot open catalog {} ({}), using bundled catalog",
                    path.display(),
                    e
                );
                Self::bundled()
            }
        }
    }

    pub fn entries(&self) -> &[Municipality] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on the municipality name.
    /// An empty search returns every entry.
    pub fn filter(&self, search: &str) -> Vec<&Municipality> {
        let needle = search.to_lowercase();
        self.entries
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// First entry whose normalized name equals the normalized `name`.
    pub fn find_normalized(&self, name: &str) -> Option<&Municipality> {
        let key = normalize_name(name);
        self.entries.iter().find(|m| normalize_name(&m.name) == key)
    }

    /// Exact name lookup
    pub fn get(&self, name: &str) -> Option<&Municipality> {
        self.entries.iter().find(|m| m.name == name)
    }
}
