//! Migration file naming - parsing and ordering of `<sequence>_<label>.<ext>`

use regex::Regex;
use std::collections::HashMap;

use super::definitions::{identifier_of, MigrationFile};
use crate::config::ConfigError;
use crate::error::{MigrationError, MigrationResult};

/// Validates migration filenames against the recognised extensions
#[derive(Debug, Clone)]
pub struct MigrationNaming {
    pattern: Regex,
}

impl MigrationNaming {
    /// Build a validator accepting the given extensions (without dots)
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> MigrationResult<Self> {
        let alternatives: Vec<String> = extensions
            .iter()
            .map(|ext| regex::escape(ext.as_ref()))
            .collect();
        let source = format!(r"^(\d+)_[^.\s/\\]+\.(?:{})$", alternatives.join("|"));

        let pattern = Regex::new(&source).map_err(|e| {
            ConfigError::invalid_value("extensions", alternatives.join(","), e.to_string())
        })?;

        Ok(Self { pattern })
    }

    /// Parse a filename, `None` when it does not follow the naming scheme
    pub fn parse(&self, filename: &str) -> Option<MigrationFile> {
        let captures = self.pattern.captures(filename)?;
        let digits = captures.get(1)?.as_str();
        let trimmed = digits.trim_start_matches('0');

        Some(MigrationFile {
            filename: filename.to_string(),
            sequence: if trimmed.is_empty() { "0" } else { trimmed }.to_string(),
            identifier: identifier_of(filename).to_string(),
        })
    }

    /// Whether the filename follows the naming scheme
    pub fn is_valid(&self, filename: &str) -> bool {
        self.pattern.is_match(filename)
    }

    /// Well-formed names sharing an identifier with another well-formed name
    ///
    /// Units are resolved by identifier, so `1_a.json` and `1_a.mongo` cannot
    /// both be migrations. Colliding names are returned in lexical order.
    pub fn colliding<I, S>(&self, filenames: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_identifier: HashMap<String, Vec<String>> = HashMap::new();
        for name in filenames {
            let name = name.as_ref();
            if self.is_valid(name) {
                by_identifier
                    .entry(identifier_of(name).to_string())
                    .or_default()
                    .push(name.to_string());
            }
        }

        let mut colliding: Vec<String> = by_identifier
            .into_values()
            .filter(|names| names.len() > 1)
            .flatten()
            .collect();
        colliding.sort();
        colliding
    }

    /// Order filenames by their numeric sequence
    ///
    /// Every name is validated, even when a single one is given; all offending
    /// names are reported together.
    pub fn sorted<I, S>(&self, filenames: I) -> MigrationResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        let mut malformed = Vec::new();

        for name in filenames {
            let name = name.as_ref();
            match self.parse(name) {
                Some(file) => parsed.push(file),
                None => malformed.push(name.to_string()),
            }
        }

        if !malformed.is_empty() {
            return Err(MigrationError::malformed(malformed));
        }

        parsed.sort_by(|a, b| a.cmp_sequence(b));
        Ok(parsed.into_iter().map(|file| file.filename).collect())
    }
}
