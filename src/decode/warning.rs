//! Parse warnings: failures on optional fields that did not abort the decode.

use std::fmt;

use super::errors::DecodeError;

/// Ordered collection of demoted field failures from one decode call.
///
/// Entries keep encounter order (depth first, declaration order). An empty
/// aggregate means "no warnings" and is never reported as a failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseWarning {
    warnings: Vec<DecodeError>,
}

impl ParseWarning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecodeError> {
        self.warnings.iter()
    }

    pub fn push(&mut self, warning: DecodeError) {
        self.warnings.push(warning);
    }

    /// Appends entries from an embedded record unchanged.
    pub fn merge(&mut self, other: ParseWarning) {
        self.warnings.extend(other.warnings);
    }

    /// Appends entries from a nested record, re-homed under `field` of `record`.
    pub fn merge_nested(&mut self, field: &str, record: &str, nested: ParseWarning) {
        self.warnings
            .extend(nested.warnings.into_iter().map(|w| w.rehome(field, record)));
    }

    /// Appends entries from a sequence element, re-homed under `index`.
    pub fn merge_element(&mut self, index: usize, nested: ParseWarning) {
        self.warnings
            .extend(nested.warnings.into_iter().map(|w| w.rehome_index(index)));
    }

    pub fn into_vec(self) -> Vec<DecodeError> {
        self.warnings
    }
}

impl<'a> IntoIterator for &'a ParseWarning {
    type Item = &'a DecodeError;
    type IntoIter = std::slice::Iter<'a, DecodeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.iter()
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plurality = if self.warnings.len() == 1 { "warning" } else { "warnings" };
        write!(f, "{} parse {}", self.warnings.len(), plurality)?;
        for warning in &self.warnings {
            write!(f, "\n{}", warning)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseWarning {}
