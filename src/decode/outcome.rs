//! Three-state decode result.

use thiserror::Error;

use super::errors::DecodeError;
use super::warning::ParseWarning;

/// Result of decoding one value.
///
/// `Warned` is a success: the value is usable, but some optional fields were
/// left at their zero value. Callers that only check for `Fatal` get the
/// lenient behaviour; [`Outcome::deny_warnings`] gives the strict one.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Every field decoded
    Clean(T),
    /// Decoded, with demoted optional-field failures
    Warned(T, ParseWarning),
    /// Decode aborted
    Fatal(DecodeError),
}

/// Failure as seen by strict callers.
#[derive(Debug, Clone, Error)]
pub enum Failure {
    #[error(transparent)]
    Fatal(DecodeError),

    #[error(transparent)]
    Warnings(ParseWarning),
}

impl<T> Outcome<T> {
    /// `Clean` when `warnings` is empty, `Warned` otherwise.
    pub fn from_parts(value: T, warnings: ParseWarning) -> Self {
        if warnings.is_empty() {
            Outcome::Clean(value)
        } else {
            Outcome::Warned(value, warnings)
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Outcome::Clean(_))
    }

    pub fn is_warned(&self) -> bool {
        matches!(self, Outcome::Warned(..))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Fatal(_))
    }

    /// Decoded value, unless the decode aborted.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Clean(value) | Outcome::Warned(value, _) => Some(value),
            Outcome::Fatal(_) => None,
        }
    }

    pub fn warnings(&self) -> Option<&ParseWarning> {
        match self {
            Outcome::Warned(_, warnings) => Some(warnings),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            Outcome::Fatal(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Clean(value) => Outcome::Clean(f(value)),
            Outcome::Warned(value, warnings) => Outcome::Warned(f(value), warnings),
            Outcome::Fatal(err) => Outcome::Fatal(err),
        }
    }

    /// Splits into value and (possibly empty) warnings.
    pub fn into_result(self) -> Result<(T, ParseWarning), DecodeError> {
        match self {
            Outcome::Clean(value) => Ok((value, ParseWarning::new())),
            Outcome::Warned(value, warnings) => Ok((value, warnings)),
            Outcome::Fatal(err) => Err(err),
        }
    }

    /// Value with warnings dropped.
    pub fn into_value(self) -> Result<T, DecodeError> {
        self.into_result().map(|(value, _)| value)
    }

    /// Value only if no warnings were raised.
    pub fn deny_warnings(self) -> Result<T, Failure> {
        match self {
            Outcome::Clean(value) => Ok(value),
            Outcome::Warned(_, warnings) => Err(Failure::Warnings(warnings)),
            Outcome::Fatal(err) => Err(Failure::Fatal(err)),
        }
    }
}

impl<T> From<Result<(T, ParseWarning), DecodeError>> for Outcome<T> {
    fn from(result: Result<(T, ParseWarning), DecodeError>) -> Self {
        match result {
            Ok((value, warnings)) => Outcome::from_parts(value, warnings),
            Err(err) => Outcome::Fatal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_warning() -> ParseWarning {
        let mut warnings = ParseWarning::new();
        warnings.push(DecodeError::type_mismatch("1", "string").rehome("A", "r"));
        warnings
    }

    #[test]
    fn test_empty_warnings_are_clean() {
        let outcome = Outcome::from_parts(5, ParseWarning::new());
        assert!(outcome.is_clean());
        assert!(outcome.warnings().is_none());
    }

    #[test]
    fn test_warned_keeps_value() {
        let outcome = Outcome::from_parts("v", one_warning());
        assert!(outcome.is_warned());
        assert_eq!(outcome.value(), Some(&"v"));
        assert_eq!(outcome.into_value().unwrap(), "v");
    }

    #[test]
    fn test_deny_warnings() {
        let outcome = Outcome::from_parts(1, one_warning());
        assert!(matches!(outcome.deny_warnings(), Err(Failure::Warnings(w)) if w.len() == 1));

        let outcome: Outcome<i32> = Outcome::Fatal(DecodeError::type_mismatch("x", "int"));
        assert!(matches!(outcome.deny_warnings(), Err(Failure::Fatal(_))));
    }

    #[test]
    fn test_map_preserves_state() {
        let outcome = Outcome::from_parts(2, one_warning()).map(|v| v * 10);
        assert_eq!(outcome.value(), Some(&20));
        assert!(outcome.is_warned());
    }
}
