//! Error types for the codec layer.

use docket_types::WireValue;
use std::fmt;
use thiserror::Error;

/// Result type for codec construction.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while building a codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A record declares a field the document envelope already owns.
    #[error("record {record} declares reserved document field {field:?}")]
    ReservedField {
        record: &'static str,
        field: &'static str,
    },
}

/// Location of a value inside the decoded input, e.g. `$.data.owner`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// The path of the top-level input.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns this path extended by one field.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

/// A single rejected value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Where the value was found.
    pub path: Path,
    /// Name of the codec that rejected it.
    pub expected: String,
    /// The offending value. `None` when the field was absent.
    pub value: Option<WireValue>,
    /// Extra detail beyond the type mismatch.
    pub reason: Option<String>,
}

impl ValidationError {
    pub fn new(path: Path, expected: impl Into<String>, value: &WireValue) -> Self {
        Self {
            path,
            expected: expected.into(),
            value: Some(value.clone()),
            reason: None,
        }
    }

    /// A required field that is not present at all.
    pub fn missing(path: Path, expected: impl Into<String>) -> Self {
        Self {
            path,
            expected: expected.into(),
            value: None,
            reason: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(
                f,
                "invalid value {value} supplied to {}: expected {}",
                self.path, self.expected
            )?,
            None => write!(f, "missing {} at {}", self.expected, self.path)?,
        }
        if let Some(reason) = &self.reason {
            write!(f, " ({reason})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Every rejected value found while decoding one input, in field
/// declaration order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn single(error: ValidationError) -> Self {
        Self(vec![error])
    }

    /// Wraps a list of errors, returning `None` when there are none.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        (!errors.is_empty()).then_some(Self(errors))
    }

    pub fn first(&self) -> &ValidationError {
        &self.0[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The rendered paths of all failing values, e.g. `["$.name", "$.release"]`.
    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(|e| e.path.to_string()).collect()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
