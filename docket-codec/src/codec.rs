use docket_types::WireValue;
use std::any::Any;

use crate::error::{Path, ValidationError, ValidationErrors};

/// Result of decoding a wire value.
pub type DecodeResult<T> = Result<T, ValidationErrors>;

/// A bidirectional converter between a wire value and a domain value.
pub trait Codec: Send + Sync {
    /// The decoded type.
    type Domain;

    /// Name used in validation errors, e.g. `"DocRef"`.
    fn name(&self) -> &str;

    /// Decodes `input` found at `path`.
    ///
    /// Must accept both the in-process shape produced by [`Codec::encode`]
    /// and its JSON-transmitted form.
    fn validate(&self, input: &WireValue, path: &Path) -> DecodeResult<Self::Domain>;

    /// Encodes to the driver's in-process form.
    fn encode(&self, value: &Self::Domain) -> WireValue;

    /// Decodes a top-level input.
    fn decode(&self, input: &WireValue) -> DecodeResult<Self::Domain> {
        self.validate(input, &Path::root())
    }

    /// Returns true if `value` already is a decoded domain value.
    fn is(&self, value: &dyn Any) -> bool
    where
        Self::Domain: 'static,
    {
        value.is::<Self::Domain>()
    }

    /// A single-error rejection of `input` attributed to this codec.
    fn reject(&self, input: &WireValue, path: &Path) -> ValidationErrors {
        ValidationError::new(path.clone(), self.name(), input).into()
    }
}
