use chrono::{DateTime, Utc};
use docket_codec::{FieldReader, FieldWriter, IsoDateCodec, Record, StringCodec};

/// A product as accepted by `POST /api/products`.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    /// Sent and stored as an ISO-8601 string.
    pub release: DateTime<Utc>,
}

impl Record for Product {
    const NAME: &'static str = "Product";
    const FIELDS: &'static [&'static str] = &["name", "release"];

    fn read(fields: &mut FieldReader<'_>) -> Option<Self> {
        let name = fields.field("name", &StringCodec);
        let release = fields.field("release", &IsoDateCodec);
        Some(Self {
            name: name?,
            release: release?,
        })
    }

    fn write(&self, fields: &mut FieldWriter) {
        fields.field("name", &StringCodec, &self.name);
        fields.field("release", &IsoDateCodec, &self.release);
    }
}
