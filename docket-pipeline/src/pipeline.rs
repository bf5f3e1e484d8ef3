use docket_codec::{
    BoolCodec, Codec, CodecResult, Document, DocumentCodec, Record, RecordCodec, CREATED_AT,
    OWNER,
};
use docket_query::{Database, Executor, Expr, QueryError, QueryResult};
use docket_types::WireValue;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;

/// A step of [`Pipeline::create_persisted_entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Decoding,
    CheckingExistence,
    Provisioning,
    Writing,
    DecodingResult,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decoding => "decoding",
            Self::CheckingExistence => "checking_existence",
            Self::Provisioning => "provisioning",
            Self::Writing => "writing",
            Self::DecodingResult => "decoding_result",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates documents of record type `R` through database `Db`.
///
/// Holds no mutable state; one pipeline can serve concurrent calls as long
/// as the database can.
pub struct Pipeline<Db, R> {
    executor: Executor<Db>,
    config: PipelineConfig,
    input: RecordCodec<R>,
    output: DocumentCodec<R>,
}

impl<Db: Database, R: Record> Pipeline<Db, R> {
    /// Fails if `R` declares a field reserved by the document envelope.
    pub fn new(db: Db, config: PipelineConfig) -> CodecResult<Self> {
        Ok(Self {
            executor: Executor::new(db),
            config,
            input: RecordCodec::new(),
            output: DocumentCodec::new()?,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn executor(&self) -> &Executor<Db> {
        &self.executor
    }

    /// Codec for the caller's input record.
    pub fn record_codec(&self) -> &RecordCodec<R> {
        &self.input
    }

    /// Codec for the stored document returned on success.
    pub fn document_codec(&self) -> &DocumentCodec<R> {
        &self.output
    }

    /// Validates `input`, makes sure the collections exist, creates the
    /// document and validates what the database returned.
    ///
    /// Returns the first failure unchanged. Validation failures of either
    /// the input or the result are `invalidValue`.
    pub async fn create_persisted_entity(&self, input: &WireValue) -> QueryResult<Document<R>> {
        debug!(stage = %Stage::Decoding, record = R::NAME);
        let record = self
            .input
            .decode(input)
            .map_err(|e| failed(Stage::Decoding, e.into()))?;

        debug!(stage = %Stage::CheckingExistence, collection = %self.config.collection);
        let exists = self
            .collection_exists()
            .await
            .map_err(|e| failed(Stage::CheckingExistence, e))?;

        if exists {
            debug!(collection = %self.config.collection, "collection present, skipping provisioning");
        } else {
            debug!(stage = %Stage::Provisioning, collection = %self.config.collection);
            self.provision()
                .await
                .map_err(|e| failed(Stage::Provisioning, e))?;
        }

        debug!(stage = %Stage::Writing, collection = %self.config.collection);
        let raw = self
            .executor
            .query(self.create_expr(&record))
            .await
            .map_err(|e| failed(Stage::Writing, e))?;

        debug!(stage = %Stage::DecodingResult);
        let document = self
            .output
            .decode(&raw)
            .map_err(|e| failed(Stage::DecodingResult, e.into()))?;

        info!(reference = %document.reference(), "entity created");
        Ok(document)
    }

    async fn collection_exists(&self) -> QueryResult<bool> {
        let answer = self
            .executor
            .query(Expr::exists(Expr::collection(&self.config.collection)))
            .await?;
        BoolCodec.decode(&answer).map_err(QueryError::from)
    }

    /// Creates the target and owner collections in one query.
    async fn provision(&self) -> QueryResult<()> {
        let mut names = vec![self.config.collection.clone()];
        if self.config.owner_collection != self.config.collection {
            names.push(self.config.owner_collection.clone());
        }
        self.executor
            .query(Expr::do_all(names.into_iter().map(Expr::create_collection)))
            .await?;
        Ok(())
    }

    /// `Create(Collection(c), {data: {...record, createdAt: Now(), owner: Ref(..)}})`
    fn create_expr(&self, record: &R) -> Expr {
        let mut data: BTreeMap<String, Expr> = self
            .input
            .encode_fields(record)
            .into_iter()
            .map(|(name, value)| (name, Expr::Literal(value)))
            .collect();
        data.insert(CREATED_AT.to_string(), Expr::Now);
        data.insert(
            OWNER.to_string(),
            Expr::reference(
                Expr::collection(&self.config.owner_collection),
                &self.config.owner_id,
            ),
        );

        Expr::create(
            Expr::collection(&self.config.collection),
            Expr::object([("data", Expr::Object(data))]),
        )
    }
}

fn failed(stage: Stage, error: QueryError) -> QueryError {
    warn!(%stage, error = error.name(), message = error.message(), "pipeline failed");
    error
}
