//! A scripted database for testing.
//!
//! Answers queries from a queue of prepared responses and records every
//! expression it receives.

use async_trait::async_trait;
use docket_types::WireValue;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::database::{Database, DriverError};
use crate::expr::Expr;

/// A database that replays scripted responses in order.
#[derive(Debug, Default)]
pub struct ScriptedDatabase {
    responses: Mutex<VecDeque<Result<WireValue, DriverError>>>,
    received: Mutex<Vec<Expr>>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response.
    pub fn push_ok(&self, value: WireValue) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(value));
        self
    }

    /// Queues a failure.
    pub fn push_err(&self, error: DriverError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Every expression received so far, in order.
    pub fn queries(&self) -> Vec<Expr> {
        self.received.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Database for ScriptedDatabase {
    async fn query(&self, expr: Expr) -> Result<WireValue, DriverError> {
        self.received.lock().unwrap().push(expr);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DriverError::other("no scripted response left")))
    }
}
