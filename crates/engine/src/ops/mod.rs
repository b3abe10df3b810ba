use std::{future::Future, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, locks::ChildLocks};

mod access;
mod awards;
mod balances;
mod children;
mod ledger;
mod purchases;
mod rewards;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Tunables for the ledger workflow.
#[derive(Clone, Debug)]
pub struct LedgerSettings {
    /// Upper bound (inclusive) for the points of a single award or deduction.
    pub max_award_points: i64,
    /// How long a write may wait for a child's lock before it is a conflict.
    pub lock_timeout: Duration,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            max_award_points: 10,
            lock_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    locks: ChildLocks,
    settings: LedgerSettings,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Runs `op`; a retryable failure (lost lock race, busy database) gets
    /// exactly one more attempt, which re-reads everything from scratch.
    async fn retry_once<T, F, Fut>(&self, op: &'static str, mut f: F) -> ResultEngine<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        match f().await {
            Err(err) if err.is_retryable() => {
                tracing::warn!(op, error = %err, "conflict, retrying once");
                f().await.map_err(|err| {
                    if err.is_retryable() {
                        tracing::warn!(op, error = %err, "conflict after retry");
                        match err {
                            EngineError::Conflict(msg) => EngineError::Conflict(msg),
                            other => EngineError::Conflict(format!("{op}: {other}")),
                        }
                    } else {
                        err
                    }
                })
            }
            other => other,
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    settings: LedgerSettings,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the default [`LedgerSettings`].
    pub fn settings(mut self, settings: LedgerSettings) -> EngineBuilder {
        self.settings = settings;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.settings.max_award_points <= 0 {
            return Err(EngineError::Validation(
                "max_award_points must be > 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            locks: ChildLocks::default(),
            settings: self.settings,
        })
    }
}
