use sea_orm::DatabaseConnection;

use crate::{ResultEngine, locks::OwnerLocks, reconcile::ReconcilePolicy};

mod budget;
mod store;
mod transactions;
mod users;

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

/// Entry point of every budget operation.
///
/// Each mutation holds the owner's lock and runs its read, reconcile and
/// write steps inside one database transaction.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    policy: ReconcilePolicy,
    locks: OwnerLocks,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn policy(&self) -> &ReconcilePolicy {
        &self.policy
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    policy: ReconcilePolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Reconciliation policy, defaults to [`ReconcilePolicy::default`].
    pub fn policy(mut self, policy: ReconcilePolicy) -> EngineBuilder {
        self.policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        tracing::debug!(policy = ?self.policy, "engine ready");
        Ok(Engine {
            database: self.database,
            policy: self.policy,
            locks: OwnerLocks::default(),
        })
    }
}
