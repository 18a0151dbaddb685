//! # Transaction Handler Trait
//!
//! The seam where transaction-family business logic plugs into the
//! processor. Dispatch is keyed by (family name, family version).

use crate::context::TransactionContext;
use crate::errors::ApplyError;
use async_trait::async_trait;
use shared_types::ProcessRequest;

/// Business logic for one transaction family.
///
/// Implementations must be shareable across concurrent invocations: the
/// processor may run many `apply` calls at once, each with its own context.
#[async_trait]
pub trait TransactionHandler: Send + Sync {
    /// The transaction family this handler serves.
    fn family_name(&self) -> String;

    /// The family versions this handler serves. Each version is registered
    /// with the validator separately.
    fn family_versions(&self) -> Vec<String>;

    /// The state address namespaces the family operates under.
    fn namespaces(&self) -> Vec<String>;

    /// Execute one transaction against the given state context.
    ///
    /// Return [`ApplyError::InvalidTransaction`] to reject the transaction
    /// under family rules; any other failure is an internal error. Both are
    /// reported to the validator without affecting other work.
    async fn apply(
        &self,
        request: &ProcessRequest,
        context: &TransactionContext,
    ) -> Result<(), ApplyError>;
}
