//! Cross-reference resolver trait.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::media::IdKind;

/// Maps an identifier on one remote system to the same entry on the other.
#[async_trait]
pub trait MediaResolver: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve `from_id` of kind `from` into the `to` identifier.
    ///
    /// `entity_type` must be `anime` or `manga` and `from_id` must be
    /// numeric, otherwise a validation error is returned. An entry with
    /// no counterpart resolves to `Ok(None)`, which is not an error.
    async fn resolve_id(
        &self,
        from_id: &str,
        from: IdKind,
        to: IdKind,
        entity_type: &str,
    ) -> AppResult<Option<u64>>;
}
