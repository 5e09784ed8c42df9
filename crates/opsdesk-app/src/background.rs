//! Fire-and-forget persistence writes.
//!
//! The optimistic half of a mutation has already run by the time a write
//! is spawned here; a failure is reported through the hook and the local
//! state is left standing. The next full reload re-fetches authoritative
//! state from the store.

use std::future::Future;
use std::sync::Arc;

use crate::store::StoreError;

/// Callback invoked when a background write fails, with the operation
/// label and the error.
pub type WriteFailureHook = Arc<dyn Fn(&'static str, &StoreError) + Send + Sync>;

/// The default hook: report the failure on the `tracing` warn level.
pub fn log_failures() -> WriteFailureHook {
    Arc::new(|op, err| tracing::warn!(op, error = %err, "background write failed"))
}

/// Run a store write on the current runtime without awaiting it.
pub fn spawn_write<F>(hook: &WriteFailureHook, op: &'static str, fut: F)
where
    F: Future<Output = Result<(), StoreError>> + Send + 'static,
{
    let hook = Arc::clone(hook);
    drop(tokio::spawn(async move {
        if let Err(err) = fut.await {
            hook(op, &err);
        }
    }));
}
