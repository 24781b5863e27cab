//! Periodic removal of expired signers from the pool.

use promisance_jot::Factory;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn a task that calls [`Factory::delete_expired_signers`] every `every`.
///
/// `every` must be non-zero. The task runs until aborted.
pub fn spawn_pruner(factory: Arc<Factory>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let pruned = factory.delete_expired_signers();
            if pruned > 0 {
                tracing::info!(pruned, remaining = ?factory.signer_ids(), "expired signers pruned");
            } else {
                tracing::trace!("no expired signers");
            }
        }
    })
}
