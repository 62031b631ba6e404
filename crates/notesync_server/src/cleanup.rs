//! Background revocation sweep.

use crate::server::NoteServer;
use chrono::Utc;
use notesync_auth::CredentialHasher;
use notesync_store::{NoteStore, RevocationStore, UserStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawns the periodic blacklist sweep.
///
/// Purely storage-bounding: expiry checks already reject anything an
/// expired row would, so a failed or delayed sweep affects disk usage,
/// never correctness. Runs until the returned handle is aborted.
pub fn spawn_cleanup<S, H>(server: Arc<NoteServer<S, H>>) -> JoinHandle<()>
where
    S: NoteStore + UserStore + RevocationStore + 'static,
    H: CredentialHasher + Send + Sync + 'static,
{
    let period = server.config().cleanup_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval fires immediately; skip it so the
        // sweep starts one full period after startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match server.sweep_revocations(Utc::now()) {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "swept expired revocation rows"),
                Err(err) => tracing::warn!(%err, "revocation sweep failed"),
            }
        }
    })
}
