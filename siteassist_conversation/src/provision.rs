//! Activation and deactivation for one site.
//!
//! Activation is fail-fast: any backend error aborts setup and leaves the
//! readiness flag unset. Deactivation is a best-effort sweep: every stored
//! session is cleared, per-user failures are reported but never stop the
//! sweep.

use crate::SiteReadiness;
use siteassist_core::{AssistantBackend, SessionStore};
use std::sync::Arc;
use tracing::{info, warn};

pub struct Provisioner<B, S>
where
    B: AssistantBackend,
    S: SessionStore,
{
    backend: B,
    store: S,
    readiness: Arc<SiteReadiness>,
}

/// Outcome of the deactivation sweep.
#[derive(Debug, Default)]
pub struct DeactivationReport {
    pub cleared: usize,
    /// (user id, error) pairs for sessions that could not be cleared
    pub failures: Vec<(String, String)>,
}

impl<B, S> Provisioner<B, S>
where
    B: AssistantBackend,
    S: SessionStore,
{
    pub fn new(backend: B, store: S, readiness: Arc<SiteReadiness>) -> Self {
        Self {
            backend,
            store,
            readiness,
        }
    }

    /// One-shot provisioning check. On success the returned
    /// `database_present` value becomes the readiness flag; any backend
    /// error aborts activation with the flag still unset.
    pub async fn activate(&self, site_url: &str) -> anyhow::Result<bool> {
        let present = self
            .backend
            .provision_site(site_url)
            .await
            .map_err(|e| anyhow::anyhow!("activation aborted: {e}"))?;

        self.readiness.set(present);
        if present {
            info!("Backend database present for {site_url}; chat enabled");
        } else {
            warn!("Backend has no database for {site_url}; chat stays disabled");
        }
        Ok(present)
    }

    /// Clear the readiness flag, then sweep every stored user session.
    ///
    /// Each clear runs under that user's lock, so a turn that passed the
    /// readiness gate before the flag dropped finishes first and its save
    /// is then destroyed, instead of re-persisting the row after the sweep.
    pub async fn deactivate(&self) -> anyhow::Result<DeactivationReport> {
        self.readiness.clear();

        let users = self.store.list_users().await?;
        info!("Deactivating: clearing {} stored sessions", users.len());

        let mut report = DeactivationReport::default();
        for user_id in users {
            let lock = self.store.user_lock(&user_id);
            let _guard = lock.lock().await;
            match self.store.clear(&user_id).await {
                Ok(()) => report.cleared += 1,
                Err(e) => {
                    warn!("Failed to clear session for {user_id}: {e}");
                    report.failures.push((user_id, e.to_string()));
                }
            }
        }

        Ok(report)
    }
}
