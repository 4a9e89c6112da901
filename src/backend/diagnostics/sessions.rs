/**
 * Session-scoped probe stores
 *
 * Every UI session gets its own set of stores, so single-flight and
 * target supersession apply per session and never across users. Sessions
 * are identified by the `X-Session-Id` header and dropped after a period
 * of inactivity by the cleanup task started in `server::init`.
 */

use crate::client::{
    ClientServerDiscovery, FederationClient, FederationReportSequence, ProbeClient, ProbeConfig,
    ProbeStore, StoreOptions, SupportInfoDiscovery,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// The stores of one UI session
pub struct SessionStores {
    pub client_server: ProbeStore<ClientServerDiscovery>,
    pub support: ProbeStore<SupportInfoDiscovery>,
    /// `None` when no federation-report API is configured
    pub federation: Option<ProbeStore<FederationReportSequence>>,
    last_seen: Mutex<Instant>,
}

impl SessionStores {
    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }
}

/// Everything needed to build a fresh set of stores
#[derive(Debug, Clone)]
pub struct StoreFactory {
    client: ProbeClient,
    config: ProbeConfig,
    federation: Option<FederationClient>,
    options: StoreOptions,
}

impl StoreFactory {
    pub fn new(client: ProbeClient, config: ProbeConfig) -> Self {
        let federation = match FederationClient::new(client.clone(), &config) {
            Ok(federation) => Some(federation),
            Err(err) => {
                tracing::warn!("Federation reports disabled: {}", err);
                None
            }
        };
        let options = StoreOptions {
            max_age: config.app().cache_max_age,
        };
        Self {
            client,
            config,
            federation,
            options,
        }
    }

    fn build(&self) -> SessionStores {
        SessionStores {
            client_server: ProbeStore::with_options(
                ClientServerDiscovery::new(self.client.clone(), self.config.clone()),
                self.options,
            ),
            support: ProbeStore::with_options(
                SupportInfoDiscovery::new(self.client.clone(), self.config.clone()),
                self.options,
            ),
            federation: self.federation.clone().map(|client| {
                ProbeStore::with_options(
                    FederationReportSequence::new(client, self.config.stats_opt_in()),
                    self.options,
                )
            }),
            last_seen: Mutex::new(Instant::now()),
        }
    }
}

/// Session id to stores
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Arc<SessionStores>>>>,
    factory: Arc<StoreFactory>,
}

impl SessionRegistry {
    pub fn new(factory: StoreFactory) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            factory: Arc::new(factory),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<SessionStores>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get or create the stores for a session, marking it active
    pub fn session(&self, id: Uuid) -> Arc<SessionStores> {
        let stores = Arc::clone(self.lock().entry(id).or_insert_with(|| {
            tracing::debug!("Creating probe stores for session {}", id);
            Arc::new(self.factory.build())
        }));
        stores.touch();
        stores
    }

    /// Drop sessions idle for longer than `max_idle`; returns how many
    pub fn cleanup_idle_sessions(&self, max_idle: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, stores| stores.idle_for() <= max_idle);
        before - sessions.len()
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.lock().len()
    }
}
