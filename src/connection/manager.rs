//! Lazily established, self-repairing connection to the collector.

use log::{debug, warn};
use parking_lot::Mutex;

use super::{
    config::ConnectionConfig,
    error::ConnectionError,
    transport::{ActiveConnection, connect_transport},
    trust::{CaCache, TrustStatus},
};

struct ManagerState {
    connection: Option<ActiveConnection>,
    ca: CaCache,
    shut_down: bool,
}

impl ManagerState {
    /// Return the live connection, replacing a missing or dead one.
    fn ensure_connected(
        &mut self,
        config: &ConnectionConfig,
    ) -> Result<&mut ActiveConnection, ConnectionError> {
        if self.shut_down {
            return Err(ConnectionError::ShutDown);
        }
        let connection = match self.connection.take() {
            Some(existing) if existing.is_alive() => existing,
            stale => {
                if let Some(stale) = stale {
                    debug!("logship: connection to {} lost; reconnecting", config.address());
                    stale.close();
                }
                let policy = config.use_tls.then(|| self.ca.policy(config));
                let fresh = connect_transport(config, policy.as_ref())?;
                debug!(
                    "logship: connected to {} (tls: {})",
                    config.address(),
                    fresh.is_tls()
                );
                fresh
            }
        };
        Ok(self.connection.insert(connection))
    }
}

/// Owns the single transport to the collector and serialises access to it.
///
/// The connection is opened by the first [`write_line`](Self::write_line)
/// and re-opened by the first write after a failure. Liveness check,
/// reconnect and send all happen under one lock, so concurrent callers never
/// race to reconnect and their lines never interleave.
pub struct ConnectionManager {
    config: ConnectionConfig,
    state: Mutex<ManagerState>,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ManagerState {
                connection: None,
                ca: CaCache::new(),
                shut_down: false,
            }),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Send `payload` followed by `\n`, connecting first if necessary.
    ///
    /// A failed write drops the connection before returning, so the next call
    /// starts from a fresh connection attempt. No retry happens here.
    pub fn write_line(&self, payload: &str) -> Result<(), ConnectionError> {
        let mut line = Vec::with_capacity(payload.len() + 1);
        line.extend_from_slice(payload.as_bytes());
        line.push(b'\n');

        let mut state = self.state.lock();
        let connection = state.ensure_connected(&self.config)?;
        let sent = connection
            .write_all(&line)
            .and_then(|()| connection.flush());
        if let Err(err) = sent {
            warn!(
                "logship: write to {} failed: {err}; dropping connection",
                self.config.address()
            );
            if let Some(dead) = state.connection.take() {
                dead.close();
            }
            return Err(ConnectionError::Write(err));
        }
        Ok(())
    }

    /// Establish the connection now instead of on the next write.
    pub fn connect(&self) -> Result<(), ConnectionError> {
        self.state.lock().ensure_connected(&self.config).map(|_| ())
    }

    /// Whether a transport is currently held. A held transport may still turn
    /// out to be dead on the next write.
    pub fn is_connected(&self) -> bool {
        self.state.lock().connection.is_some()
    }

    /// Report how server certificates are verified, loading the CA if needed.
    pub fn trust_status(&self) -> TrustStatus {
        self.state.lock().ca.status(&self.config)
    }

    /// Release the transport. Safe to call repeatedly and from any thread.
    pub fn close(&self) {
        Self::release(&mut self.state.lock(), &self.config);
    }

    /// Release the transport for good. Later writes and connects fail with
    /// [`ConnectionError::ShutDown`] instead of reconnecting.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shut_down = true;
        Self::release(&mut state, &self.config);
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shut_down
    }

    fn release(state: &mut ManagerState, config: &ConnectionConfig) {
        if let Some(connection) = state.connection.take() {
            debug!("logship: closing connection to {}", config.address());
            connection.close();
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("address", &self.config.address())
            .field("use_tls", &self.config.use_tls)
            .finish()
    }
}
