//! Dashboard server: HTTP + WebSocket push of the latest snapshot
//!
//! ```text
//!   poll task ──refresh()──> ServerState::publish ──broadcast──> /ws clients
//!                                   │
//!                                   └── latest ──> GET /api/status
//! ```
//!
//! Every poll still writes `status.json`, so file readers keep working while
//! the server runs. Clients only receive a push when the agent list changed;
//! a snapshot that differs in `timestamp` alone is stored but not broadcast.

pub mod routes;
pub mod ws;

use crate::data::Snapshot;
use crate::integrations::openclaw::SessionSource;
use crate::snapshot::{self, PollPaths};
use anyhow::{Context, Result};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch, RwLock};

pub const DEFAULT_PORT: u16 = 18899;

/// Poll interval for serve mode, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// Pending pushes a slow client may fall behind before it is resynced
const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// State shared by the poll task and every connection
pub struct ServerState {
    latest: RwLock<Option<Snapshot>>,
    updates: broadcast::Sender<String>,
    clients: AtomicUsize,
    static_root: PathBuf,
}

impl ServerState {
    pub fn new(static_root: PathBuf) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            latest: RwLock::new(None),
            updates,
            clients: AtomicUsize::new(0),
            static_root,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.updates.subscribe()
    }

    pub fn static_root(&self) -> &std::path::Path {
        &self.static_root
    }

    /// Connected WebSocket clients
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::SeqCst)
    }

    pub async fn latest(&self) -> Option<Snapshot> {
        self.latest.read().await.clone()
    }

    /// The latest snapshot as JSON, if a poll has completed
    pub async fn latest_json(&self) -> Option<String> {
        let latest = self.latest.read().await;
        latest.as_ref().and_then(|s| serde_json::to_string(s).ok())
    }

    /// Store `snapshot` as the latest and push it to clients if the agents changed.
    ///
    /// Returns whether the agent list differed from the previous snapshot.
    pub async fn publish(&self, snapshot: Snapshot) -> bool {
        let mut latest = self.latest.write().await;

        let changed = latest
            .as_ref()
            .map_or(true, |previous| previous.agents != snapshot.agents);

        let receivers = self.updates.receiver_count();
        if changed && receivers > 0 {
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    tracing::info!("Status changed, broadcasting to {} clients", receivers);
                    let _ = self.updates.send(json);
                }
                Err(e) => tracing::warn!("Could not encode snapshot: {}", e),
            }
        }

        *latest = Some(snapshot);
        changed
    }

    fn client_connected(&self) -> usize {
        self.clients.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn client_disconnected(&self) -> usize {
        self.clients.fetch_sub(1, Ordering::SeqCst).saturating_sub(1)
    }
}

/// Bind `addr` and serve until `shutdown` flips to true.
pub async fn serve(
    addr: SocketAddr,
    paths: PollPaths,
    source: Arc<dyn SessionSource>,
    poll_interval: Duration,
    static_root: PathBuf,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve_on(listener, paths, source, poll_interval, static_root, shutdown).await
}

/// Serve on an already-bound listener.
///
/// The first poll runs before any connection is handled and a config failure
/// there is fatal. Later poll failures are logged and the previous snapshot
/// keeps being served.
pub async fn serve_on(
    listener: TcpListener,
    paths: PollPaths,
    source: Arc<dyn SessionSource>,
    poll_interval: Duration,
    static_root: PathBuf,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let state = Arc::new(ServerState::new(static_root));

    let initial = snapshot::refresh(&paths, source.as_ref()).await?;
    let (active, total) = (initial.active_count(), initial.agents.len());
    state.publish(initial).await;

    let addr = listener.local_addr()?;
    println!("OpenClaw Virtual Office Server");
    println!("   http://{}", addr);
    println!("   WebSocket: ws://{}/ws", addr);
    println!("   Agents: {}/{} online", active, total);
    println!("   Polling every {}ms", poll_interval.as_millis());

    let poller = tokio::spawn(poll_loop(
        Arc::clone(&state),
        paths,
        source,
        poll_interval,
    ));

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { Ok::<_, Infallible>(routes::handle(state, req).await) }
                        });
                        if let Err(e) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .with_upgrades()
                            .await
                        {
                            tracing::debug!("Connection from {} ended: {}", peer, e);
                        }
                    });
                }
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    poller.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn poll_loop(
    state: Arc<ServerState>,
    paths: PollPaths,
    source: Arc<dyn SessionSource>,
    interval: Duration,
) {
    loop {
        tokio::time::sleep(interval).await;

        match snapshot::refresh(&paths, source.as_ref()).await {
            Ok(snapshot) => {
                state.publish(snapshot).await;
            }
            Err(e) => tracing::warn!("Poll failed, keeping previous status: {:#}", e),
        }
    }
}

/// Parse `POLL_INTERVAL` / `--poll-interval` milliseconds, falling back to the default.
pub fn parse_poll_interval(raw: Option<&str>) -> Duration {
    let millis = match raw.map(str::trim) {
        Some(value) => match value.parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                tracing::warn!(
                    "Invalid poll interval {:?}, using {}ms",
                    value,
                    DEFAULT_POLL_INTERVAL_MS
                );
                DEFAULT_POLL_INTERVAL_MS
            }
        },
        None => DEFAULT_POLL_INTERVAL_MS,
    };
    Duration::from_millis(millis)
}
