// ── Synchronization supervisor ──
//
// Owns the canonical device collection and keeps it consistent with the
// registry by polling. Two cadences run concurrently on the same
// runtime:
//
//   - steady:   short interval, silent, always running. Normal refresh.
//   - recovery: longer interval, visible (busy flag), acted on only
//               while degraded. Signals "trying to reconnect" instead
//               of silently stalling.
//
// A third path handles on-demand silent polls requested by the command
// executor after a successful mutation. All three funnel through
// `poll_now`, and all outcomes pass the store's last-write-wins guard
// before they may move the connectivity state machine.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::health::{ConnectivityState, PollOutcome};
use crate::model::{Device, DeviceCollection, DeviceMode};
use crate::notice::Notice;
use crate::registry::Registry;
use crate::store::DeviceStore;

const NOTICE_CHANNEL_SIZE: usize = 64;
const SILENT_POLL_QUEUE: usize = 8;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Constructed at view-mount time with
/// [`spawn()`](Self::spawn) and torn down explicitly with
/// [`shutdown()`](Self::shutdown) — never a process-wide singleton.
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<SupervisorInner>,
}

struct SupervisorInner {
    registry: Arc<dyn Registry>,
    store: DeviceStore,
    health: watch::Sender<ConnectivityState>,
    /// Visible-busy indicator. Silent polls never touch it.
    busy: watch::Sender<bool>,
    notices: broadcast::Sender<Notice>,
    silent_poll_tx: mpsc::Sender<()>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Supervisor {
    /// Start the synchronization engine.
    ///
    /// Performs an initial foreground poll, then keeps both cadences
    /// running until [`shutdown()`](Self::shutdown).
    pub fn spawn(registry: Arc<dyn Registry>, config: SyncConfig) -> Self {
        let (health, _) = watch::channel(ConnectivityState::Healthy);
        // Busy from the start: the initial load is a foreground poll.
        let (busy, _) = watch::channel(true);
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        let (silent_poll_tx, silent_poll_rx) = mpsc::channel(SILENT_POLL_QUEUE);
        let cancel = CancellationToken::new();

        let supervisor = Self {
            inner: Arc::new(SupervisorInner {
                registry,
                store: DeviceStore::new(),
                health,
                busy,
                notices,
                silent_poll_tx,
                cancel: cancel.clone(),
                task_handles: Mutex::new(Vec::new()),
            }),
        };

        let handles = vec![
            tokio::spawn(steady_poll_task(
                supervisor.clone(),
                config.steady_interval,
                cancel.clone(),
            )),
            tokio::spawn(recovery_poll_task(
                supervisor.clone(),
                config.recovery_interval,
                cancel.clone(),
            )),
            tokio::spawn(silent_poll_task(supervisor.clone(), silent_poll_rx, cancel)),
        ];

        // Not contended at construction time.
        if let Ok(mut guard) = supervisor.inner.task_handles.try_lock() {
            *guard = handles;
        }

        supervisor
    }

    // ── State observation ────────────────────────────────────────

    /// Current collection snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<DeviceCollection> {
        self.inner.store.snapshot()
    }

    /// Subscribe to collection replacements.
    pub fn devices(&self) -> watch::Receiver<Arc<DeviceCollection>> {
        self.inner.store.subscribe()
    }

    /// Subscribe to connectivity state changes (for the banner).
    pub fn health(&self) -> watch::Receiver<ConnectivityState> {
        self.inner.health.subscribe()
    }

    /// Subscribe to the visible-busy indicator.
    pub fn busy(&self) -> watch::Receiver<bool> {
        self.inner.busy.subscribe()
    }

    /// Subscribe to one-shot user-facing notices.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Request an immediate out-of-band silent poll.
    ///
    /// Does not disturb the busy indicator or reset either cadence
    /// timer. Requests are coalesced if the queue is full — a queued
    /// poll already covers the newer request.
    pub fn request_silent_poll(&self) {
        let _ = self.inner.silent_poll_tx.try_send(());
    }

    /// Run one reconciliation poll to completion.
    ///
    /// This is the same path every cadence uses: allocate a sequence
    /// number, fetch, then apply (or clear) under the store's
    /// last-write-wins guard. The connectivity machine only moves when
    /// the store accepted this poll's outcome, so a stale response can
    /// never flip the banner either.
    pub async fn poll_now(&self, silent: bool) {
        // send_replace updates even with zero receivers, so a late
        // subscriber never reads a stale busy flag.
        if !silent {
            self.inner.busy.send_replace(true);
        }

        let seq = self.inner.store.begin_poll();
        let result = self.inner.registry.list().await;

        if !silent {
            self.inner.busy.send_replace(false);
        }

        let outcome = match result {
            Ok(devices) => {
                debug!(seq, count = devices.len(), "poll succeeded");
                if !self.inner.store.apply(seq, devices) {
                    debug!(seq, "poll result discarded (stale)");
                    return;
                }
                PollOutcome::Success
            }
            Err(e) => {
                debug!(seq, error = %e, "poll failed");
                // The view must not keep showing data we cannot vouch for.
                if !self.inner.store.clear(seq) {
                    return;
                }
                PollOutcome::Failure(e.to_string())
            }
        };

        let mut notice = None;
        self.inner.health.send_modify(|state| {
            let (next, n) = std::mem::take(state).apply(outcome);
            *state = next;
            notice = n;
        });

        if let Some(notice) = notice {
            match &notice {
                Notice::Reconnected => info!("registry reconnected"),
                Notice::ConnectionLost { message } => warn!(%message, "registry unreachable"),
                _ => {}
            }
            let _ = self.inner.notices.send(notice);
        }
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a write command against the registry.
    ///
    /// On success the returned notice is also broadcast and a silent
    /// poll is requested so the canonical collection catches up. On
    /// failure nothing local changes: the canonical state is only ever
    /// advanced by a successful poll (confirmed-only policy).
    pub async fn execute(&self, cmd: Command) -> Result<Notice, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        let notice = match cmd {
            Command::Create { mode } => {
                let created = self.inner.registry.create(mode).await?;
                Notice::DeviceCreated { name: created.name }
            }
            Command::SetSwitch { name, on } => {
                let updated = self.inner.registry.set_switch(&name, on).await?;
                Notice::SwitchSet {
                    name: updated.name,
                    on,
                }
            }
            Command::Rename { id, name } => {
                let from = self
                    .inner
                    .store
                    .get(&id)
                    .map_or_else(|| name.clone(), |d| d.name);
                let updated = self.inner.registry.rename(&id, &name).await?;
                Notice::Renamed {
                    from,
                    to: updated.name,
                }
            }
            Command::Delete { name } => {
                self.inner.registry.delete(&name).await?;
                Notice::Deleted { name }
            }
        };

        let _ = self.inner.notices.send(notice.clone());
        self.request_silent_poll();
        Ok(notice)
    }

    /// Create a device with the given mode.
    pub async fn create_device(&self, mode: DeviceMode) -> Result<Notice, CoreError> {
        self.execute(Command::Create { mode }).await
    }

    /// Toggle a controller's switch to the inverse of its current state.
    ///
    /// The canonical `switch_on` is NOT flipped locally — it changes on
    /// the next successful poll, so the view never shows a state the
    /// registry has not confirmed.
    pub async fn toggle_switch(&self, device: &Device) -> Result<Notice, CoreError> {
        self.execute(Command::SetSwitch {
            name: device.name.clone(),
            on: !device.switch_on,
        })
        .await
    }

    /// Rename a device. A no-op (zero registry calls) when the name is
    /// unchanged.
    pub async fn rename(
        &self,
        device: &Device,
        new_name: &str,
    ) -> Result<Option<Notice>, CoreError> {
        if device.name == new_name {
            return Ok(None);
        }
        self.execute(Command::Rename {
            id: device.id.clone(),
            name: new_name.to_owned(),
        })
        .await
        .map(Some)
    }

    /// Delete a device, keyed by name.
    pub async fn delete(&self, device: &Device) -> Result<Notice, CoreError> {
        self.execute(Command::Delete {
            name: device.name.clone(),
        })
        .await
    }

    // ── Teardown ─────────────────────────────────────────────────

    /// Stop all polling tasks and wait for them to finish.
    ///
    /// Must be called when the view goes away — an undisposed
    /// supervisor keeps polling a registry nobody is watching.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("supervisor shut down");
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Steady cadence: initial foreground load, then a silent refresh on
/// every tick regardless of connectivity state.
async fn steady_poll_task(
    supervisor: Supervisor,
    period: std::time::Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    supervisor.poll_now(false).await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                supervisor.poll_now(true).await;
            }
        }
    }
}

/// Recovery cadence: ticks continuously but only polls while degraded,
/// with the busy indicator visible so the operator sees the reconnect
/// attempt.
async fn recovery_poll_task(
    supervisor: Supervisor,
    period: std::time::Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if supervisor.inner.health.borrow().is_healthy() {
                    continue;
                }
                debug!("recovery poll");
                supervisor.poll_now(false).await;
            }
        }
    }
}

/// On-demand silent polls requested after successful mutations.
async fn silent_poll_task(
    supervisor: Supervisor,
    mut rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            request = rx.recv() => {
                if request.is_none() {
                    break;
                }
                supervisor.poll_now(true).await;
            }
        }
    }
}
