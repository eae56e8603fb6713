// ── Controller ──
//
// Owns the API client and the cached thermostat state. Setpoint requests
// are applied optimistically, debounced, and written one at a time; polled
// server state is reconciled against whatever the host asked for last.

use std::sync::Arc;

use tokio::sync::{Mutex, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use emodul_api::transport::{TlsMode, TransportConfig};
use emodul_api::{Credentials, ModuleClient, SessionManager};

use crate::config::{ControllerConfig, DeviceConfig, TlsVerification};
use crate::convert::parse_state;
use crate::error::CoreError;
use crate::model::{HeatingMode, ThermostatState};
use crate::scheduler::PollingScheduler;
use crate::setpoint::{clamp_and_step, confirms};

type WriteWaiter = oneshot::Sender<Result<f64, CoreError>>;

/// A setpoint waiting for its debounce timer.
struct PendingWrite {
    generation: u64,
    target_c: f64,
    cancel: CancellationToken,
    /// Every `request_set` caller coalesced into this write.
    waiters: Vec<WriteWaiter>,
}

/// Write bookkeeping. Only touched under `ControllerInner::sync`, never
/// held across a network call.
#[derive(Default)]
struct SyncState {
    write_in_flight: bool,
    pending: Option<PendingWrite>,
    /// Last target the host asked for, until the server reports it back.
    last_requested: Option<f64>,
    generation: u64,
    /// Last target above the off threshold, restored by `HeatingMode::Heat`.
    resume_target: Option<f64>,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for host adapters.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: ModuleClient,
    state: watch::Sender<ThermostatState>,
    sync: Mutex<SyncState>,
    cancel: CancellationToken,
    scheduler: Mutex<Option<PollingScheduler>>,
}

impl Controller {
    /// Validate the configuration and build the client. No network
    /// traffic happens until the first refresh or write.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let transport = TransportConfig {
            tls: match config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: config.timeout,
        };
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let client = ModuleClient::new(config.url.clone(), credentials, &transport)?;

        let (state, _) = watch::channel(ThermostatState::initial(&config.device));

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                state,
                sync: Mutex::new(SyncState::default()),
                cancel: CancellationToken::new(),
                scheduler: Mutex::new(None),
            }),
        })
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    fn device(&self) -> &DeviceConfig {
        &self.inner.config.device
    }

    /// The session shared by every request of this controller.
    pub fn session(&self) -> &Arc<SessionManager> {
        self.inner.client.session()
    }

    /// Latest cached state.
    pub fn state(&self) -> ThermostatState {
        *self.inner.state.borrow()
    }

    /// Receiver notified on every state change (optimistic or polled).
    pub fn subscribe(&self) -> watch::Receiver<ThermostatState> {
        self.inner.state.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the polling scheduler. The first refresh runs immediately.
    /// No-op when polling is disabled or already running.
    pub async fn start(&self) {
        let interval = self.device().poll_interval();
        if interval.is_zero() {
            debug!("polling disabled");
            return;
        }
        if self.inner.cancel.is_cancelled() {
            warn!("controller already shut down; not starting polling");
            return;
        }

        let mut slot = self.inner.scheduler.lock().await;
        if slot.as_ref().is_some_and(PollingScheduler::is_running) {
            return;
        }
        *slot = Some(PollingScheduler::spawn(
            self.clone(),
            interval,
            self.inner.cancel.child_token(),
        ));
        info!(interval_secs = interval.as_secs(), "polling started");
    }

    /// Stop polling, cancel any pending debounce and fail its callers.
    /// A write already on the wire is left to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let scheduler = self.inner.scheduler.lock().await.take();
        if let Some(scheduler) = scheduler {
            scheduler.shutdown().await;
        }

        let pending = self.inner.sync.lock().await.pending.take();
        if let Some(pending) = pending {
            debug!(target_c = pending.target_c, "dropping pending setpoint on shutdown");
            notify(pending.waiters, &Err(CoreError::ControllerDisconnected));
        }

        debug!("controller shut down");
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Read the device and reconcile with local requests.
    ///
    /// The local target wins while a write is in flight, a debounce is
    /// pending, or the last requested target is not yet reported back
    /// (more than half a step away). Otherwise the server target is
    /// adopted and the request marker cleared. The measured temperature
    /// always comes from the read. On error the cached state is untouched.
    pub async fn refresh(&self) -> Result<ThermostatState, CoreError> {
        let device = self.device();
        let tiles = self.inner.client.fetch_tiles().await?;
        let server = parse_state(
            &tiles,
            device.tile_id,
            device.temperature_divider,
            device.off_threshold_c,
        )?;

        let mut sync = self.inner.sync.lock().await;
        let local_target = self.inner.state.borrow().target_temperature_c;

        let unconfirmed = sync
            .last_requested
            .is_some_and(|requested| !confirms(requested, server.target_temperature_c, device.step_c));
        let hold = sync.write_in_flight || sync.pending.is_some() || unconfirmed;

        let target = if hold {
            debug!(
                local_target,
                server_target = server.target_temperature_c,
                in_flight = sync.write_in_flight,
                pending = sync.pending.is_some(),
                "keeping optimistic target"
            );
            local_target
        } else {
            sync.last_requested = None;
            server.target_temperature_c
        };

        // heating follows the displayed target, held or adopted
        let next = ThermostatState::new(
            server.current_temperature_c,
            target,
            device.off_threshold_c,
        );
        if next.heating {
            sync.resume_target = Some(target);
        }
        self.publish(next);
        Ok(next)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Request a new target temperature.
    ///
    /// The stepped value is published right away. The write itself waits
    /// for the debounce quiet period; a newer request replaces the pending
    /// value and inherits its callers. Resolves with the written target
    /// once the single coalesced write finishes.
    pub async fn request_set(&self, celsius: f64) -> Result<f64, CoreError> {
        if !celsius.is_finite() {
            return Err(CoreError::ValidationFailed {
                message: format!("target temperature must be finite, got {celsius}"),
            });
        }
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ControllerDisconnected);
        }

        let target = clamp_and_step(celsius, self.device());
        if (target - celsius).abs() > f64::EPSILON {
            debug!(requested = celsius, target, "adjusted requested setpoint");
        }
        self.queue_write(target).await
    }

    /// Publish `target` optimistically and (re-)arm the debounce. `target`
    /// is written as given.
    async fn queue_write(&self, target: f64) -> Result<f64, CoreError> {
        let device = self.device();
        let (tx, rx) = oneshot::channel();
        {
            let mut sync = self.inner.sync.lock().await;
            // shutdown may have drained `pending` while we waited for the lock
            if self.inner.cancel.is_cancelled() {
                return Err(CoreError::ControllerDisconnected);
            }

            let current = self.inner.state.borrow().current_temperature_c;
            let optimistic = ThermostatState::new(current, target, device.off_threshold_c);
            self.publish(optimistic);
            if optimistic.heating {
                sync.resume_target = Some(target);
            }
            sync.last_requested = Some(target);

            let mut waiters = match sync.pending.take() {
                Some(previous) => {
                    previous.cancel.cancel();
                    previous.waiters
                }
                None => Vec::new(),
            };
            waiters.push(tx);

            sync.generation += 1;
            let generation = sync.generation;
            let cancel = self.inner.cancel.child_token();
            sync.pending = Some(PendingWrite {
                generation,
                target_c: target,
                cancel: cancel.clone(),
                waiters,
            });

            tokio::spawn(debounce_task(self.clone(), generation, cancel));
        }

        rx.await.unwrap_or(Err(CoreError::ControllerDisconnected))
    }

    /// Switch between heat and off.
    ///
    /// Off writes the off threshold exactly, bypassing the step grid so an
    /// off-grid threshold never rounds up into a heating setpoint. Heat
    /// restores the last heating target (or `default_heat_c`) when currently
    /// off, otherwise does nothing.
    pub async fn set_heating_mode(&self, mode: HeatingMode) -> Result<(), CoreError> {
        match mode {
            HeatingMode::Off => {
                self.queue_write(self.device().off_threshold_c).await?;
            }
            HeatingMode::Heat => {
                if self.state().heating {
                    return Ok(());
                }
                let resume = self.inner.sync.lock().await.resume_target;
                let target = resume.unwrap_or(self.device().default_heat_c);
                self.request_set(target).await?;
            }
        }
        Ok(())
    }

    /// Debounce expiry for `generation`. Stale generations are ignored;
    /// a firing while another write is in flight is dropped.
    async fn fire_pending(&self, generation: u64) {
        let (target, waiters) = {
            let mut sync = self.inner.sync.lock().await;
            let Some(pending) = sync.pending.take_if(|p| p.generation == generation) else {
                return;
            };
            if sync.write_in_flight {
                warn!(
                    target_c = pending.target_c,
                    "setpoint write already in flight; dropping debounced write"
                );
                sync.last_requested = None;
                notify(pending.waiters, &Err(CoreError::WriteSkipped));
                return;
            }
            sync.write_in_flight = true;
            (pending.target_c, pending.waiters)
        };

        let device = self.device();
        let result = self
            .inner
            .client
            .write_setpoint(device.setpoint_ido, target, device.temperature_divider)
            .await
            .map(|()| target)
            .map_err(CoreError::from);

        {
            let mut sync = self.inner.sync.lock().await;
            sync.write_in_flight = false;
            // The server will never report a failed write back; let the
            // next poll show the truth unless a newer request is queued.
            if result.is_err() && sync.pending.is_none() {
                sync.last_requested = None;
            }
        }

        match &result {
            Ok(target_c) => info!(target_c, "setpoint written"),
            Err(e) => warn!(error = %e, target_c = target, "setpoint write failed"),
        }
        notify(waiters, &result);
    }

    fn publish(&self, next: ThermostatState) {
        let changed = self.inner.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(
                current_c = next.current_temperature_c,
                target_c = next.target_temperature_c,
                heating = next.heating,
                "state updated"
            );
        }
    }
}

fn notify(waiters: Vec<WriteWaiter>, result: &Result<f64, CoreError>) {
    for waiter in waiters {
        // A caller that stopped waiting is fine to skip.
        let _ = waiter.send(result.clone());
    }
}

async fn debounce_task(controller: Controller, generation: u64, cancel: CancellationToken) {
    let delay = controller.device().debounce();
    tokio::select! {
        biased;
        () = cancel.cancelled() => {}
        () = tokio::time::sleep(delay) => controller.fire_pending(generation).await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn controller() -> Controller {
        let config = ControllerConfig::new(
            Url::parse("http://127.0.0.1:9").expect("url"),
            "user",
            SecretString::from("pw".to_string()),
        );
        Controller::new(config).expect("controller")
    }

    #[tokio::test]
    async fn cancel_while_setter_waits_for_lock_fails_the_setter() {
        let controller = controller();
        let guard = controller.inner.sync.lock().await;

        let setter = tokio::spawn({
            let controller = controller.clone();
            async move { controller.request_set(22.0).await }
        });
        // Let the setter pass its early check and park on the lock.
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        controller.inner.cancel.cancel();
        drop(guard);

        let result = tokio::time::timeout(Duration::from_secs(1), setter)
            .await
            .expect("setter resolves")
            .expect("join");

        assert!(matches!(result, Err(CoreError::ControllerDisconnected)));
        assert!(controller.inner.sync.lock().await.pending.is_none());
    }
}
