//! Timer-driven driver telemetry simulator.
//!
//! A process-local publish channel that, once started, fans a synthetic
//! [`DriverUpdate`] out to every subscriber each tick. Emissions are
//! independent of each other (no smoothing), a placeholder for a real
//! tracking feed. The feed shares no state with the store; the screen that
//! starts it owns stopping it again.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use rand::Rng;

pub const EMIT_INTERVAL: Duration = Duration::from_millis(2000);

// fixed base coordinate the fake driver wanders around
pub const BASE_LAT: f64 = 40.7128;
pub const BASE_LNG: f64 = -74.0060;

/// One synthetic telemetry sample. Consumers that only keep the latest value
/// lose nothing; there is no continuity between samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverUpdate {
    pub lat: f64,
    pub lng: f64,
    pub heading: f64, // degrees, [0, 360)
    pub speed_kmh: u32,
    pub eta_minutes: u32,
}

impl DriverUpdate {
    /// Draw a fresh sample: position within ±0.005 of the base coordinate,
    /// heading in [0, 360), speed in [20, 80) km/h, eta in [2, 12) minutes.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            lat: BASE_LAT + rng.gen_range(-0.005..0.005),
            lng: BASE_LNG + rng.gen_range(-0.005..0.005),
            heading: rng.gen_range(0.0..360.0),
            speed_kmh: rng.gen_range(20..80),
            eta_minutes: rng.gen_range(2..12),
        }
    }
}

/// Handle identifying one subscriber; unsubscribe is removal by token, not
/// by channel identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberToken(u64);

struct Registry {
    subscribers: Mutex<HashMap<u64, Sender<DriverUpdate>>>,
    next_token: AtomicU64,
}

impl Registry {
    fn emit(&self) {
        let update = DriverUpdate::random();
        let mut subscribers = self
            .subscribers
            .lock()
            .expect("telemetry subscriber registry poisoned");
        // every live subscriber sees this emission before the next tick;
        // ones whose receiver is gone are pruned here
        subscribers.retain(|_, tx| tx.send(update.clone()).is_ok());
    }
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct DriverFeed {
    registry: Arc<Registry>,
    interval: Duration,
    worker: Option<Worker>,
}

impl DriverFeed {
    pub fn new() -> Self {
        Self::with_interval(EMIT_INTERVAL)
    }

    /// Custom tick interval, mainly for tests.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            registry: Arc::new(Registry {
                subscribers: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(0),
            }),
            interval,
            worker: None,
        }
    }

    /// Begin periodic emission. Starting an already-running feed is a no-op.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let registry = Arc::clone(&self.registry);
        let interval = self.interval;
        let handle = std::thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => registry.emit(),
                    _ => break,
                }
            }
        });

        self.worker = Some(Worker { stop_tx, handle });
        tracing::debug!("driver feed started");
    }

    /// Cancel the periodic emission and wait for the timer thread to exit.
    /// Idempotent if already stopped.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = worker.stop_tx.send(());
        let _ = worker.handle.join();
        tracing::debug!("driver feed stopped");
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Register a subscriber. Every emission from now on lands on the
    /// returned receiver until the token is unsubscribed.
    pub fn subscribe(&self) -> (SubscriberToken, Receiver<DriverUpdate>) {
        let (tx, rx) = mpsc::channel();
        let token = self.registry.next_token.fetch_add(1, Ordering::Relaxed);
        self.registry
            .subscribers
            .lock()
            .expect("telemetry subscriber registry poisoned")
            .insert(token, tx);

        (SubscriberToken(token), rx)
    }

    /// Remove one subscriber; delivery to the others is unaffected. Returns
    /// false if the token was already gone.
    pub fn unsubscribe(&self, token: SubscriberToken) -> bool {
        self.registry
            .subscribers
            .lock()
            .expect("telemetry subscriber registry poisoned")
            .remove(&token.0)
            .is_some()
    }
}

impl Default for DriverFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DriverFeed {
    fn drop(&mut self) {
        // the timer thread must not outlive its owner
        self.stop();
    }
}
