//! Service layer: the application state store.
//!
//! One process-wide container owning session, rides, wallet ledger, car
//! config, UI toggles and referral data. Every mutation runs to completion
//! on `&mut self`, persists the durable subset, and only then notifies
//! observers with a fresh [`Snapshot`]; a partially applied update is never
//! observable.
use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use uuid7::uuid7;

use crate::error::StoreError;
use crate::gateway::{AuthGateway, MockAuthGateway};
use crate::model::{
    CarConfig, CarConfigPatch, Referral, Ride, RideStatus, TimeStamp, Transaction, TransactionKind,
    User,
};
use crate::persist::{self, PersistedState};
use crate::utils;

/// Fixed driver label for newly booked rides.
pub const DRIVER_LABEL: &str = "AutoPilot";

/// Session-only fields, reset to defaults on every fresh load.
#[derive(Debug)]
pub struct Transient {
    pub current_ride: Option<Ride>,
    pub car_config: CarConfig,
    pub engine_started: bool,
}

impl Default for Transient {
    fn default() -> Self {
        Self {
            current_ride: None,
            car_config: CarConfig::for_local_clock(),
            engine_started: false,
        }
    }
}

/// The complete state at one instant, as delivered to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub balance_cents: i64,
    pub transactions: Vec<Transaction>,
    pub ride_history: Vec<Ride>,
    pub sound_enabled: bool,
    pub referral: Referral,
    pub current_ride: Option<Ride>,
    pub car_config: CarConfig,
    pub engine_started: bool,
}

/// Handle for one registered observer; unsubscribe is removal by token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObserverToken(u64);

type ObserverFn = Box<dyn FnMut(&Snapshot) + Send>;

pub struct AppStore {
    db: Arc<sled::Db>,
    auth: Box<dyn AuthGateway>,
    persistent: PersistedState,
    transient: Transient,
    observers: BTreeMap<u64, ObserverFn>,
    next_token: u64,
}

impl AppStore {
    /// Open the store against a sled instance with the default mock auth
    /// gateway, rehydrating the persisted subset (or seeding defaults).
    pub fn open(db: Arc<sled::Db>) -> Self {
        Self::open_with_gateway(db, Box::new(MockAuthGateway::new()))
    }

    pub fn open_with_gateway(db: Arc<sled::Db>, auth: Box<dyn AuthGateway>) -> Self {
        let persistent = persist::load_or_default(&db);
        Self {
            db,
            auth,
            persistent,
            transient: Transient::default(),
            observers: BTreeMap::new(),
            next_token: 0,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            user: self.persistent.user.clone(),
            is_authenticated: self.persistent.is_authenticated,
            balance_cents: self.persistent.balance_cents,
            transactions: self.persistent.transactions.clone(),
            ride_history: self.persistent.ride_history.clone(),
            sound_enabled: self.persistent.sound_enabled,
            referral: self.persistent.referral.clone(),
            current_ride: self.transient.current_ride.clone(),
            car_config: self.transient.car_config.clone(),
            engine_started: self.transient.engine_started,
        }
    }

    /// Register an observer; it is called with a fresh snapshot after every
    /// committed mutation, in token order.
    pub fn subscribe(&mut self, observer: impl FnMut(&Snapshot) + Send + 'static) -> ObserverToken {
        let token = self.next_token;
        self.next_token += 1;
        self.observers.insert(token, Box::new(observer));
        ObserverToken(token)
    }

    /// Returns false if the token was already gone.
    pub fn unsubscribe(&mut self, token: ObserverToken) -> bool {
        self.observers.remove(&token.0).is_some()
    }

    // persist the durable subset, then notify. Mutations call this after all
    // in-memory effects are applied, so observers see them as one update.
    fn commit(&mut self) -> anyhow::Result<()> {
        self.persistent.saved_at = TimeStamp::new();
        persist::save(&self.db, &self.persistent)?;
        self.notify();
        Ok(())
    }

    // for mutations touching session-only fields; nothing to persist
    fn commit_transient(&mut self) {
        self.notify();
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        for observer in self.observers.values_mut() {
            observer(&snapshot);
        }
    }

    /// Mock login: any credentials succeed after the gateway's artificial
    /// latency. The password is never inspected; emptiness checks live in
    /// the form layer.
    pub fn login(&mut self, email: &str, _password: &str) -> anyhow::Result<User> {
        let user = self.auth.authenticate(email)?;
        self.persistent.user = Some(user.clone());
        self.persistent.is_authenticated = true;
        self.commit()?;

        tracing::info!(email, "logged in");
        Ok(user)
    }

    /// Mock signup: unconditionally establishes a session from the supplied
    /// profile after the same artificial latency.
    pub fn signup(&mut self, name: &str, email: &str, phone: &str) -> anyhow::Result<User> {
        let user = self.auth.register(name, email, phone)?;
        self.persistent.user = Some(user.clone());
        self.persistent.is_authenticated = true;
        self.commit()?;

        tracing::info!(email, "signed up");
        Ok(user)
    }

    /// Clears the session only. Wallet, rides and referral data survive a
    /// logout by design, so demo state carries across sessions.
    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.persistent.user = None;
        self.persistent.is_authenticated = false;
        self.commit()?;

        tracing::info!("logged out");
        Ok(())
    }

    /// Book a ride: randomized price in [10, 50) dollars, today's date,
    /// fixed driver label. Sets the current ride, prepends it to history,
    /// debits the wallet and appends the matching ledger entry as one
    /// indivisible update.
    pub fn book_ride(&mut self, from: &str, to: &str) -> anyhow::Result<Ride> {
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(StoreError::EmptyEndpoint.into());
        }

        let price_cents = rand::thread_rng().gen_range(10u64..50) * 100;
        let date = utils::today();
        let ride = Ride {
            id: uuid7().to_string(),
            from: from.to_owned(),
            to: to.to_owned(),
            status: RideStatus::Active,
            date: date.clone(),
            price_cents,
            driver: DRIVER_LABEL.into(),
        };
        let entry = Transaction {
            id: uuid7().to_string(),
            kind: TransactionKind::Debit,
            amount_cents: price_cents,
            description: format!("Ride: {from} → {to}"),
            date,
        };

        self.transient.current_ride = Some(ride.clone());
        self.persistent.ride_history.insert(0, ride.clone());
        self.persistent.balance_cents -= price_cents as i64;
        self.persistent.transactions.insert(0, entry);
        self.commit()?;

        tracing::info!(ride_id = %ride.id, price_cents, "ride booked");
        Ok(ride)
    }

    /// Cancel a ride by id. Clears the current ride if it was the one. The
    /// debit stays on the ledger; cancellation forfeits payment.
    pub fn cancel_ride(&mut self, id: &str) -> anyhow::Result<()> {
        let Some(ride) = self
            .persistent
            .ride_history
            .iter_mut()
            .find(|ride| ride.id == id)
        else {
            return Err(StoreError::RideNotFound(id.to_owned()).into());
        };
        ride.status = RideStatus::Cancelled;

        if self
            .transient
            .current_ride
            .as_ref()
            .is_some_and(|current| current.id == id)
        {
            self.transient.current_ride = None;
        }
        self.commit()?;

        tracing::info!(ride_id = id, "ride cancelled");
        Ok(())
    }

    /// Top up the wallet and append the matching credit ledger entry.
    pub fn add_funds(&mut self, amount_cents: u64) -> anyhow::Result<Transaction> {
        if amount_cents == 0 {
            return Err(StoreError::ZeroAmount.into());
        }

        let entry = Transaction {
            id: uuid7().to_string(),
            kind: TransactionKind::Credit,
            amount_cents,
            description: "Added funds".into(),
            date: utils::today(),
        };
        self.persistent.balance_cents += amount_cents as i64;
        self.persistent.transactions.insert(0, entry.clone());
        self.commit()?;

        tracing::info!(amount_cents, "funds added");
        Ok(entry)
    }

    /// Shallow-merge a partial car config. Session-only, never persisted.
    pub fn update_car_config(&mut self, patch: CarConfigPatch) {
        self.transient.car_config.apply(patch);
        self.commit_transient();
    }

    pub fn toggle_sound(&mut self) -> anyhow::Result<bool> {
        self.persistent.sound_enabled = !self.persistent.sound_enabled;
        self.commit()?;
        Ok(self.persistent.sound_enabled)
    }

    /// One-way flag; there is no stop-engine operation.
    pub fn start_engine(&mut self) {
        if self.transient.engine_started {
            return;
        }
        self.transient.engine_started = true;
        self.commit_transient();
    }

    pub fn balance_cents(&self) -> i64 {
        self.persistent.balance_cents
    }

    pub fn is_authenticated(&self) -> bool {
        self.persistent.is_authenticated
    }

    pub fn current_ride(&self) -> Option<&Ride> {
        self.transient.current_ride.as_ref()
    }

    pub fn referral(&self) -> &Referral {
        &self.persistent.referral
    }
}
