//! NeonRide: client-side state engine for a mock ride-hailing demo app.
//!
//! Two cooperating components: [`store::AppStore`], the durable application
//! state container (session, rides, wallet ledger, car config, UI toggles,
//! referral data), and [`telemetry::DriverFeed`], a timer-driven simulator
//! that stands in for a live driver-tracking feed. The presentation layer is
//! an external consumer of both.

pub mod error;
pub mod gateway;
pub mod model;
pub mod persist;
pub mod store;
pub mod telemetry;
pub mod utils;
