//! Simulated remote auth calls.
//!
//! The demo has no backend; login and signup are stand-ins for network
//! calls, modelled as a gateway trait with a fixed artificial latency and an
//! unconditional-success result. Swapping in a real client later means
//! replacing this one seam.
use std::thread;
use std::time::Duration;

use crate::model::User;
use crate::utils;

/// Artificial round-trip latency for the mock gateway.
pub const MOCK_LATENCY: Duration = Duration::from_millis(800);

pub trait AuthGateway: Send {
    /// Resolve an email to an authenticated user. The mock never fails and
    /// ignores the password entirely; emptiness checks belong to the caller.
    fn authenticate(&self, email: &str) -> anyhow::Result<User>;

    /// Establish a session from a supplied profile. No uniqueness or format
    /// checks at this layer.
    fn register(&self, name: &str, email: &str, phone: &str) -> anyhow::Result<User>;
}

pub struct MockAuthGateway {
    latency: Duration,
}

impl MockAuthGateway {
    pub fn new() -> Self {
        Self {
            latency: MOCK_LATENCY,
        }
    }

    /// Zero (or custom) latency, for tests.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for MockAuthGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGateway for MockAuthGateway {
    fn authenticate(&self, email: &str) -> anyhow::Result<User> {
        thread::sleep(self.latency);

        // placeholder profile around the supplied email
        Ok(User {
            id: utils::new_uuid_to_bech32("user")?,
            name: "Alex Rider".into(),
            email: email.to_owned(),
            phone: "+1234567890".into(),
        })
    }

    fn register(&self, name: &str, email: &str, phone: &str) -> anyhow::Result<User> {
        thread::sleep(self.latency);

        Ok(User {
            id: utils::new_uuid_to_bech32("user")?,
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticate_always_succeeds() {
        let gateway = MockAuthGateway::with_latency(Duration::ZERO);

        let user = gateway.authenticate("alex@example.com").unwrap();
        assert_eq!(user.email, "alex@example.com");
        assert_eq!(user.name, "Alex Rider");
        assert!(user.id.starts_with("user1"));
    }

    #[test]
    fn register_uses_supplied_profile() {
        let gateway = MockAuthGateway::with_latency(Duration::ZERO);

        let user = gateway
            .register("Jin Park", "jin@example.com", "+1987654321")
            .unwrap();
        assert_eq!(user.name, "Jin Park");
        assert_eq!(user.phone, "+1987654321");
    }
}
