//! Utility functions for id generation and calendar dates

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Calendar day string, e.g. "2026-02-25". Rides and ledger entries are
/// dated by day only.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
