//! Property-based tests for the wallet ledger invariant
//!
//! The one contract a careless edit could quietly break: after any sequence
//! of top-ups and bookings, the balance must equal the starting balance plus
//! the signed sum of the ledger entries recorded over that same sequence.

use std::sync::Arc;
use std::time::Duration;

use neonride::gateway::MockAuthGateway;
use neonride::model::TransactionKind;
use neonride::store::AppStore;
use proptest::prelude::*;
use tempfile::tempdir;

#[derive(Debug, Clone)]
enum WalletOp {
    TopUp(u64),
    Book(String, String),
}

/// Strategy to generate a random wallet-touching operation
fn wallet_op_strategy() -> impl Strategy<Value = WalletOp> {
    prop_oneof![
        (1u64..=100_000).prop_map(WalletOp::TopUp),
        ("[A-Z][a-z]{2,8}", "[A-Z][a-z]{2,8}")
            .prop_map(|(from, to)| WalletOp::Book(from, to)),
    ]
}

fn signed_sum(entries: &[neonride::model::Transaction]) -> i64 {
    entries
        .iter()
        .map(|entry| match entry.kind {
            TransactionKind::Credit => entry.amount_cents as i64,
            TransactionKind::Debit => -(entry.amount_cents as i64),
        })
        .sum()
}

proptest! {
    // each case opens its own sled db, so keep the count modest
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: balance stays in lockstep with the ledger for every
    /// interleaving of addFunds and bookRide.
    #[test]
    fn prop_balance_tracks_ledger(ops in prop::collection::vec(wallet_op_strategy(), 1..12)) {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(sled::open(temp_dir.path().join("prop.db")).unwrap());
        let mut store = AppStore::open_with_gateway(
            db,
            Box::new(MockAuthGateway::with_latency(Duration::ZERO)),
        );

        let initial_balance = store.balance_cents();
        let seeded_entries = store.snapshot().transactions.len();

        for op in &ops {
            match op {
                WalletOp::TopUp(amount) => {
                    store.add_funds(*amount).unwrap();
                }
                WalletOp::Book(from, to) => {
                    store.book_ride(from, to).unwrap();
                }
            }
        }

        let snapshot = store.snapshot();
        // ledger is append-only, newest first: exactly one entry per op
        prop_assert_eq!(snapshot.transactions.len(), seeded_entries + ops.len());
        let new_entries = &snapshot.transactions[..ops.len()];

        prop_assert_eq!(
            snapshot.balance_cents,
            initial_balance + signed_sum(new_entries)
        );
    }

    /// Property: every booked ride is priced in whole dollars within
    /// [10, 50), and its ledger debit matches the ride price exactly.
    #[test]
    fn prop_ride_prices_match_their_debits(
        endpoints in prop::collection::vec(("[A-Z][a-z]{2,8}", "[A-Z][a-z]{2,8}"), 1..6)
    ) {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(sled::open(temp_dir.path().join("prices.db")).unwrap());
        let mut store = AppStore::open_with_gateway(
            db,
            Box::new(MockAuthGateway::with_latency(Duration::ZERO)),
        );

        for (from, to) in &endpoints {
            let ride = store.book_ride(from, to).unwrap();

            prop_assert!((1_000..5_000).contains(&ride.price_cents));
            prop_assert_eq!(ride.price_cents % 100, 0);

            let snapshot = store.snapshot();
            let entry = &snapshot.transactions[0];
            prop_assert_eq!(entry.kind, TransactionKind::Debit);
            prop_assert_eq!(entry.amount_cents, ride.price_cents);
        }
    }
}
