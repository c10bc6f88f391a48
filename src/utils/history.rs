//! Wallet history store: bounded, time-windowed record of observed transfers

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One observed transaction of a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTransaction {
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub signature: String,
}

/// Per-wallet history.
///
/// Invariants: `transaction_count == transactions.len()`, `first_seen <= last_seen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletHistoryEntry {
    pub wallet: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub transaction_count: usize,
    pub transactions: Vec<HistoryTransaction>,
}

/// Result of recording one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// False when the signature was already recorded for this wallet
    pub is_new: bool,
    pub transaction_count: usize,
}

/// Shared wallet history, safe to record into from several monitors at once.
///
/// Nothing is ever dropped except by [`HistoryStore::evict`]; the supervisor
/// sweep calls it periodically.
#[derive(Debug, Default)]
pub struct HistoryStore {
    wallets: DashMap<String, WalletHistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction sighting now
    pub fn record(&self, wallet: &str, tx: HistoryTransaction) -> RecordOutcome {
        self.record_at(wallet, tx, Utc::now())
    }

    /// Record a transaction sighting at `seen_at`
    pub fn record_at(&self, wallet: &str, tx: HistoryTransaction, seen_at: DateTime<Utc>) -> RecordOutcome {
        let mut entry = self
            .wallets
            .entry(wallet.to_string())
            .or_insert_with(|| WalletHistoryEntry {
                wallet: wallet.to_string(),
                first_seen: seen_at,
                last_seen: seen_at,
                transaction_count: 0,
                transactions: Vec::new(),
            });

        if seen_at > entry.last_seen {
            entry.last_seen = seen_at;
        }

        if entry.transactions.iter().any(|t| t.signature == tx.signature) {
            return RecordOutcome {
                is_new: false,
                transaction_count: entry.transaction_count,
            };
        }

        entry.transactions.push(tx);
        entry.transaction_count = entry.transactions.len();

        RecordOutcome {
            is_new: true,
            transaction_count: entry.transaction_count,
        }
    }

    /// Drop every wallet whose `last_seen` is older than `max_age_hours`
    pub fn evict(&self, max_age_hours: f64) -> usize {
        self.evict_at(max_age_hours, Utc::now())
    }

    /// Ages past the representable date range keep everything when positive
    /// and drop everything when negative.
    pub fn evict_at(&self, max_age_hours: f64, now: DateTime<Utc>) -> usize {
        let cutoff = ChronoDuration::try_milliseconds((max_age_hours * 3_600_000.0) as i64)
            .and_then(|max_age| now.checked_sub_signed(max_age));

        let before = self.wallets.len();
        match cutoff {
            Some(cutoff) => self.wallets.retain(|_, entry| entry.last_seen >= cutoff),
            None if max_age_hours > 0.0 => {}
            None => self.wallets.clear(),
        }
        let removed = before.saturating_sub(self.wallets.len());

        if removed > 0 {
            debug!(target: "HISTORY", "Evicted {} wallet(s) older than {}h", removed, max_age_hours);
        }
        removed
    }

    pub fn get(&self, wallet: &str) -> Option<WalletHistoryEntry> {
        self.wallets.get(wallet).map(|e| e.value().clone())
    }

    /// Read-only copy of every entry, most recently seen first
    pub fn snapshot(&self) -> Vec<WalletHistoryEntry> {
        let mut entries: Vec<_> = self.wallets.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        entries
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(signature: &str, amount: f64) -> HistoryTransaction {
        HistoryTransaction {
            timestamp: Utc::now(),
            amount,
            signature: signature.to_string(),
        }
    }

    #[test]
    fn test_record_creates_then_updates_entry() {
        let store = HistoryStore::new();
        let t0 = Utc::now();

        let first = store.record_at("W1", tx("s1", 60.0), t0);
        assert!(first.is_new);
        assert_eq!(first.transaction_count, 1);

        let later = t0 + ChronoDuration::minutes(5);
        store.record_at("W1", tx("s2", 10.0), later);
        let third = store.record_at("W1", tx("s3", 10.0), later);
        assert_eq!(third.transaction_count, 3);

        let entry = store.get("W1").unwrap();
        assert_eq!(entry.transaction_count, entry.transactions.len());
        assert_eq!(entry.first_seen, t0);
        assert_eq!(entry.last_seen, later);
        assert!(entry.first_seen <= entry.last_seen);
    }

    #[test]
    fn test_duplicate_signature_is_not_counted_twice() {
        let store = HistoryStore::new();
        store.record("W1", tx("s1", 60.0));
        let again = store.record("W1", tx("s1", 60.0));

        assert!(!again.is_new);
        assert_eq!(again.transaction_count, 1);
    }

    #[test]
    fn test_evict_removes_only_entries_older_than_cutoff() {
        let store = HistoryStore::new();
        let now = Utc::now();
        store.record_at("old", tx("a", 1.0), now - ChronoDuration::hours(30));
        store.record_at("edge", tx("b", 1.0), now - ChronoDuration::hours(23));
        store.record_at("fresh", tx("c", 1.0), now);

        assert_eq!(store.evict_at(24.0, now), 1);
        assert!(store.get("old").is_none());
        assert!(store.get("edge").is_some());
        assert!(store.get("fresh").is_some());

        // Nothing new recorded: second sweep removes nothing
        assert_eq!(store.evict_at(24.0, now), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_recent_sighting_keeps_old_wallet_alive() {
        let store = HistoryStore::new();
        let now = Utc::now();
        store.record_at("W1", tx("a", 1.0), now - ChronoDuration::hours(48));
        store.record_at("W1", tx("b", 1.0), now - ChronoDuration::hours(1));

        assert_eq!(store.evict_at(24.0, now), 0);
        assert_eq!(store.get("W1").unwrap().transaction_count, 2);
    }

    #[test]
    fn test_repeated_signature_refreshes_last_seen() {
        let store = HistoryStore::new();
        let now = Utc::now();
        store.record_at("W1", tx("a", 1.0), now - ChronoDuration::hours(23));

        let again = store.record_at("W1", tx("a", 1.0), now);
        assert!(!again.is_new);
        assert_eq!(store.get("W1").unwrap().last_seen, now);
        assert_eq!(store.evict_at(24.0, now + ChronoDuration::hours(2)), 0);
    }

    #[test]
    fn test_out_of_range_ages_do_not_panic() {
        let store = HistoryStore::new();
        let now = Utc::now();
        store.record_at("W1", tx("a", 1.0), now - ChronoDuration::hours(30));
        store.record_at("W2", tx("b", 1.0), now);

        assert_eq!(store.evict_at(1e12, now), 0);
        assert_eq!(store.evict_at(f64::MAX, now), 0);
        assert_eq!(store.len(), 2);

        assert_eq!(store.evict_at(-1e12, now), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_orders_by_last_seen() {
        let store = HistoryStore::new();
        let now = Utc::now();
        store.record_at("older", tx("a", 1.0), now - ChronoDuration::hours(2));
        store.record_at("newer", tx("b", 1.0), now);

        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].wallet, "newer");
        assert_eq!(snapshot[1].wallet, "older");
    }
}
