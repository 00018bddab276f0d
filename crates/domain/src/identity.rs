//! Order numbers and the generators that mint them.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier shared by every line of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Wraps an existing order number.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderNumber {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Order number plus the instant it was minted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIdentity {
    pub order_number: OrderNumber,
    pub timestamp: DateTime<Utc>,
}

impl OrderIdentity {
    /// Returns the timestamp as an ISO-8601 (RFC 3339) string.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Source of order identities.
///
/// Every call must return an order number that is unique across all
/// concurrent sessions.
pub trait OrderIdGenerator: Send + Sync {
    fn next(&self) -> OrderIdentity;
}

fn time_prefix(now: &DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// `YYYYMMDDHHMMSS-<uuid v4>` order numbers.
///
/// The 122 random bits of the UUID make collisions negligible even when many
/// submissions land in the same second.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderIds;

impl RandomOrderIds {
    pub fn new() -> Self {
        Self
    }
}

impl OrderIdGenerator for RandomOrderIds {
    fn next(&self) -> OrderIdentity {
        let timestamp = Utc::now();
        let order_number = format!("{}-{}", time_prefix(&timestamp), Uuid::new_v4().simple());
        OrderIdentity {
            order_number: OrderNumber(order_number),
            timestamp,
        }
    }
}

/// `YYYYMMDDHHMMSS-<counter>` order numbers from an atomic counter.
///
/// Unique within one process; use with a single writer process.
#[derive(Debug, Default)]
pub struct SequentialOrderIds {
    counter: AtomicU64,
}

impl SequentialOrderIds {
    /// Starts counting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues after `last`, e.g. the highest number seen in the store.
    pub fn starting_after(last: u64) -> Self {
        Self {
            counter: AtomicU64::new(last),
        }
    }
}

impl OrderIdGenerator for SequentialOrderIds {
    fn next(&self) -> OrderIdentity {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let timestamp = Utc::now();
        OrderIdentity {
            order_number: OrderNumber(format!("{}-{seq:06}", time_prefix(&timestamp))),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_random_ids_are_unique_within_one_second() {
        let ids = RandomOrderIds::new();
        let numbers: HashSet<_> = (0..10_000).map(|_| ids.next().order_number).collect();
        assert_eq!(numbers.len(), 10_000);
    }

    #[test]
    fn test_random_id_format() {
        let identity = RandomOrderIds::new().next();
        let (prefix, suffix) = identity.order_number.as_str().split_once('-').unwrap();
        assert_eq!(prefix.len(), 14);
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(suffix.len(), 32);
        assert_eq!(prefix, identity.timestamp.format("%Y%m%d%H%M%S").to_string());
    }

    #[test]
    fn test_sequential_ids_increment() {
        let ids = SequentialOrderIds::starting_after(41);
        let first = ids.next();
        let second = ids.next();
        assert!(first.order_number.as_str().ends_with("-000042"));
        assert!(second.order_number.as_str().ends_with("-000043"));
    }

    #[test]
    fn test_sequential_ids_unique_across_threads() {
        let ids = Arc::new(SequentialOrderIds::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || {
                    (0..500)
                        .map(|_| {
                            let n = ids.next().order_number;
                            n.as_str().rsplit('-').next().unwrap().to_string()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for seq in handle.join().unwrap() {
                assert!(seen.insert(seq));
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn test_timestamp_iso_is_rfc3339() {
        let identity = RandomOrderIds::new().next();
        let parsed = DateTime::parse_from_rfc3339(&identity.timestamp_iso()).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), identity.timestamp);
    }
}
