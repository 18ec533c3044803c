//! Ordering properties of the message log.

use super::*;
use proptest::prelude::*;

fn stored(i: usize, timestamp: i64) -> StoredMessage {
    StoredMessage {
        id: format!("m-{i}"),
        conversation_id: "conv".to_string(),
        sender: "someone".to_string(),
        is_self: false,
        content: format!("content {i}"),
        timestamp,
        kind: "conversation".to_string(),
    }
}

fn insertion_index(message: &StoredMessage) -> usize {
    message
        .id
        .trim_start_matches("m-")
        .parse()
        .expect("test ids are m-<index>")
}

proptest! {
    /// Retrieval is ascending by timestamp, ties keep insertion order, and
    /// the result length is min(limit, total).
    #[test]
    fn recent_messages_sorted_with_stable_ties(
        timestamps in proptest::collection::vec(0i64..20, 1..40),
        limit in 1usize..50,
    ) {
        let db = Database::open_in_memory().unwrap();
        for (i, ts) in timestamps.iter().enumerate() {
            db.append_message(&stored(i, *ts)).unwrap();
        }

        let got = db.recent_messages("conv", limit).unwrap();
        prop_assert_eq!(got.len(), limit.min(timestamps.len()));

        for pair in got.windows(2) {
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
            if pair[0].timestamp == pair[1].timestamp {
                prop_assert!(insertion_index(&pair[0]) < insertion_index(&pair[1]));
            }
        }
    }

    /// A bounded read is exactly the suffix of the unbounded chronological
    /// sequence.
    #[test]
    fn bounded_read_is_a_suffix_of_the_timeline(
        timestamps in proptest::collection::vec(0i64..20, 1..40),
        limit in 1usize..50,
    ) {
        let db = Database::open_in_memory().unwrap();
        for (i, ts) in timestamps.iter().enumerate() {
            db.append_message(&stored(i, *ts)).unwrap();
        }

        let bounded = db.recent_messages("conv", limit).unwrap();
        let full = db.recent_messages("conv", timestamps.len()).unwrap();
        prop_assert_eq!(&bounded[..], &full[full.len() - bounded.len()..]);
    }

    /// Redelivering any prefix of the batch leaves the log unchanged.
    #[test]
    fn redelivery_never_duplicates(
        timestamps in proptest::collection::vec(0i64..20, 1..20),
        redeliver in 1usize..20,
    ) {
        let db = Database::open_in_memory().unwrap();
        for (i, ts) in timestamps.iter().enumerate() {
            db.append_message(&stored(i, *ts)).unwrap();
        }
        for (i, ts) in timestamps.iter().enumerate().take(redeliver) {
            prop_assert!(!db.append_message(&stored(i, *ts)).unwrap());
        }

        prop_assert_eq!(db.message_count("conv").unwrap(), timestamps.len() as i64);
    }
}
