// src/events_tests.rs
// Unit tests for the block-event log and its aggregate stats.

#[cfg(test)]
mod tests {
    use crate::events::{parse_utc_offset, BlockEvent, EventStore};
    use crate::test_support::{BrokenStore, InMemoryStore};
    use chrono::{FixedOffset, NaiveDate, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn event_at(ip: &str, ts: i64) -> BlockEvent {
        let mut event = BlockEvent::record(ip, "TestBot/1.0", "/page", utc());
        event.ts = ts;
        event
    }

    #[test]
    fn test_append_then_stats() {
        let store = InMemoryStore::default();
        let events = EventStore::with_timezone(&store, utc());
        let event = BlockEvent::record("203.0.113.7", "TestBot/1.0", "/page", utc());
        assert_eq!(event.blocked_at, event.created_at);
        events.append(&event).unwrap();

        let stats = events.stats(None, None);
        assert_eq!(stats.total_blocks, 1);
        assert_eq!(stats.today_blocks, 1);
        assert_eq!(stats.top_ips.len(), 1);
        assert_eq!(stats.top_ips[0].ip_address, "203.0.113.7");
        assert_eq!(stats.top_ips[0].count, 1);
    }

    #[test]
    fn test_each_append_gets_its_own_key() {
        let store = InMemoryStore::default();
        let events = EventStore::with_timezone(&store, utc());
        for _ in 0..3 {
            events
                .append(&BlockEvent::record("203.0.113.7", "TestBot/1.0", "/page", utc()))
                .unwrap();
        }
        assert_eq!(store.key_count(), 3);
        assert_eq!(events.stats(None, None).total_blocks, 3);
    }

    #[test]
    fn test_today_excludes_yesterday() {
        let store = InMemoryStore::default();
        let events = EventStore::with_timezone(&store, utc());
        let now = Utc::now().timestamp();
        events.append(&event_at("203.0.113.7", now)).unwrap();
        events
            .append(&event_at("203.0.113.8", now - 2 * 86_400))
            .unwrap();

        let stats = events.stats(None, None);
        assert_eq!(stats.total_blocks, 2);
        assert_eq!(stats.today_blocks, 1);
    }

    #[test]
    fn test_date_range_filters_total_but_not_top_ips() {
        let store = InMemoryStore::default();
        let events = EventStore::with_timezone(&store, utc());
        let now = Utc::now().timestamp();
        events.append(&event_at("203.0.113.7", now)).unwrap();
        events
            .append(&event_at("203.0.113.8", now - 10 * 86_400))
            .unwrap();

        let today = Utc::now().date_naive();
        let stats = events.stats(Some(today), Some(today));
        assert_eq!(stats.total_blocks, 1);
        // Top IPs always rank the whole log; the date range only scopes totals.
        assert_eq!(stats.top_ips.len(), 2);
    }

    #[test]
    fn test_top_ips_ranked_capped_and_tie_stable() {
        let store = InMemoryStore::default();
        let events = EventStore::with_timezone(&store, utc());
        let now = Utc::now().timestamp();
        // 12 distinct IPs; .50 appears three times, .51 twice.
        for i in 0..12 {
            events
                .append(&event_at(&format!("198.51.100.{}", i), now))
                .unwrap();
        }
        for _ in 0..2 {
            events.append(&event_at("198.51.100.50", now)).unwrap();
        }
        events.append(&event_at("198.51.100.51", now)).unwrap();
        events.append(&event_at("198.51.100.50", now)).unwrap();
        events.append(&event_at("198.51.100.51", now)).unwrap();

        let stats = events.stats(None, None);
        assert_eq!(stats.top_ips.len(), 10);
        assert_eq!(stats.top_ips[0].ip_address, "198.51.100.50");
        assert_eq!(stats.top_ips[0].count, 3);
        assert_eq!(stats.top_ips[1].ip_address, "198.51.100.51");
        assert_eq!(stats.top_ips[1].count, 2);
        // Singles tie; ascending IP order keeps the tail stable.
        assert_eq!(stats.top_ips[2].ip_address, "198.51.100.0");
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = InMemoryStore::default();
        let events = EventStore::with_timezone(&store, utc());
        events
            .append(&BlockEvent::record("203.0.113.7", "TestBot/1.0", "/page", utc()))
            .unwrap();
        events.clear().unwrap();
        assert_eq!(events.stats(None, None).total_blocks, 0);
        assert_eq!(store.key_count(), 0);
    }

    #[test]
    fn test_clear_leaves_unrelated_keys() {
        let store = InMemoryStore::default();
        use crate::store::KeyValueStore;
        store.set("setting:bot-blocker:block_enabled", b"1").unwrap();
        let events = EventStore::with_timezone(&store, utc());
        events
            .append(&BlockEvent::record("203.0.113.7", "TestBot/1.0", "/page", utc()))
            .unwrap();
        events.clear().unwrap();
        assert_eq!(store.key_count(), 1);
    }

    #[test]
    fn test_broken_store_yields_empty_stats() {
        let events = EventStore::with_timezone(&BrokenStore, utc());
        let stats = events.stats(None, None);
        assert_eq!(stats.total_blocks, 0);
        assert_eq!(stats.today_blocks, 0);
        assert!(stats.top_ips.is_empty());
    }

    #[test]
    fn test_append_and_clear_fail_loudly_on_broken_store() {
        let events = EventStore::with_timezone(&BrokenStore, utc());
        let event = BlockEvent::record("203.0.113.7", "TestBot/1.0", "/page", utc());
        assert!(events.append(&event).is_err());
        assert!(events.clear().is_err());
    }

    #[test]
    fn test_undecodable_rows_are_skipped() {
        let store = InMemoryStore::default();
        use crate::store::KeyValueStore;
        store.set("botlog:v1:123-deadbeef", b"{corrupt").unwrap();
        let events = EventStore::with_timezone(&store, utc());
        events
            .append(&BlockEvent::record("203.0.113.7", "TestBot/1.0", "/page", utc()))
            .unwrap();
        assert_eq!(events.stats(None, None).total_blocks, 1);
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(
            parse_utc_offset("+03:00"),
            FixedOffset::east_opt(3 * 3600)
        );
        assert_eq!(
            parse_utc_offset("-05:30"),
            FixedOffset::east_opt(-(5 * 3600 + 30 * 60))
        );
        assert_eq!(parse_utc_offset("2"), FixedOffset::east_opt(2 * 3600));
        assert_eq!(parse_utc_offset("+00:00"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("+24:00"), None);
        assert_eq!(parse_utc_offset("Europe/Kyiv"), None);
        assert_eq!(parse_utc_offset(""), None);
    }

    #[test]
    fn test_timestamp_format() {
        let event = BlockEvent::record("203.0.113.7", "TestBot/1.0", "/page", utc());
        assert!(NaiveDate::parse_from_str(&event.blocked_at[..10], "%Y-%m-%d").is_ok());
        assert_eq!(event.blocked_at.len(), 19);
    }
}
