// src/events.rs
// Append-only log of blocked requests plus the aggregate stats the admin
// surface reads. Each event is written to its own immutable key
// (botlog:v1:<ts>-<nonce>) to avoid read-modify-write races; a prefixed key
// space needs no provisioning, so first use is race-free by construction.

use crate::store::{KeyValueStore, StoreError};
use chrono::{FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::env;

const EVENT_PREFIX: &str = "botlog:v1:";
const TOP_IPS_LIMIT: usize = 10;
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One blocked request. Immutable once written; removed only by clear().
/// blocked_at and created_at carry the identical instant, formatted in the
/// configured timezone; ts keeps the raw unix seconds for filtering.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BlockEvent {
    pub ip_address: String,
    pub user_agent: String,
    pub url: String,
    pub blocked_at: String,
    pub created_at: String,
    pub ts: i64,
}

impl BlockEvent {
    pub fn record(ip: &str, user_agent: &str, url: &str, tz: FixedOffset) -> Self {
        let now = Utc::now().with_timezone(&tz);
        let stamp = now.format(DATETIME_FORMAT).to_string();
        BlockEvent {
            ip_address: ip.to_string(),
            user_agent: user_agent.to_string(),
            url: url.to_string(),
            blocked_at: stamp.clone(),
            created_at: stamp,
            ts: now.timestamp(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IpCount {
    pub ip_address: String,
    pub count: u64,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct BlockStats {
    pub total_blocks: u64,
    pub today_blocks: u64,
    pub top_ips: Vec<IpCount>,
}

impl BlockStats {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "total_blocks": self.total_blocks,
            "today_blocks": self.today_blocks,
            "top_ips": self.top_ips,
        })
    }
}

/// Timezone used for every calendar-date comparison. A fixed offset parsed
/// from BOT_BLOCKER_UTC_OFFSET ("+03:00" style), falling back to the
/// process-local offset.
pub fn configured_timezone() -> FixedOffset {
    env::var("BOT_BLOCKER_UTC_OFFSET")
        .ok()
        .and_then(|v| parse_utc_offset(&v))
        .unwrap_or_else(|| Local::now().offset().fix())
}

pub(crate) fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1i32, &value[1..]),
        b'-' => (-1i32, &value[1..]),
        _ => (1i32, value),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (rest.parse::<i32>().ok()?, 0),
    };
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn event_key(ts: i64) -> String {
    format!("{}{}-{:016x}", EVENT_PREFIX, ts, rand::random::<u64>())
}

fn event_date(ts: i64, tz: FixedOffset) -> Option<NaiveDate> {
    tz.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive())
}

pub struct EventStore<'a, S: KeyValueStore> {
    store: &'a S,
    tz: FixedOffset,
}

impl<'a, S: KeyValueStore> EventStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        EventStore {
            store,
            tz: configured_timezone(),
        }
    }

    pub fn with_timezone(store: &'a S, tz: FixedOffset) -> Self {
        EventStore { store, tz }
    }

    pub fn timezone(&self) -> FixedOffset {
        self.tz
    }

    /// Appends one event under a fresh immutable key.
    pub fn append(&self, event: &BlockEvent) -> Result<(), StoreError> {
        let payload =
            serde_json::to_vec(event).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.store.set(&event_key(event.ts), &payload)
    }

    fn load_all(&self) -> Result<Vec<BlockEvent>, StoreError> {
        let keys = self.store.get_keys()?;
        let mut events = Vec::new();
        for key in keys {
            if !key.starts_with(EVENT_PREFIX) {
                continue;
            }
            if let Ok(Some(val)) = self.store.get(&key) {
                if let Ok(event) = serde_json::from_slice::<BlockEvent>(&val) {
                    events.push(event);
                }
                // Undecodable rows are skipped, not fatal.
            }
        }
        Ok(events)
    }

    /// Aggregate stats: total (optionally restricted to a calendar-date
    /// range), today's count, and the top blocked IPs. Store failure yields
    /// empty stats rather than an error - the admin page can always render.
    pub fn stats(&self, date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> BlockStats {
        let events = match self.load_all() {
            Ok(events) => events,
            Err(e) => {
                crate::log_line(&format!("[events] stats unavailable: {}", e));
                return BlockStats::default();
            }
        };

        let today = Utc::now().with_timezone(&self.tz).date_naive();
        let mut total = 0u64;
        let mut today_count = 0u64;
        let mut per_ip: HashMap<String, u64> = HashMap::new();

        for event in &events {
            let date = event_date(event.ts, self.tz);
            let in_range = match (date_from, date_to, date) {
                (Some(from), Some(to), Some(d)) => d >= from && d <= to,
                (Some(from), None, Some(d)) => d >= from,
                (None, Some(to), Some(d)) => d <= to,
                _ => true,
            };
            if in_range {
                total += 1;
            }
            if date == Some(today) {
                today_count += 1;
            }
            *per_ip.entry(event.ip_address.clone()).or_insert(0) += 1;
        }

        let mut top_ips: Vec<IpCount> = per_ip
            .into_iter()
            .map(|(ip_address, count)| IpCount { ip_address, count })
            .collect();
        // Count descending, IP ascending for a stable tie order.
        top_ips.sort_by(|a, b| b.count.cmp(&a.count).then(a.ip_address.cmp(&b.ip_address)));
        top_ips.truncate(TOP_IPS_LIMIT);

        BlockStats {
            total_blocks: total,
            today_blocks: today_count,
            top_ips,
        }
    }

    /// Removes every logged event. Irreversible; failures are surfaced so the
    /// operator sees them (unlike append, which is best-effort).
    pub fn clear(&self) -> Result<(), StoreError> {
        let keys = self.store.get_keys()?;
        for key in keys {
            if key.starts_with(EVENT_PREFIX) {
                self.store.delete(&key)?;
            }
        }
        Ok(())
    }
}
