// src/dedup.rs
// Once-per-key guard against duplicate block handling.
// Keyed by a hash of (ip, user-agent, url); lives only in process memory.
// Under Spin's instance-per-request model every request sees a fresh set, so
// the guard degenerates to "always process" - which is fine, it only exists
// to suppress duplicate log rows within one long-lived process.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Mutex;

/// Keep the set bounded; once full it is dropped wholesale. Losing dedup
/// history only risks an extra log row, never a wrong decision.
const MAX_TRACKED_KEYS: usize = 4096;

#[derive(Default)]
pub struct DedupGuard {
    seen: Mutex<HashSet<String>>,
}

pub fn request_key(ip: &str, user_agent: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(b"|");
    hasher.update(user_agent.as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

impl DedupGuard {
    pub fn new() -> Self {
        DedupGuard::default()
    }

    /// True only the first time this (ip, ua, url) triple is seen.
    /// Insert happens under one lock, so concurrent requests racing on the
    /// same key cannot both observe "first".
    pub fn should_process(&self, ip: &str, user_agent: &str, url: &str) -> bool {
        let key = request_key(ip, user_agent, url);
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if seen.len() >= MAX_TRACKED_KEYS {
            seen.clear();
        }
        seen.insert(key)
    }
}
