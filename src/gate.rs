// src/gate.rs
// Per-request orchestration: bypass rules, one classification per request,
// dedup-guarded logging, and the terminal 403 on a positive decision.
// Everything here is fail-open - a broken store or malformed settings must
// let the request through, never take the site down.

use crate::block_page;
use crate::classifier::Classifier;
use crate::dedup::DedupGuard;
use crate::events::{BlockEvent, EventStore};
use crate::settings::SettingsStore;
use crate::store::KeyValueStore;
use spin_sdk::http::Response;
use std::cell::Cell;

/// Path prefixes that never go through classification.
const BYPASS_PREFIXES: &[&str] = &["/admin", "/api", "/robots.txt", "/sitemap"];

/// Static-asset extensions that are always passed through.
const STATIC_EXTENSIONS: &[&str] = &[
    "ico", "png", "jpg", "jpeg", "gif", "css", "js", "woff", "woff2", "ttf", "svg",
];

pub enum GateDecision {
    Continue,
    Blocked(Response),
}

pub fn is_bypassed_path(path: &str) -> bool {
    if path == "/favicon.ico" {
        return true;
    }
    if BYPASS_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    let lower = path.to_lowercase();
    match lower.rsplit_once('.') {
        Some((_, ext)) => STATIC_EXTENSIONS.contains(&ext),
        None => false,
    }
}

fn forbidden_response() -> Response {
    Response::builder()
        .status(403)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(block_page::render_block_page())
        .build()
}

/// One gate per request. The latch guarantees at most one classification per
/// request lifecycle even when the gate is wired into several hook points.
pub struct RequestGate<'a, S: KeyValueStore, E: KeyValueStore> {
    settings: &'a SettingsStore<'a, S>,
    events: &'a EventStore<'a, E>,
    dedup: &'a DedupGuard,
    decided_bot: Cell<Option<bool>>,
}

impl<'a, S: KeyValueStore, E: KeyValueStore> RequestGate<'a, S, E> {
    pub fn new(
        settings: &'a SettingsStore<'a, S>,
        events: &'a EventStore<'a, E>,
        dedup: &'a DedupGuard,
    ) -> Self {
        RequestGate {
            settings,
            events,
            dedup,
            decided_bot: Cell::new(None),
        }
    }

    pub fn handle(
        &self,
        path: &str,
        user_agent: &str,
        ip: &str,
        operator_authenticated: bool,
    ) -> GateDecision {
        // Replay the first decision; the dedup guard already saw the triple,
        // so a replayed block produces no second log row.
        if let Some(was_bot) = self.decided_bot.get() {
            if was_bot {
                return GateDecision::Blocked(forbidden_response());
            }
            return GateDecision::Continue;
        }

        if is_bypassed_path(path) || operator_authenticated {
            self.decided_bot.set(Some(false));
            return GateDecision::Continue;
        }

        // Settings load degrades to defaults (blocking off) on store trouble,
        // so classification itself cannot fail the request.
        let settings = self.settings.load();
        let classifier = Classifier::from_settings(&settings);
        if !classifier.is_bot(user_agent, ip) {
            self.decided_bot.set(Some(false));
            return GateDecision::Continue;
        }

        self.decided_bot.set(Some(true));
        if self.dedup.should_process(ip, user_agent, path) {
            let event = BlockEvent::record(ip, user_agent, path, self.events.timezone());
            if let Err(e) = self.events.append(&event) {
                // Best-effort: the rejection response goes out regardless.
                crate::log_line(&format!("[gate] failed to log block event: {}", e));
            }
        }
        GateDecision::Blocked(forbidden_response())
    }
}
