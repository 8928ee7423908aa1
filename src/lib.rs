// src/lib.rs
// Entry point for the Bot Blocker Spin component.
// Classifies incoming requests by User-Agent and source IP, rejects
// automated traffic with a fixed 403 page, and logs every block.

#[cfg(test)]
mod events_tests;
#[cfg(test)]
mod dedup_tests;
#[cfg(test)]
mod test_support;

use once_cell::sync::Lazy;
use spin_sdk::http::{Request, Response};
use spin_sdk::http_component;
use spin_sdk::key_value::Store;
use std::env;

mod admin;      // Admin JSON API (settings, stats, log clearing)
mod auth;       // Bearer API key authorization
mod block_page; // Fixed 403 page for blocked clients
mod classifier; // Bot/not-bot decision logic
mod dedup;      // Once-per-request-signature guard
mod events;     // Append-only block log + stats
mod gate;       // Per-request orchestration
mod patterns;   // Built-in UA pattern catalog
mod settings;   // Operator settings over the KV store
mod store;      // Key-value storage abstraction

/// Shared across all requests handled by one process. Under Spin's
/// instance-per-request model this is fresh every time; the guard only
/// matters in long-lived hosts where one process sees repeated requests.
static DEDUP: Lazy<dedup::DedupGuard> = Lazy::new(dedup::DedupGuard::new);

pub(crate) fn log_line(msg: &str) {
    println!("{}", msg);
}

/// Returns true if forwarded IP headers should be trusted for this request.
/// If BOT_BLOCKER_FORWARDED_SECRET is set, require a matching
/// X-Bot-Blocker-Forwarded-Secret header - otherwise any client could smuggle
/// a loopback address past the classifier via X-Forwarded-For.
fn forwarded_ip_trusted(req: &Request) -> bool {
    match env::var("BOT_BLOCKER_FORWARDED_SECRET") {
        Ok(secret) => req
            .header("x-bot-blocker-forwarded-secret")
            .and_then(|v| v.as_str())
            .map(|v| v == secret)
            .unwrap_or(false),
        Err(_) => true,
    }
}

/// Extract the best available client IP from the request.
/// Prefers X-Forwarded-For (first entry), then X-Real-IP, when trusted.
pub(crate) fn extract_client_ip(req: &Request) -> String {
    if forwarded_ip_trusted(req) {
        if let Some(h) = req.header("x-forwarded-for") {
            let val = h.as_str().unwrap_or("");
            if let Some(ip) = val.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() && ip != "unknown" {
                    return ip.to_string();
                }
            }
        }
        if let Some(h) = req.header("x-real-ip") {
            let val = h.as_str().unwrap_or("");
            if !val.is_empty() && val != "unknown" {
                return val.to_string();
            }
        }
    }
    "unknown".to_string()
}

/// Main handler logic, testable as a plain Rust function.
pub fn handle_request_impl(req: &Request) -> Response {
    let path = req.path();

    // Admin API handles its own auth and store access.
    if path.starts_with("/admin") {
        return admin::handle_admin(req);
    }

    let ip = extract_client_ip(req);
    let ua = req
        .header("user-agent")
        .map(|v| v.as_str().unwrap_or(""))
        .unwrap_or("");
    let operator = auth::is_operator_authorized(req);

    let store = match Store::open_default() {
        Ok(s) => s,
        Err(_) => {
            // Fail-open: classification needs settings, so no store means
            // no blocking.
            log_line("[KV OUTAGE] Store unavailable; bot checks bypassed");
            return Response::new(200, "OK (bot blocker: store unavailable)");
        }
    };

    let settings = settings::SettingsStore::new(&store);
    let events = events::EventStore::new(&store);
    let request_gate = gate::RequestGate::new(&settings, &events, &DEDUP);

    match request_gate.handle(path, ua, &ip, operator) {
        gate::GateDecision::Blocked(response) => response,
        gate::GateDecision::Continue => Response::new(200, "OK"),
    }
}

#[http_component]
pub fn spin_entrypoint(req: Request) -> Response {
    handle_request_impl(&req)
}
