// src/auth.rs
// Operator authorization for the admin API. A single bearer API key supplied
// via BOT_BLOCKER_API_KEY; without a configured key the admin surface stays
// disabled. The same check doubles as the "authenticated operator" signal
// that bypasses the request gate.

use spin_sdk::http::Request;
use std::env;

const API_KEY_ENV: &str = "BOT_BLOCKER_API_KEY";
const INSECURE_DEFAULT_API_KEY: &str = "changeme";

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// True when a usable (non-default, non-empty) API key is configured.
pub fn is_api_key_configured() -> bool {
    match env::var(API_KEY_ENV) {
        Ok(key) => !key.is_empty() && key != INSECURE_DEFAULT_API_KEY,
        Err(_) => false,
    }
}

fn bearer_token(req: &Request) -> Option<String> {
    let header = req.header("authorization")?.as_str()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// True when the request carries the configured API key.
pub fn is_operator_authorized(req: &Request) -> bool {
    if !is_api_key_configured() {
        return false;
    }
    let expected = match env::var(API_KEY_ENV) {
        Ok(key) => key,
        Err(_) => return false,
    };
    match bearer_token(req) {
        Some(token) => constant_time_eq(&token, &expected),
        None => false,
    }
}
