// src/admin.rs
// Admin JSON API: settings read/write, block stats, log clearing.
// Protected by the bearer API key; every write is operator-initiated, so
// failures here are surfaced (unlike the request path, which stays silent).

use crate::events::EventStore;
use crate::settings::{normalize_block_enabled, SettingsStore, SettingsWire};
use crate::store::KeyValueStore;
use chrono::NaiveDate;
use serde_json::{json, Value};
use spin_sdk::http::{Method, Request, Response};
use spin_sdk::key_value::Store;

/// Valid admin endpoints; anything else is rejected before dispatch.
fn sanitize_path(path: &str) -> bool {
    matches!(
        path,
        "/admin" | "/admin/settings" | "/admin/stats" | "/admin/logs/clear"
    )
}

fn json_response(status: u16, body: Value) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .build()
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == name && !v.is_empty() {
            Some(v.to_string())
        } else {
            None
        }
    })
}

fn parse_date_param(query: &str, name: &str) -> Option<NaiveDate> {
    query_param(query, name).and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
}

/// Accepts the wire shape with a lenient block_enabled (bool, number or
/// string) and normalizes it to exactly "0"/"1". Non-string allow-list
/// entries are rejected rather than silently coerced.
fn parse_settings_body(body: &[u8]) -> Result<SettingsWire, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {}", e))?;
    let obj = value.as_object().ok_or("expected a JSON object")?;

    let block_enabled = obj
        .get("block_enabled")
        .map(normalize_block_enabled)
        .unwrap_or("0")
        .to_string();

    let allowed_bots = match obj.get("allowed_bots") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => list.push(s.to_string()),
                    None => return Err("allowed_bots entries must be strings".to_string()),
                }
            }
            list
        }
        Some(_) => return Err("allowed_bots must be an array".to_string()),
    };

    Ok(SettingsWire {
        block_enabled,
        allowed_bots,
    })
}

pub fn handle_admin(req: &Request) -> Response {
    if !crate::auth::is_api_key_configured() {
        return Response::new(503, "Admin API disabled: key not configured");
    }
    if !crate::auth::is_operator_authorized(req) {
        return Response::new(401, "Unauthorized: Invalid or missing API key");
    }

    let path = req.path();
    if !sanitize_path(path) {
        return Response::new(400, "Bad Request: Invalid admin endpoint");
    }

    let store = match Store::open_default() {
        Ok(s) => s,
        Err(_) => return Response::new(500, "Key-value store error"),
    };

    dispatch(req, path, &store)
}

fn dispatch<S: KeyValueStore>(req: &Request, path: &str, store: &S) -> Response {
    let settings = SettingsStore::new(store);
    let events = EventStore::new(store);

    match (path, req.method()) {
        ("/admin/settings", Method::Get) => {
            json_response(200, json!(settings.load_wire()))
        }
        ("/admin/settings", Method::Post) => {
            let wire = match parse_settings_body(req.body()) {
                Ok(wire) => wire,
                Err(msg) => return json_response(400, json!({ "error": msg })),
            };
            match settings.save(&wire) {
                Ok(()) => json_response(200, json!(settings.load_wire())),
                Err(e) => {
                    crate::log_line(&format!("[admin] settings save failed: {}", e));
                    json_response(500, json!({ "error": e.to_string() }))
                }
            }
        }
        ("/admin/stats", Method::Get) => {
            let query = req.query();
            let from = parse_date_param(query, "from");
            let to = parse_date_param(query, "to");
            json_response(200, events.stats(from, to).to_json())
        }
        ("/admin/logs/clear", Method::Post) => match events.clear() {
            Ok(()) => json_response(200, json!({ "cleared": true })),
            Err(e) => {
                crate::log_line(&format!("[admin] log clear failed: {}", e));
                json_response(500, json!({ "error": e.to_string() }))
            }
        },
        ("/admin", Method::Get) => Response::new(
            200,
            "Bot Blocker Admin API. Use /admin/settings, /admin/stats, /admin/logs/clear.",
        ),
        _ => Response::new(405, "Method Not Allowed"),
    }
}

#[cfg(test)]
pub(crate) fn dispatch_for_tests<S: KeyValueStore>(
    req: &Request,
    path: &str,
    store: &S,
) -> Response {
    dispatch(req, path, store)
}
