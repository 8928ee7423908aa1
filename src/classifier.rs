// src/classifier.rs
// Bot/not-bot decision for a (User-Agent, IP) pair.
// Pure function of the settings snapshot it was built from; no side effects.

use crate::patterns::{BROWSER_TOKENS, CATALOG, LOOPBACK_WHITELIST};
use crate::settings::Settings;

pub struct Classifier {
    enabled: bool,
    /// Allow-list entries pre-lowercased and trimmed; empties dropped.
    allow_list: Vec<String>,
}

impl Classifier {
    pub fn from_settings(settings: &Settings) -> Self {
        let allow_list = settings
            .allowed_bots
            .iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Classifier {
            enabled: settings.block_enabled,
            allow_list,
        }
    }

    fn ua_is_allowed(&self, ua_lower: &str) -> bool {
        self.allow_list.iter().any(|e| ua_lower.contains(e.as_str()))
    }

    /// True when the request should be treated as automated traffic.
    ///
    /// Order matters and short-circuits: disabled -> loopback whitelist ->
    /// empty UA -> allow-list -> blocking catalog rules.
    pub fn is_bot(&self, user_agent: &str, ip: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if LOOPBACK_WHITELIST.contains(&ip) {
            return false;
        }
        // Legitimate browsers always send a User-Agent.
        if user_agent.is_empty() {
            return true;
        }

        let ua_lower = user_agent.to_lowercase();

        // Allow-list wins over everything in the catalog.
        if self.ua_is_allowed(&ua_lower) {
            return false;
        }

        for rule in CATALOG {
            if !rule.blocks {
                continue;
            }
            if rule.substring == "bot" {
                // The bare token appears inside ordinary browser UAs, so it
                // only counts when no browser token is present. The
                // allow-list is re-checked in case a permitted bot's name
                // also survives the stricter test.
                if ua_lower.contains("bot")
                    && !BROWSER_TOKENS.iter().any(|t| ua_lower.contains(t))
                    && !self.ua_is_allowed(&ua_lower)
                {
                    return true;
                }
            } else if ua_lower.contains(rule.substring) {
                // A catalog substring contained in *any* allow-list entry is
                // suppressed, so allow-listing "googlebot" is not shadowed by
                // a rule on a shorter fragment. This is deliberately
                // permissive (allow-listing "robot" mutes the whole "bot"
                // family) and worth tightening in a future pass.
                let shadowed_by_allow = self
                    .allow_list
                    .iter()
                    .any(|e| e.contains(rule.substring));
                if !shadowed_by_allow {
                    return true;
                }
            }
        }

        false
    }
}
