// src/patterns.rs
// Built-in User-Agent pattern catalog.
// Substrings are lowercase and compared against a lowercased User-Agent.
// Operators cannot edit this table; the allow-list in settings overrides it.

/// A single catalog rule: a UA substring and whether matching it blocks.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub substring: &'static str,
    pub blocks: bool,
}

/// The full pattern catalog, built once. Search-engine crawlers are present
/// but inert by default so operators see them listed without blocking them.
pub const CATALOG: &[PatternRule] = &[
    // Search engines - never block by default
    PatternRule { substring: "googlebot", blocks: false },
    PatternRule { substring: "bingbot", blocks: false },
    PatternRule { substring: "yandexbot", blocks: false },
    PatternRule { substring: "baiduspider", blocks: false },
    // Social media fetchers
    PatternRule { substring: "facebookexternalhit", blocks: true },
    PatternRule { substring: "twitterbot", blocks: true },
    PatternRule { substring: "linkedinbot", blocks: true },
    PatternRule { substring: "whatsapp", blocks: true },
    PatternRule { substring: "telegrambot", blocks: true },
    // Generic automation markers
    PatternRule { substring: "bot", blocks: true },
    PatternRule { substring: "crawl", blocks: true },
    PatternRule { substring: "spider", blocks: true },
    PatternRule { substring: "scrape", blocks: true },
    PatternRule { substring: "curl", blocks: true },
    PatternRule { substring: "wget", blocks: true },
    PatternRule { substring: "python-requests", blocks: true },
    PatternRule { substring: "scraper", blocks: true },
    // Named crawlers
    PatternRule { substring: "slurp", blocks: true },
    PatternRule { substring: "duckduckbot", blocks: true },
    PatternRule { substring: "applebot", blocks: true },
    PatternRule { substring: "ia_archiver", blocks: true },
    PatternRule { substring: "archive", blocks: true },
];

/// Tokens that mark an ordinary browser UA. The generic "bot" rule only fires
/// when none of these is present, so Chrome/Mobile agents that happen to
/// embed "bot" somewhere are not misclassified.
pub const BROWSER_TOKENS: &[&str] = &["chrome", "firefox", "safari", "edge", "opera", "mobile"];

/// IPs that are never classified as bots, regardless of settings.
/// "localhost" is a hostname literal that will never equal a raw remote
/// address; it stays listed for operators who expect to see it here.
pub const LOOPBACK_WHITELIST: &[&str] = &["127.0.0.1", "::1", "localhost"];
