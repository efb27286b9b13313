// src/signals/automation.rs
// Automation and headless-tooling markers.

use crate::fingerprint::FingerprintComponents;

/// User-agent substrings left behind by headless and scripted browsers.
pub const HEADLESS_UA_MARKERS: &[&str] = &[
    "headlesschrome",
    "phantomjs",
    "slimerjs",
    "electron",
    "puppeteer",
    "playwright",
    "selenium",
    "webdriver",
];

/// Substrings that flag an injected automation global.
pub const AUTOMATION_GLOBAL_MARKERS: &[&str] = &["selenium", "webdriver"];

/// Filters the host's global property names down to the ones matching an
/// automation marker. Case-insensitive substring match.
pub fn filter_automation_globals(names: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| {
            let lower = name.to_ascii_lowercase();
            AUTOMATION_GLOBAL_MARKERS
                .iter()
                .any(|marker| lower.contains(marker))
        })
        .cloned()
        .collect()
}

/// True when any automation signal fires: the navigation webdriver flag, a
/// headless user-agent marker, an injected automation global, or the vendor
/// convenience global missing while plugins and languages are both empty.
pub fn detect_automation(fp: &FingerprintComponents, user_agent: &str) -> bool {
    if fp.webdriver {
        return true;
    }
    let ua = user_agent.to_ascii_lowercase();
    if HEADLESS_UA_MARKERS.iter().any(|marker| ua.contains(marker)) {
        return true;
    }
    if !fp.automation_globals.is_empty() {
        return true;
    }
    let plugins_empty = fp.plugins.as_ref().map_or(true, |p| p.is_empty());
    !fp.vendor_global && plugins_empty && fp.languages.is_empty()
}
