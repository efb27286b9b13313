// src/classifier.rs
// Heuristic classification: signature lists, the suspicious-pattern score,
// and automation detection. Ordered checks, first match wins.

use serde::Serialize;

use crate::blacklist::BlacklistStore;
use crate::config::Config;
use crate::fingerprint::{FingerprintComponents, CANVAS_SENTINEL};
use crate::signals::automation;
use crate::store::KeyValueStore;

/// User-agent substrings of known bots and HTTP tooling.
pub const DEFAULT_BOT_SIGNATURES: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "curl",
    "wget",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "scrapy",
    "httpclient",
    "okhttp",
    "java/",
    "go-http-client",
    "libwww",
    "mechanize",
    "phantomjs",
    "headlesschrome",
    "puppeteer",
    "playwright",
    "selenium",
];

/// User-agent substrings of security scanners and pentest tooling.
pub const DEFAULT_SECURITY_TOOL_SIGNATURES: &[&str] = &[
    "burp",
    "nikto",
    "sqlmap",
    "nmap",
    "masscan",
    "zap",
    "nessus",
    "openvas",
    "acunetix",
    "metasploit",
    "wfuzz",
    "dirbuster",
    "gobuster",
    "w3af",
];

// The numerator can exceed the denominator: the UA/API mismatch slot adds a
// point for Chrome and for Firefox independently while the denominator stays
// at 8. Changing either constant changes which visitors clear the gate.
const SUSPICION_DENOMINATOR: f64 = 8.0;
const SUSPICION_THRESHOLD: f64 = 0.4;

/// Why a visitor was rejected. Serialized snake_case into attempt records
/// and the visit log.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    KnownBot,
    SecurityTool,
    Blacklisted,
    SuspiciousFingerprint,
    MissingChallengeResponse,
    HoneypotTripped,
    UnnaturalInteraction,
    AutomationDetected,
    EnvironmentCheckFailed,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::KnownBot => "known_bot",
            RejectReason::SecurityTool => "security_tool",
            RejectReason::Blacklisted => "blacklisted",
            RejectReason::SuspiciousFingerprint => "suspicious_fingerprint",
            RejectReason::MissingChallengeResponse => "missing_challenge_response",
            RejectReason::HoneypotTripped => "honeypot_tripped",
            RejectReason::UnnaturalInteraction => "unnatural_interaction",
            RejectReason::AutomationDetected => "automation_detected",
            RejectReason::EnvironmentCheckFailed => "environment_check_failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub blocked: bool,
    pub reason: Option<RejectReason>,
}

impl Verdict {
    fn blocked(reason: RejectReason) -> Self {
        Verdict {
            blocked: true,
            reason: Some(reason),
        }
    }

    fn allowed() -> Self {
        Verdict {
            blocked: false,
            reason: None,
        }
    }
}

/// Signature lists are lowercased once at construction; matching is
/// case-insensitive substring.
pub struct Classifier {
    bot_signatures: Vec<String>,
    security_tool_signatures: Vec<String>,
}

impl Classifier {
    pub fn from_config(cfg: &Config) -> Self {
        Classifier {
            bot_signatures: lowercase_all(&cfg.bot_signatures),
            security_tool_signatures: lowercase_all(&cfg.security_tool_signatures),
        }
    }

    /// Ordered checks, cheapest and most certain first: bot signatures,
    /// security tools, then the persisted blacklist. A visitor clearing all
    /// three is provisionally allowed but still subject to the
    /// suspicious-pattern score.
    pub fn classify<S: KeyValueStore>(
        &self,
        blacklist: &BlacklistStore<'_, S>,
        user_agent: &str,
        client_id: &str,
    ) -> Verdict {
        let ua = user_agent.to_ascii_lowercase();
        if matches_any(&ua, &self.bot_signatures) {
            return Verdict::blocked(RejectReason::KnownBot);
        }
        if matches_any(&ua, &self.security_tool_signatures) {
            return Verdict::blocked(RejectReason::SecurityTool);
        }
        if blacklist.is_blacklisted(client_id) {
            return Verdict::blocked(RejectReason::Blacklisted);
        }
        Verdict::allowed()
    }

    /// Fixed-slot suspicion score over a fixed denominator. Near-threshold
    /// results are noisy; callers treat this as a coarse gate, not a score.
    pub fn has_too_many_suspicious_patterns(&self, fp: &FingerprintComponents) -> bool {
        suspicion_ratio(fp) > SUSPICION_THRESHOLD
    }

    pub fn detect_automation(&self, fp: &FingerprintComponents, user_agent: &str) -> bool {
        automation::detect_automation(fp, user_agent)
    }
}

/// One point per tripped check, half for the pixel-ratio check, over the
/// fixed count of check slots.
pub(crate) fn suspicion_ratio(fp: &FingerprintComponents) -> f64 {
    let mut points = 0.0f64;
    if fp.detected_fonts.is_empty() {
        points += 1.0;
    }
    if fp.canvas == CANVAS_SENTINEL {
        points += 1.0;
    }
    if fp.webgl.vendor.is_none() && fp.webgl.renderer.is_none() {
        points += 1.0;
    }
    let ua = fp.user_agent_lower();
    if ua.contains("chrome") && !fp.vendor_global {
        points += 1.0;
    }
    if ua.contains("firefox") && !fp.firefox_global {
        points += 1.0;
    }
    if fp.languages.is_empty() {
        points += 1.0;
    }
    if !(fp.storage.local && fp.storage.session) {
        points += 1.0;
    }
    if let Some(dpr) = fp.device_pixel_ratio {
        if dpr.fract() == 0.0 {
            points += 0.5;
        }
    }
    if fp.plugins.as_ref().map_or(true, |p| p.is_empty()) {
        points += 1.0;
    }
    points / SUSPICION_DENOMINATOR
}

fn lowercase_all(signatures: &[String]) -> Vec<String> {
    signatures.iter().map(|s| s.to_ascii_lowercase()).collect()
}

fn matches_any(ua: &str, signatures: &[String]) -> bool {
    signatures.iter().any(|s| ua.contains(s.as_str()))
}
