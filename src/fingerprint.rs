// src/fingerprint.rs
// Fingerprint components and the derived client identifier.
// One FingerprintComponents instance is collected per page load and is
// immutable afterwards; the classifier is its only consumer.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Fixed sentinel stored when the canvas probe is blocked or unsupported.
pub const CANVAS_SENTINEL: &str = "canvas_not_supported";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub color_depth: u8,
}

/// WebGL vendor/renderer pair. Both `None` means the probe hit its sentinel
/// (context unavailable or the debug extension was blocked).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WebGlInfo {
    pub vendor: Option<String>,
    pub renderer: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BatteryInfo {
    pub charging: bool,
    pub level: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectionInfo {
    pub effective_type: String,
    pub downlink: f64,
    pub rtt_ms: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageSupport {
    pub local: bool,
    pub session: bool,
    pub indexed_db: bool,
}

/// Coarse navigation timings, milliseconds relative to navigation start.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavTiming {
    pub dom_complete_ms: u64,
    pub load_event_ms: u64,
}

/// Signal bag for one page load. Fields are explicitly optional where the
/// underlying probe can come back empty; run-to-run drift (canvas noise,
/// timing jitter) is expected and tolerated downstream.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FingerprintComponents {
    pub user_agent: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub platform: Option<String>,
    pub vendor: Option<String>,
    pub screen: Option<ScreenInfo>,
    pub device_pixel_ratio: Option<f64>,
    pub hardware_concurrency: Option<u32>,
    pub device_memory_gb: Option<f64>,
    pub timezone_offset_minutes: Option<i32>,
    pub cookies_enabled: Option<bool>,
    pub do_not_track: Option<String>,
    pub max_touch_points: Option<u32>,
    /// Canvas render hash, or [`CANVAS_SENTINEL`] when blocked.
    pub canvas: String,
    #[serde(default)]
    pub webgl: WebGlInfo,
    #[serde(default)]
    pub detected_fonts: Vec<String>,
    #[serde(default)]
    pub audio_codecs: Vec<String>,
    #[serde(default)]
    pub video_codecs: Vec<String>,
    pub battery: Option<BatteryInfo>,
    pub connection: Option<ConnectionInfo>,
    /// `None` when the plugin list could not be read at all.
    pub plugins: Option<Vec<String>>,
    #[serde(default)]
    pub storage: StorageSupport,
    #[serde(default)]
    pub webdriver: bool,
    /// Whether the vendor convenience global (`window.chrome`) exists.
    #[serde(default)]
    pub vendor_global: bool,
    /// Whether the Firefox-only install global exists.
    #[serde(default)]
    pub firefox_global: bool,
    /// Global property names matching automation markers, as collected.
    #[serde(default)]
    pub automation_globals: Vec<String>,
    /// `None` when the ad-bait probe never resolved.
    pub ad_blocker: Option<bool>,
    pub timing: Option<NavTiming>,
}

impl FingerprintComponents {
    pub fn user_agent_lower(&self) -> String {
        self.user_agent
            .as_deref()
            .unwrap_or("")
            .to_ascii_lowercase()
    }
}

/// Derives the semi-stable client identifier: stable attributes concatenated
/// and digested. Not cryptographically meaningful; collisions and drift
/// across sessions are expected and tolerated. Recomputed every page load,
/// never persisted itself.
pub fn derive_client_identifier(fp: &FingerprintComponents) -> String {
    let screen = fp
        .screen
        .map(|s| format!("{}x{}", s.width, s.height))
        .unwrap_or_default();
    let concurrency = fp
        .hardware_concurrency
        .map(|c| c.to_string())
        .unwrap_or_default();
    let memory = fp
        .device_memory_gb
        .map(|m| m.to_string())
        .unwrap_or_default();
    let parts: [&str; 8] = [
        fp.user_agent.as_deref().unwrap_or(""),
        fp.language.as_deref().unwrap_or(""),
        screen.as_str(),
        concurrency.as_str(),
        memory.as_str(),
        fp.platform.as_deref().unwrap_or(""),
        fp.vendor.as_deref().unwrap_or(""),
        fp.canvas.as_str(),
    ];
    let source = parts.join("|");
    let digest = Sha256::digest(source.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(digest)
}
