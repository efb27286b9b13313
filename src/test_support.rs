// src/test_support.rs
// Shared fixtures: stores, a stub environment, a recording presenter, and a
// clean fingerprint to mutate from.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::decoy::DeceptionPresenter;
use crate::fingerprint::{
    BatteryInfo, ConnectionInfo, FingerprintComponents, NavTiming, ScreenInfo, StorageSupport,
    WebGlInfo,
};
use crate::signals::collector::EnvironmentProbe;
use crate::signals::fonts::{TextMetrics, BASELINE_FAMILIES, CANDIDATE_FONTS};
use crate::signals::probe::ProbeOutcome;
use crate::store::KeyValueStore;

/// In-memory store. Everything here runs on one thread, so interior
/// mutability is enough.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    map: RefCell<HashMap<String, Vec<u8>>>,
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ()> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), ()> {
        self.map.borrow_mut().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), ()> {
        self.map.borrow_mut().remove(key);
        Ok(())
    }
}

/// Store whose every operation fails, for degradation tests.
pub(crate) struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, ()> {
        Err(())
    }
    fn set(&self, _key: &str, _value: &[u8]) -> Result<(), ()> {
        Err(())
    }
    fn delete(&self, _key: &str) -> Result<(), ()> {
        Err(())
    }
}

/// Presenter that records the reasons it was asked to show.
#[derive(Default)]
pub(crate) struct RecordingPresenter {
    shown: RefCell<Vec<String>>,
}

impl RecordingPresenter {
    pub(crate) fn shown(&self) -> Vec<String> {
        self.shown.borrow().clone()
    }
}

impl DeceptionPresenter for RecordingPresenter {
    fn show(&self, reason: &str) {
        self.shown.borrow_mut().push(reason.to_string());
    }
}

/// A fingerprint that trips none of the suspicion checks.
pub(crate) fn clean_fingerprint() -> FingerprintComponents {
    FingerprintComponents {
        user_agent: Some(StubEnvironment::CLEAN_UA.to_string()),
        language: Some("en-US".to_string()),
        languages: vec!["en-US".to_string(), "en".to_string()],
        platform: Some("Win32".to_string()),
        vendor: Some("Google Inc.".to_string()),
        screen: Some(ScreenInfo {
            width: 1920,
            height: 1080,
            color_depth: 24,
        }),
        device_pixel_ratio: Some(1.25),
        hardware_concurrency: Some(8),
        device_memory_gb: Some(8.0),
        timezone_offset_minutes: Some(-60),
        cookies_enabled: Some(true),
        do_not_track: None,
        max_touch_points: Some(0),
        canvas: "9f2d77c1e4".to_string(),
        webgl: WebGlInfo {
            vendor: Some("Google Inc. (NVIDIA)".to_string()),
            renderer: Some("ANGLE (NVIDIA GeForce RTX)".to_string()),
        },
        detected_fonts: vec!["Arial".to_string(), "Verdana".to_string()],
        audio_codecs: vec!["audio/ogg".to_string()],
        video_codecs: vec!["video/mp4".to_string()],
        battery: Some(BatteryInfo {
            charging: true,
            level: 0.82,
        }),
        connection: Some(ConnectionInfo {
            effective_type: "4g".to_string(),
            downlink: 10.0,
            rtt_ms: 50,
        }),
        plugins: Some(vec!["PDF Viewer".to_string()]),
        storage: StorageSupport {
            local: true,
            session: true,
            indexed_db: true,
        },
        webdriver: false,
        vendor_global: true,
        firefox_global: false,
        automation_globals: Vec::new(),
        ad_blocker: Some(false),
        timing: Some(NavTiming {
            dom_complete_ms: 420,
            load_event_ms: 460,
        }),
    }
}

/// How the stub answers text-measurement probes.
enum TextMetricsMode {
    /// Every stack measures the same box: no font is ever detected.
    Uniform(TextMetrics),
    /// Each candidate/baseline stack measures distinctly, except pairs
    /// forced back onto the baseline box.
    Distinct { equalized: Vec<(String, String)> },
    /// Measurement is unavailable entirely.
    Unavailable,
}

/// Configurable environment probe.
pub(crate) struct StubEnvironment {
    user_agent: Option<String>,
    language: Option<String>,
    languages: Vec<String>,
    platform: Option<String>,
    vendor: Option<String>,
    screen: Option<ScreenInfo>,
    device_pixel_ratio: Option<f64>,
    hardware_concurrency: Option<u32>,
    device_memory_gb: Option<f64>,
    timezone_offset_minutes: Option<i32>,
    cookies_enabled: Option<bool>,
    do_not_track: Option<String>,
    max_touch_points: Option<u32>,
    canvas_hash: Option<String>,
    webgl: Option<WebGlInfo>,
    audio_codecs: Vec<String>,
    video_codecs: Vec<String>,
    battery: Option<BatteryInfo>,
    connection: Option<ConnectionInfo>,
    plugins: Option<Vec<String>>,
    storage: StorageSupport,
    webdriver: bool,
    vendor_global: bool,
    firefox_global: bool,
    globals: Vec<String>,
    ad_bait: Option<bool>,
    timing: Option<NavTiming>,
    text_metrics: TextMetricsMode,
}

impl StubEnvironment {
    pub(crate) const CLEAN_UA: &'static str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    /// A healthy desktop Chrome with everything present.
    pub(crate) fn clean_browser() -> Self {
        let fp = clean_fingerprint();
        StubEnvironment {
            user_agent: fp.user_agent,
            language: fp.language,
            languages: fp.languages,
            platform: fp.platform,
            vendor: fp.vendor,
            screen: fp.screen,
            device_pixel_ratio: fp.device_pixel_ratio,
            hardware_concurrency: fp.hardware_concurrency,
            device_memory_gb: fp.device_memory_gb,
            timezone_offset_minutes: fp.timezone_offset_minutes,
            cookies_enabled: fp.cookies_enabled,
            do_not_track: fp.do_not_track,
            max_touch_points: fp.max_touch_points,
            canvas_hash: Some(fp.canvas),
            webgl: Some(fp.webgl),
            audio_codecs: fp.audio_codecs,
            video_codecs: fp.video_codecs,
            battery: fp.battery,
            connection: fp.connection,
            plugins: fp.plugins,
            storage: fp.storage,
            webdriver: false,
            vendor_global: true,
            firefox_global: false,
            globals: vec!["document".to_string(), "navigator".to_string()],
            ad_bait: Some(false),
            timing: fp.timing,
            text_metrics: TextMetricsMode::Distinct {
                equalized: Vec::new(),
            },
        }
    }

    /// A stripped headless environment: most probes blocked or empty.
    pub(crate) fn bare_automation() -> Self {
        let mut env = StubEnvironment::clean_browser();
        env.user_agent =
            Some("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string());
        env.languages = Vec::new();
        env.canvas_hash = None;
        env.webgl = None;
        env.plugins = Some(Vec::new());
        env.storage = StorageSupport::default();
        env.device_pixel_ratio = Some(1.0);
        env.webdriver = true;
        env.vendor_global = false;
        env.text_metrics = TextMetricsMode::Uniform(TextMetrics {
            width: 100.0,
            height: 20.0,
        });
        env
    }

    pub(crate) fn with_uniform_metrics(width: f64, height: f64) -> Self {
        let mut env = StubEnvironment::clean_browser();
        env.text_metrics = TextMetricsMode::Uniform(TextMetrics { width, height });
        env
    }

    pub(crate) fn with_distinct_candidate_metrics() -> Self {
        StubEnvironment::clean_browser()
    }

    pub(crate) fn without_text_metrics() -> Self {
        let mut env = StubEnvironment::clean_browser();
        env.text_metrics = TextMetricsMode::Unavailable;
        env
    }

    pub(crate) fn set_user_agent(&mut self, ua: &str) {
        self.user_agent = Some(ua.to_string());
    }

    pub(crate) fn block_canvas(&mut self) {
        self.canvas_hash = None;
    }

    pub(crate) fn block_webgl(&mut self) {
        self.webgl = None;
    }

    pub(crate) fn add_global(&mut self, name: &str) {
        self.globals.push(name.to_string());
    }

    pub(crate) fn skip_ad_bait(&mut self) {
        self.ad_bait = None;
    }

    pub(crate) fn equalize_candidate_with_baseline(&mut self, candidate: &str, baseline: &str) {
        if let TextMetricsMode::Distinct { equalized } = &mut self.text_metrics {
            equalized.push((candidate.to_string(), baseline.to_string()));
        }
    }

    fn baseline_metrics(family: &str) -> TextMetrics {
        let index = BASELINE_FAMILIES
            .iter()
            .position(|f| *f == family)
            .unwrap_or(0);
        TextMetrics {
            width: 100.0 + 5.0 * index as f64,
            height: 20.0 + index as f64,
        }
    }

    fn distinct_metrics(
        stack: &str,
        equalized: &[(String, String)],
    ) -> Option<TextMetrics> {
        // Bare baseline family.
        if let Some(index) = BASELINE_FAMILIES.iter().position(|f| *f == stack) {
            return Some(Self::baseline_metrics(BASELINE_FAMILIES[index]));
        }
        // `"<candidate>", <baseline>` stack.
        let (candidate, family) = stack.split_once(", ")?;
        let candidate = candidate.trim_matches('"');
        let candidate_index = CANDIDATE_FONTS.iter().position(|c| *c == candidate)?;
        if equalized
            .iter()
            .any(|(c, f)| c == candidate && f == family)
        {
            return Some(Self::baseline_metrics(family));
        }
        let family_index = BASELINE_FAMILIES
            .iter()
            .position(|f| *f == family)
            .unwrap_or(0);
        Some(TextMetrics {
            width: 200.0 + 10.0 * candidate_index as f64 + family_index as f64,
            height: 22.0 + candidate_index as f64,
        })
    }
}

impl EnvironmentProbe for StubEnvironment {
    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }
    fn language(&self) -> Option<String> {
        self.language.clone()
    }
    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }
    fn platform(&self) -> Option<String> {
        self.platform.clone()
    }
    fn vendor(&self) -> Option<String> {
        self.vendor.clone()
    }
    fn screen(&self) -> Option<ScreenInfo> {
        self.screen
    }
    fn device_pixel_ratio(&self) -> Option<f64> {
        self.device_pixel_ratio
    }
    fn hardware_concurrency(&self) -> Option<u32> {
        self.hardware_concurrency
    }
    fn device_memory_gb(&self) -> Option<f64> {
        self.device_memory_gb
    }
    fn timezone_offset_minutes(&self) -> Option<i32> {
        self.timezone_offset_minutes
    }
    fn cookies_enabled(&self) -> Option<bool> {
        self.cookies_enabled
    }
    fn do_not_track(&self) -> Option<String> {
        self.do_not_track.clone()
    }
    fn max_touch_points(&self) -> Option<u32> {
        self.max_touch_points
    }
    fn canvas_hash(&self) -> ProbeOutcome<String> {
        self.canvas_hash.clone().into()
    }
    fn webgl_info(&self) -> ProbeOutcome<WebGlInfo> {
        self.webgl.clone().into()
    }
    fn audio_codecs(&self) -> Vec<String> {
        self.audio_codecs.clone()
    }
    fn video_codecs(&self) -> Vec<String> {
        self.video_codecs.clone()
    }
    fn battery(&self) -> ProbeOutcome<BatteryInfo> {
        self.battery.into()
    }
    fn connection(&self) -> ProbeOutcome<ConnectionInfo> {
        self.connection.clone().into()
    }
    fn plugins(&self) -> Option<Vec<String>> {
        self.plugins.clone()
    }
    fn storage_support(&self) -> StorageSupport {
        self.storage
    }
    fn webdriver_flag(&self) -> bool {
        self.webdriver
    }
    fn vendor_global_present(&self) -> bool {
        self.vendor_global
    }
    fn firefox_global_present(&self) -> bool {
        self.firefox_global
    }
    fn global_property_names(&self) -> Vec<String> {
        self.globals.clone()
    }
    fn ad_bait_collapsed(&self) -> Option<bool> {
        self.ad_bait
    }
    fn navigation_timing(&self) -> Option<NavTiming> {
        self.timing
    }
    fn measure_text(&self, font_stack: &str) -> Option<TextMetrics> {
        match &self.text_metrics {
            TextMetricsMode::Uniform(metrics) => Some(*metrics),
            TextMetricsMode::Unavailable => None,
            TextMetricsMode::Distinct { equalized } => {
                Self::distinct_metrics(font_stack, equalized)
            }
        }
    }
}
