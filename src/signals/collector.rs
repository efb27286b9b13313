// src/signals/collector.rs
// Signal collection over the host environment. Pure data gathering: every
// probe failure becomes a sentinel value and collection itself never fails.

use crate::fingerprint::{
    BatteryInfo, ConnectionInfo, FingerprintComponents, NavTiming, ScreenInfo, StorageSupport,
    WebGlInfo, CANVAS_SENTINEL,
};
use crate::signals::automation::filter_automation_globals;
use crate::signals::fonts::{self, TextMetrics};
use crate::signals::probe::ProbeOutcome;

/// Accessor surface over the DOM/navigator, implemented by the hosting
/// page's glue. Async boundaries on the host side (the canvas digest, the
/// battery query, the ~100 ms ad-bait delay) resolve before these accessors
/// are consulted, so `collect` always sees fully-settled signals.
///
/// Probes that transiently attach DOM nodes (text measurement, the ad bait)
/// must remove them before returning.
pub trait EnvironmentProbe {
    fn user_agent(&self) -> Option<String>;
    fn language(&self) -> Option<String>;
    fn languages(&self) -> Vec<String>;
    fn platform(&self) -> Option<String>;
    fn vendor(&self) -> Option<String>;
    fn screen(&self) -> Option<ScreenInfo>;
    fn device_pixel_ratio(&self) -> Option<f64>;
    fn hardware_concurrency(&self) -> Option<u32>;
    fn device_memory_gb(&self) -> Option<f64>;
    fn timezone_offset_minutes(&self) -> Option<i32>;
    fn cookies_enabled(&self) -> Option<bool>;
    fn do_not_track(&self) -> Option<String>;
    fn max_touch_points(&self) -> Option<u32>;
    fn canvas_hash(&self) -> ProbeOutcome<String>;
    fn webgl_info(&self) -> ProbeOutcome<WebGlInfo>;
    fn audio_codecs(&self) -> Vec<String>;
    fn video_codecs(&self) -> Vec<String>;
    fn battery(&self) -> ProbeOutcome<BatteryInfo>;
    fn connection(&self) -> ProbeOutcome<ConnectionInfo>;
    fn plugins(&self) -> Option<Vec<String>>;
    fn storage_support(&self) -> StorageSupport;
    fn webdriver_flag(&self) -> bool;
    fn vendor_global_present(&self) -> bool;
    fn firefox_global_present(&self) -> bool;
    fn global_property_names(&self) -> Vec<String>;
    /// `None` when the bait probe never ran (its delay did not elapse).
    fn ad_bait_collapsed(&self) -> Option<bool>;
    fn navigation_timing(&self) -> Option<NavTiming>;
    /// Measured box of the fixed test string under `font_stack`.
    fn measure_text(&self, font_stack: &str) -> Option<TextMetrics>;
}

/// Collects the full signal set for this page load. Never fails: blocked
/// probes land as sentinels (canvas) or empty/absent values.
pub fn collect(env: &impl EnvironmentProbe) -> FingerprintComponents {
    let canvas = env
        .canvas_hash()
        .or_sentinel(CANVAS_SENTINEL.to_string());
    let webgl = env.webgl_info().or_sentinel(WebGlInfo::default());
    let automation_globals = filter_automation_globals(&env.global_property_names());

    FingerprintComponents {
        user_agent: env.user_agent(),
        language: env.language(),
        languages: env.languages(),
        platform: env.platform(),
        vendor: env.vendor(),
        screen: env.screen(),
        device_pixel_ratio: env.device_pixel_ratio(),
        hardware_concurrency: env.hardware_concurrency(),
        device_memory_gb: env.device_memory_gb(),
        timezone_offset_minutes: env.timezone_offset_minutes(),
        cookies_enabled: env.cookies_enabled(),
        do_not_track: env.do_not_track(),
        max_touch_points: env.max_touch_points(),
        canvas,
        webgl,
        detected_fonts: fonts::detect_fonts(env),
        audio_codecs: env.audio_codecs(),
        video_codecs: env.video_codecs(),
        battery: env.battery().collected(),
        connection: env.connection().collected(),
        plugins: env.plugins(),
        storage: env.storage_support(),
        webdriver: env.webdriver_flag(),
        vendor_global: env.vendor_global_present(),
        firefox_global: env.firefox_global_present(),
        automation_globals,
        ad_blocker: env.ad_bait_collapsed(),
        timing: env.navigation_timing(),
    }
}
