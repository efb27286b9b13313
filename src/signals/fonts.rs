// src/signals/fonts.rs
// Font detection by box-metric comparison against generic baselines.

use crate::signals::collector::EnvironmentProbe;

/// Generic families every renderer can satisfy. A candidate font counts as
/// detected only when its rendering differs from all three.
pub const BASELINE_FAMILIES: [&str; 3] = ["monospace", "sans-serif", "serif"];

/// Fonts probed on every page load. Ordinary desktop fonts on purpose:
/// detecting none of these is itself a signal.
pub const CANDIDATE_FONTS: &[&str] = &[
    "Arial",
    "Arial Black",
    "Calibri",
    "Cambria",
    "Comic Sans MS",
    "Consolas",
    "Courier New",
    "Georgia",
    "Helvetica",
    "Impact",
    "Lucida Console",
    "Palatino Linotype",
    "Segoe UI",
    "Tahoma",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
];

/// Measured box of the fixed test string under one font stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Detects available fonts. For each candidate the host measures the test
/// string rendered as `"<candidate>", <baseline>`; identical metrics under
/// every baseline mean the candidate fell back and is absent. Measurement
/// failures degrade to "absent", never to an error.
pub fn detect_fonts(env: &impl EnvironmentProbe) -> Vec<String> {
    let mut baselines = Vec::with_capacity(BASELINE_FAMILIES.len());
    for family in BASELINE_FAMILIES {
        match env.measure_text(family) {
            Some(metrics) => baselines.push((family, metrics)),
            None => return Vec::new(),
        }
    }

    let mut detected = Vec::new();
    for candidate in CANDIDATE_FONTS {
        let mut differs_from_all = true;
        for (family, baseline) in &baselines {
            let stack = format!("\"{}\", {}", candidate, family);
            match env.measure_text(&stack) {
                Some(metrics) if metrics != *baseline => {}
                _ => {
                    differs_from_all = false;
                    break;
                }
            }
        }
        if differs_from_all {
            detected.push((*candidate).to_string());
        }
    }
    detected
}
