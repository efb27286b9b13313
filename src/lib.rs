// src/lib.rs
// Core of the visitor gate: fingerprint collection, heuristic
// classification, blacklist escalation, and the page-load/submission flow.
// The hosting page owns the DOM, the challenge widget, and the actual
// navigation; it reaches this crate through the KeyValueStore,
// EnvironmentProbe, and DeceptionPresenter traits.

mod blacklist;   // Failed-attempt counter and blacklist escalation
mod classifier;  // Signature lists, suspicion scoring, automation checks
mod config;      // Config loading, env overrides, clamps
mod decoy;       // Decoy trap pages and the presenter contract
mod fingerprint; // Typed fingerprint components and the client identifier
mod flow;        // Per-page-load orchestration
mod interaction; // Interaction event channel and movement analysis
mod metrics;     // Best-effort KV counters
mod signals;     // Environment probes and signal collection
mod store;       // Key-value storage abstraction
mod token;       // Pass token mint/verify, fragment sanitization
mod visit_log;   // Bounded log of recent bot visits

#[cfg(test)]
mod test_support;

pub use blacklist::{
    AttemptOutcome, AttemptReason, BlacklistEntry, BlacklistStore, FailedAttemptRecord,
};
pub use classifier::{
    Classifier, RejectReason, Verdict, DEFAULT_BOT_SIGNATURES, DEFAULT_SECURITY_TOOL_SIGNATURES,
};
pub use config::Config;
pub use decoy::{choose_variant, random_variant, render_decoy_page, DeceptionPresenter, DecoyVariant};
pub use fingerprint::{
    derive_client_identifier, BatteryInfo, ConnectionInfo, FingerprintComponents, NavTiming,
    ScreenInfo, StorageSupport, WebGlInfo, CANVAS_SENTINEL,
};
pub use flow::{PageContext, PageOutcome, SubmissionInputs, SubmitOutcome, VerificationFlow};
pub use interaction::{
    evaluate, InteractionData, InteractionEvent, InteractionMonitor, InteractionPublisher,
    MovementSample,
};
pub use metrics::{increment, render_metrics, MetricName};
pub use signals::automation::{detect_automation, AUTOMATION_GLOBAL_MARKERS, HEADLESS_UA_MARKERS};
pub use signals::collector::{collect, EnvironmentProbe};
pub use signals::fonts::{detect_fonts, TextMetrics, CANDIDATE_FONTS};
pub use signals::probe::ProbeOutcome;
pub use store::KeyValueStore;
pub use token::{mint_pass_token, sanitize_identifier_fragment, verify_pass_token, PassToken};
pub use visit_log::{record_bot_visit, recent_visits, BotVisit, VISIT_LOG_LIMIT};
