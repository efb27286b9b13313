// src/flow.rs
// Per-page-load orchestration: blacklist gate, fingerprint collection,
// suspicion gate, then the submission checks. Checks run in order of cost
// and certainty, returning early on the first failure; every failure path
// ends at the decoy rather than an honest error.

use crate::blacklist::{AttemptOutcome, BlacklistStore};
use crate::classifier::{Classifier, RejectReason};
use crate::config::Config;
use crate::decoy::DeceptionPresenter;
use crate::fingerprint::{derive_client_identifier, FingerprintComponents, CANVAS_SENTINEL};
use crate::interaction::{self, InteractionData};
use crate::metrics::{self, MetricName};
use crate::signals::collector::{self, EnvironmentProbe};
use crate::store::KeyValueStore;
use crate::token::{mint_pass_token, sanitize_identifier_fragment};
use crate::visit_log;

/// What the page does next after the load-time gate.
#[derive(Debug)]
pub enum PageOutcome {
    /// Arm the form; keep the context for the submission checks.
    Proceed(PageContext),
    /// The decoy was shown; nothing else happens on this page.
    Trapped { reason: RejectReason },
}

#[derive(Debug, Clone)]
pub struct PageContext {
    pub client_id: String,
    pub fingerprint: FingerprintComponents,
}

/// Everything the host hands over when the form is submitted.
pub struct SubmissionInputs<'a> {
    /// Current response string from the challenge widget; only
    /// non-emptiness is checked here.
    pub challenge_response: &'a str,
    /// `(name, value)` of the styled-invisible fields; all must be empty.
    pub honeypot_fields: &'a [(String, String)],
    /// Raw identifier to carry across the redirect, if any.
    pub carried_fragment: Option<&'a str>,
    /// Drained interaction aggregate for this page load.
    pub interaction: &'a InteractionData,
    /// Page clock at submission, milliseconds.
    pub now_ms: u64,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Verified: hand the token and sanitized fragment to the redirect
    /// assembler.
    Redirect {
        token: String,
        fragment: Option<String>,
    },
    Trapped { reason: RejectReason },
}

/// One flow instance per page-load context; collaborators are injected,
/// nothing is global.
pub struct VerificationFlow<'a, S: KeyValueStore> {
    store: &'a S,
    config: Config,
    classifier: Classifier,
    blacklist: BlacklistStore<'a, S>,
}

impl<'a, S: KeyValueStore> VerificationFlow<'a, S> {
    /// Builds the flow and sweeps expired blacklist entries, once per page
    /// lifecycle.
    pub fn new(store: &'a S, config: Config) -> Self {
        let classifier = Classifier::from_config(&config);
        let blacklist = BlacklistStore::new(store, &config);
        blacklist.cleanup_expired();
        VerificationFlow {
            store,
            config,
            classifier,
            blacklist,
        }
    }

    pub fn blacklist(&self) -> &BlacklistStore<'a, S> {
        &self.blacklist
    }

    /// Load-time gate. A blocked visitor gets the decoy before any full
    /// fingerprint collection happens; an allowed one gets a context for the
    /// armed form.
    pub fn handle_page_load(
        &self,
        env: &impl EnvironmentProbe,
        presenter: &impl DeceptionPresenter,
    ) -> PageOutcome {
        metrics::increment(self.store, MetricName::PageLoads, None);

        let user_agent = env.user_agent().unwrap_or_default();
        let client_id = client_id_from_env(env);

        let verdict = self.classifier.classify(&self.blacklist, &user_agent, &client_id);
        if let Some(reason) = verdict.reason {
            self.trap(presenter, &user_agent, &client_id, reason);
            return PageOutcome::Trapped { reason };
        }

        let fingerprint = collector::collect(env);
        if self.classifier.has_too_many_suspicious_patterns(&fingerprint) {
            let reason = RejectReason::SuspiciousFingerprint;
            self.record_attempt(&client_id, reason);
            self.trap(presenter, &user_agent, &client_id, reason);
            return PageOutcome::Trapped { reason };
        }

        PageOutcome::Proceed(PageContext {
            client_id,
            fingerprint,
        })
    }

    /// Submission gate. Each failed check records an attempt reason and
    /// shows the decoy; only a clean run mints a token.
    pub fn handle_submission(
        &self,
        ctx: &PageContext,
        inputs: &SubmissionInputs<'_>,
        presenter: &impl DeceptionPresenter,
    ) -> SubmitOutcome {
        let failure = check_challenge_response(inputs)
            .or_else(|| check_honeypot_fields(inputs))
            .or_else(|| check_interaction(inputs))
            .or_else(|| self.check_automation(ctx))
            .or_else(|| self.check_environment(ctx));

        if let Some(reason) = failure {
            let user_agent = ctx.fingerprint.user_agent.as_deref().unwrap_or("");
            self.record_attempt(&ctx.client_id, reason);
            self.trap(presenter, user_agent, &ctx.client_id, reason);
            return SubmitOutcome::Trapped { reason };
        }

        metrics::increment(self.store, MetricName::Passes, None);
        let token = mint_pass_token(&ctx.client_id, self.config.token_ttl_seconds);
        let fragment = inputs
            .carried_fragment
            .and_then(|raw| sanitize_identifier_fragment(raw, self.config.fragment_max_len));
        SubmitOutcome::Redirect { token, fragment }
    }

    fn check_automation(&self, ctx: &PageContext) -> Option<RejectReason> {
        let user_agent = ctx.fingerprint.user_agent.as_deref().unwrap_or("");
        if self.classifier.detect_automation(&ctx.fingerprint, user_agent) {
            return Some(RejectReason::AutomationDetected);
        }
        None
    }

    fn check_environment(&self, ctx: &PageContext) -> Option<RejectReason> {
        if self.classifier.has_too_many_suspicious_patterns(&ctx.fingerprint) {
            return Some(RejectReason::EnvironmentCheckFailed);
        }
        None
    }

    fn record_attempt(&self, client_id: &str, reason: RejectReason) {
        metrics::increment(
            self.store,
            MetricName::AttemptsRecorded,
            Some(reason.as_str()),
        );
        if self.blacklist.record_failed_attempt(client_id, reason.as_str())
            == AttemptOutcome::Escalated
        {
            metrics::increment(self.store, MetricName::Escalations, None);
        }
    }

    fn trap(
        &self,
        presenter: &impl DeceptionPresenter,
        user_agent: &str,
        client_id: &str,
        reason: RejectReason,
    ) {
        visit_log::record_bot_visit(self.store, user_agent, reason.as_str(), client_id);
        metrics::increment(self.store, MetricName::TrapsShown, None);
        presenter.show(reason.as_str());
    }
}

fn check_challenge_response(inputs: &SubmissionInputs<'_>) -> Option<RejectReason> {
    if inputs.challenge_response.trim().is_empty() {
        return Some(RejectReason::MissingChallengeResponse);
    }
    None
}

fn check_honeypot_fields(inputs: &SubmissionInputs<'_>) -> Option<RejectReason> {
    if inputs
        .honeypot_fields
        .iter()
        .any(|(_, value)| !value.trim().is_empty())
    {
        return Some(RejectReason::HoneypotTripped);
    }
    None
}

fn check_interaction(inputs: &SubmissionInputs<'_>) -> Option<RejectReason> {
    if !interaction::evaluate(inputs.interaction, inputs.now_ms) {
        return Some(RejectReason::UnnaturalInteraction);
    }
    None
}

/// Pre-collection identity: stable attributes plus the canvas probe, enough
/// to key the blacklist without running the full collection pass.
fn client_id_from_env(env: &impl EnvironmentProbe) -> String {
    let fp = FingerprintComponents {
        user_agent: env.user_agent(),
        language: env.language(),
        screen: env.screen(),
        hardware_concurrency: env.hardware_concurrency(),
        device_memory_gb: env.device_memory_gb(),
        platform: env.platform(),
        vendor: env.vendor(),
        canvas: env
            .canvas_hash()
            .or_sentinel(CANVAS_SENTINEL.to_string()),
        ..FingerprintComponents::default()
    };
    derive_client_identifier(&fp)
}
