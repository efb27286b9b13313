// src/config.rs
// Configuration for the visitor gate.
// Loaded from the key-value store with env overrides; all tunables are
// clamped to safe ranges. The suspicion threshold/denominator and the
// interaction limits are deliberately constants, not config.

use std::env;

use serde::{Deserialize, Serialize};

use crate::classifier::{DEFAULT_BOT_SIGNATURES, DEFAULT_SECURITY_TOOL_SIGNATURES};
use crate::store::KeyValueStore;

const CONFIG_KEY: &str = "config";

const MAX_FAILED_ATTEMPTS_MIN: u32 = 1;
const MAX_FAILED_ATTEMPTS_MAX: u32 = 10;
const MAX_FAILED_ATTEMPTS_DEFAULT: u32 = 3;

const BLACKLIST_DURATION_MIN: u64 = 60;
const BLACKLIST_DURATION_MAX: u64 = 604_800;
const BLACKLIST_DURATION_DEFAULT: u64 = 86_400; // 24 hours

pub const TOKEN_TTL_MIN: u64 = 30;
pub const TOKEN_TTL_MAX: u64 = 3600;
const TOKEN_TTL_DEFAULT: u64 = 300;

const FRAGMENT_MAX_LEN_MIN: usize = 16;
const FRAGMENT_MAX_LEN_MAX: usize = 256;
const FRAGMENT_MAX_LEN_DEFAULT: usize = 64;

/// Gate configuration, loaded from KV or defaults.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Failed attempts before escalation to the blacklist.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
    /// Blacklist entry lifetime in seconds.
    #[serde(default = "default_blacklist_duration")]
    pub blacklist_duration_secs: u64,
    /// Pass token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// Longest accepted carried identifier fragment, pre-encoding.
    #[serde(default = "default_fragment_max_len")]
    pub fragment_max_len: usize,
    /// Rotate decoy templates instead of always serving the first.
    #[serde(default = "default_true")]
    pub decoy_rotation: bool,
    #[serde(default = "default_bot_signatures")]
    pub bot_signatures: Vec<String>,
    #[serde(default = "default_security_tool_signatures")]
    pub security_tool_signatures: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_failed_attempts: default_max_failed_attempts(),
            blacklist_duration_secs: default_blacklist_duration(),
            token_ttl_seconds: default_token_ttl(),
            fragment_max_len: default_fragment_max_len(),
            decoy_rotation: true,
            bot_signatures: default_bot_signatures(),
            security_tool_signatures: default_security_tool_signatures(),
        }
    }
}

impl Config {
    /// Loads config from the key-value store, or returns defaults when the
    /// key is missing, unreadable, or corrupt. Loaded values are re-clamped:
    /// stored JSON is no more trusted than any other input.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let mut cfg = store
            .get(CONFIG_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_slice::<Config>(&raw).ok())
            .unwrap_or_default();
        cfg.max_failed_attempts = clamp_max_failed_attempts(cfg.max_failed_attempts);
        cfg.blacklist_duration_secs = clamp_blacklist_duration(cfg.blacklist_duration_secs);
        cfg.token_ttl_seconds = clamp_token_ttl(cfg.token_ttl_seconds);
        cfg.fragment_max_len = clamp_fragment_max_len(cfg.fragment_max_len);
        cfg
    }
}

fn default_true() -> bool {
    true
}

fn clamp_max_failed_attempts(value: u32) -> u32 {
    value.clamp(MAX_FAILED_ATTEMPTS_MIN, MAX_FAILED_ATTEMPTS_MAX)
}

fn clamp_blacklist_duration(value: u64) -> u64 {
    value.clamp(BLACKLIST_DURATION_MIN, BLACKLIST_DURATION_MAX)
}

fn clamp_token_ttl(value: u64) -> u64 {
    value.clamp(TOKEN_TTL_MIN, TOKEN_TTL_MAX)
}

fn clamp_fragment_max_len(value: usize) -> usize {
    value.clamp(FRAGMENT_MAX_LEN_MIN, FRAGMENT_MAX_LEN_MAX)
}

pub(crate) fn parse_max_failed_attempts(value: Option<&str>) -> u32 {
    let parsed = value
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(MAX_FAILED_ATTEMPTS_DEFAULT);
    clamp_max_failed_attempts(parsed)
}

pub(crate) fn parse_blacklist_duration(value: Option<&str>) -> u64 {
    let parsed = value
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(BLACKLIST_DURATION_DEFAULT);
    clamp_blacklist_duration(parsed)
}

pub(crate) fn parse_token_ttl(value: Option<&str>) -> u64 {
    let parsed = value
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(TOKEN_TTL_DEFAULT);
    clamp_token_ttl(parsed)
}

pub(crate) fn parse_fragment_max_len(value: Option<&str>) -> usize {
    let parsed = value
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(FRAGMENT_MAX_LEN_DEFAULT);
    clamp_fragment_max_len(parsed)
}

fn default_max_failed_attempts() -> u32 {
    parse_max_failed_attempts(env::var("GATE_MAX_FAILED_ATTEMPTS").ok().as_deref())
}

fn default_blacklist_duration() -> u64 {
    parse_blacklist_duration(env::var("GATE_BLACKLIST_DURATION_SECS").ok().as_deref())
}

fn default_token_ttl() -> u64 {
    parse_token_ttl(env::var("GATE_TOKEN_TTL_SECONDS").ok().as_deref())
}

fn default_fragment_max_len() -> usize {
    parse_fragment_max_len(env::var("GATE_FRAGMENT_MAX_LEN").ok().as_deref())
}

fn default_bot_signatures() -> Vec<String> {
    DEFAULT_BOT_SIGNATURES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_security_tool_signatures() -> Vec<String> {
    DEFAULT_SECURITY_TOOL_SIGNATURES
        .iter()
        .map(|s| s.to_string())
        .collect()
}
