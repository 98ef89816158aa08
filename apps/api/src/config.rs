use std::ops::RangeInclusive;

use anyhow::{ensure, Context, Result};

/// Accepted range for every trigger threshold, in days.
pub const TRIGGER_DAYS: RangeInclusive<i64> = 1..=3650;

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent selects the in-memory store (local development only).
    pub database_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub tts_voice: String,
    pub port: u16,
    pub rust_log: String,
    pub triggers: TriggerSettings,
}

/// Thresholds for the proactive trigger checks.
/// Each value must fall within [`TRIGGER_DAYS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSettings {
    pub stale_ticket_days: i64,
    pub appointment_reminder_days: i64,
    pub contract_expiry_days: i64,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            stale_ticket_days: 7,
            appointment_reminder_days: 1,
            contract_expiry_days: 30,
        }
    }
}

impl TriggerSettings {
    pub fn validate(&self) -> Result<()> {
        check_days("STALE_TICKET_DAYS", self.stale_ticket_days)?;
        check_days("APPOINTMENT_REMINDER_DAYS", self.appointment_reminder_days)?;
        check_days("CONTRACT_EXPIRY_DAYS", self.contract_expiry_days)?;
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = TriggerSettings::default();

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            tts_voice: optional_env("TTS_VOICE").unwrap_or_else(|| "alloy".to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            triggers: TriggerSettings {
                stale_ticket_days: parse_days("STALE_TICKET_DAYS", defaults.stale_ticket_days)?,
                appointment_reminder_days: parse_days(
                    "APPOINTMENT_REMINDER_DAYS",
                    defaults.appointment_reminder_days,
                )?,
                contract_expiry_days: parse_days(
                    "CONTRACT_EXPIRY_DAYS",
                    defaults.contract_expiry_days,
                )?,
            },
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn parse_days(key: &str, default: i64) -> Result<i64> {
    let days = parse_env(key, default)?;
    check_days(key, days).with_context(|| format!("Environment variable '{key}' is out of range"))
}

fn check_days(key: &str, days: i64) -> Result<i64> {
    ensure!(
        TRIGGER_DAYS.contains(&days),
        "{key} must be between {} and {} days, got {days}",
        TRIGGER_DAYS.start(),
        TRIGGER_DAYS.end()
    );
    Ok(days)
}
