use std::env;

use anyhow::{Result, bail};

use crate::cli::Cli;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order, when
/// `--api-key` is absent.
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Immutable run configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub fallback_models: Vec<String>,
    pub system: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_key: String,
    pub base_url: String,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::from_cli_with(cli, |key| env::var(key).ok())
    }

    fn from_cli_with(cli: &Cli, mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let api_key = resolve_api_key(cli.api_key.as_deref(), &mut get_var)?;
        let base_url = get_var("GEMINI_BASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            model: cli.model.clone(),
            fallback_models: parse_fallback_models(&cli.fallback_models),
            system: cli.system.clone(),
            temperature: cli.temperature,
            max_tokens: cli.max_tokens,
            api_key,
            base_url,
        })
    }
}

fn resolve_api_key(
    cli_key: Option<&str>,
    get_var: &mut impl FnMut(&str) -> Option<String>,
) -> Result<String> {
    if let Some(key) = cli_key.map(str::trim).filter(|key| !key.is_empty()) {
        return Ok(key.to_string());
    }

    for var in API_KEY_ENV_VARS {
        if let Some(key) = get_var(var).map(|value| value.trim().to_string())
            && !key.is_empty()
        {
            return Ok(key);
        }
    }

    bail!("Missing API key. Set GEMINI_API_KEY or GOOGLE_API_KEY, or pass --api-key.")
}

fn parse_fallback_models(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::{Config, DEFAULT_BASE_URL, parse_fallback_models};
    use crate::cli::Cli;

    fn config_from(args: &[&str], vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let cli = Cli::parse_from(std::iter::once("gema").chain(args.iter().copied()));
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        Config::from_cli_with(&cli, |key| vars.get(key).cloned())
    }

    #[test]
    fn api_key_flag_takes_precedence_over_env() {
        let cfg = config_from(&["--api-key", "flag-key"], &[("GEMINI_API_KEY", "env-key")])
            .expect("config should resolve");
        assert_eq!(cfg.api_key, "flag-key");
    }

    #[test]
    fn gemini_key_is_consulted_before_google_key() {
        let cfg = config_from(
            &[],
            &[
                ("GEMINI_API_KEY", "gemini-key"),
                ("GOOGLE_API_KEY", "google-key"),
            ],
        )
        .expect("config should resolve");
        assert_eq!(cfg.api_key, "gemini-key");
    }

    #[test]
    fn google_key_is_used_when_gemini_key_is_absent() {
        let cfg =
            config_from(&[], &[("GOOGLE_API_KEY", "google-key")]).expect("config should resolve");
        assert_eq!(cfg.api_key, "google-key");
    }

    #[test]
    fn missing_api_key_is_a_fatal_configuration_error() {
        let err = config_from(&[], &[]).expect_err("config should fail without a key");
        let msg = format!("{err:#}");
        assert!(msg.contains("API key"), "unexpected message: {msg}");
    }

    #[test]
    fn blank_api_key_values_are_treated_as_missing() {
        let err = config_from(&["--api-key", "  "], &[("GEMINI_API_KEY", " ")])
            .expect_err("config should fail with blank keys");
        assert!(format!("{err:#}").contains("API key"));
    }

    #[test]
    fn base_url_defaults_to_the_public_endpoint() {
        let cfg = config_from(&["--api-key", "k"], &[]).expect("config should resolve");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_can_be_overridden_from_the_environment() {
        let cfg = config_from(
            &["--api-key", "k"],
            &[("GEMINI_BASE_URL", "http://localhost:9999")],
        )
        .expect("config should resolve");
        assert_eq!(cfg.base_url, "http://localhost:9999");
    }

    #[test]
    fn fallback_models_are_split_in_order() {
        let cfg = config_from(
            &[
                "--api-key",
                "k",
                "--fallback-models",
                "gemini-1.0-pro,gemini-pro",
            ],
            &[],
        )
        .expect("config should resolve");
        assert_eq!(cfg.fallback_models, vec!["gemini-1.0-pro", "gemini-pro"]);
    }

    #[test]
    fn parse_fallback_models_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_fallback_models(" a , ,b,, c "),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(parse_fallback_models("").is_empty());
        assert!(parse_fallback_models(" , ").is_empty());
    }
}
