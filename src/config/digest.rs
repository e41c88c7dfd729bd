// src/config/digest.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";

/// How strict the filter stage is, on top of exclusion + internship gating.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// Exclusion keywords and internship indicator only.
    #[default]
    Internship,
    /// Additionally requires one of `keywords_include`.
    Keywords,
    /// Additionally requires a preferred location and a domain term.
    Strict,
}

/// Run settings, resolved once at startup. Keys missing from the file keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DigestConfig {
    pub keywords_include: Vec<String>,
    pub keywords_exclude: Vec<String>,
    pub locations_prefer: Vec<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub min_score_to_alert: u8,
    #[serde(deserialize_with = "lenient_int")]
    pub max_alerts: usize,
    #[serde(deserialize_with = "lenient_int")]
    pub max_jobs_to_score: usize,
    pub filter_policy: FilterPolicy,
}

/// Integer setting that also accepts floats (truncated) and numeric strings, e.g. `7.0` or `"7"`.
fn lenient_int<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: TryFrom<i64>,
{
    use serde::de::Error;
    use serde_json::Value;

    let raw: i64 = match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| D::Error::custom(format!("invalid integer {n}")))?,
        Value::String(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or_else(|| D::Error::custom(format!("invalid integer {s:?}")))?
        }
        other => return Err(D::Error::custom(format!("expected integer, got {other}"))),
    };
    T::try_from(raw).map_err(|_| D::Error::custom(format!("integer {raw} out of range")))
}

impl Default for DigestConfig {
    fn default() -> Self {
        let strings = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            keywords_include: strings(&[
                "intern",
                "internship",
                "trainee",
                "data science",
                "machine learning",
                "nlp",
                "llm",
                "rag",
                "python",
                "analytics",
            ]),
            keywords_exclude: strings(&[
                "senior",
                "lead",
                "principal",
                "manager",
                "staff",
                "5+ years",
                "7+ years",
                "10+ years",
            ]),
            locations_prefer: strings(&["India", "Remote"]),
            min_score_to_alert: 6,
            max_alerts: 6,
            max_jobs_to_score: 30,
            filter_policy: FilterPolicy::Internship,
        }
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<DigestConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Resolve config using env var + fallbacks, falling back to defaults on any problem:
/// 1) $DIGEST_CONFIG_PATH
/// 2) config.json
/// 3) config.toml
pub fn load_config_default() -> DigestConfig {
    let candidate = match std::env::var(ENV_CONFIG_PATH) {
        Ok(p) => Some(PathBuf::from(p)),
        Err(_) => ["config.json", "config.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists()),
    };

    let Some(path) = candidate else {
        tracing::info!("no config file found, using defaults");
        return DigestConfig::default();
    };

    match load_config_from(&path) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), policy = ?cfg.filter_policy, "config loaded");
            cfg
        }
        Err(e) => {
            tracing::warn!(error = ?e, path = %path.display(), "config unusable, using defaults");
            DigestConfig::default()
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<DigestConfig> {
    let cfg = if hint_ext == "toml" {
        toml::from_str::<DigestConfig>(s).context("parsing toml config")?
    } else if serde_json::from_str::<serde_json::Value>(s).is_ok() {
        // valid JSON: report the real field error instead of trying TOML
        serde_json::from_str::<DigestConfig>(s).context("parsing json config")?
    } else {
        toml::from_str::<DigestConfig>(s).map_err(|_| anyhow!("unsupported config format"))?
    };
    Ok(clean(cfg))
}

fn clean(mut cfg: DigestConfig) -> DigestConfig {
    cfg.keywords_include = clean_list(cfg.keywords_include);
    cfg.keywords_exclude = clean_list(cfg.keywords_exclude);
    cfg.locations_prefer = clean_list(cfg.locations_prefer);
    cfg
}

/// Trim entries, drop blanks and repeats; keeps first-seen order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn partial_json_is_merged_with_defaults() {
        let cfg = parse_config(r#"{"max_alerts": 3, "keywords_exclude": ["senior"]}"#, "json")
            .unwrap();
        assert_eq!(cfg.max_alerts, 3);
        assert_eq!(cfg.keywords_exclude, vec!["senior".to_string()]);
        let d = DigestConfig::default();
        assert_eq!(cfg.keywords_include, d.keywords_include);
        assert_eq!(cfg.min_score_to_alert, d.min_score_to_alert);
        assert_eq!(cfg.max_jobs_to_score, 30);
        assert_eq!(cfg.filter_policy, FilterPolicy::Internship);
    }

    #[test]
    fn loosely_typed_numbers_keep_user_keys() {
        let cfg = parse_config(
            r#"{"keywords_exclude": ["senior", "remote"], "min_score_to_alert": 7.0, "max_alerts": "4"}"#,
            "json",
        )
        .unwrap();
        assert_eq!(cfg.min_score_to_alert, 7);
        assert_eq!(cfg.max_alerts, 4);
        assert_eq!(
            cfg.keywords_exclude,
            vec!["senior".to_string(), "remote".to_string()]
        );
        assert_eq!(cfg.max_jobs_to_score, 30);

        let cfg = parse_config("max_jobs_to_score = 12.0", "toml").unwrap();
        assert_eq!(cfg.max_jobs_to_score, 12);
    }

    #[test]
    fn json_type_errors_are_reported() {
        let err = parse_config(r#"{"max_alerts": -2, "keywords_exclude": ["senior"]}"#, "json")
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("parsing json config"), "{msg}");
        assert!(msg.contains("out of range"), "{msg}");
        assert!(!msg.contains("unsupported config format"));
    }

    #[test]
    fn toml_with_policy_parses() {
        let cfg = parse_config(
            r#"
filter_policy = "strict"
locations_prefer = [" India ", "", "India", "Berlin"]
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.filter_policy, FilterPolicy::Strict);
        assert_eq!(
            cfg.locations_prefer,
            vec!["India".to_string(), "Berlin".to_string()]
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_config("not a config at all [", "").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        // Nothing on disk -> defaults
        assert_eq!(load_config_default(), DigestConfig::default());

        // config.json in CWD
        fs::write(tmp.path().join("config.json"), r#"{"max_alerts": 2}"#).unwrap();
        assert_eq!(load_config_default().max_alerts, 2);

        // Broken file -> defaults
        fs::write(tmp.path().join("config.json"), "{ broken").unwrap();
        assert_eq!(load_config_default(), DigestConfig::default());

        // Env wins
        let p_env = tmp.path().join("other.toml");
        fs::write(&p_env, "max_jobs_to_score = 5").unwrap();
        env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
        assert_eq!(load_config_default().max_jobs_to_score, 5);
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
