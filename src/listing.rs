// src/listing.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One job/internship posting in the common shape every source produces.
///
/// `id` is attached by the filter stage, `score`/`reason` by the scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    pub source: String, // e.g. "Remotive", "Arbeitnow"
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub tags: Vec<String>,
    pub date: String, // as supplied by the source, not normalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Listing {
    /// Dedup key for this listing; see [`fingerprint`].
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.source, &self.company, &self.title, &self.url)
    }

    /// The attached id, or the fingerprint when the listing hasn't been through the filter yet.
    pub fn id_or_fingerprint(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.fingerprint())
    }

    /// Lowercased haystack for keyword matching: title, company, location, tags.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.title.trim(),
            self.company.as_str(),
            self.location.as_str(),
        ];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    pub fn score_or_zero(&self) -> u8 {
        self.score.unwrap_or(0)
    }
}

/// Stable hex SHA-256 over `source|company|title|url`.
pub fn fingerprint(source: &str, company: &str, title: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{source}|{company}|{title}|{url}").as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize source-provided text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let no_tags = RE_TAGS.replace_all(&decoded, "");
    let out = no_tags
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    RE_WS.replace_all(&out, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(source: &str, company: &str, title: &str, url: &str) -> Listing {
        Listing {
            source: source.into(),
            company: company.into(),
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint("Remotive", "Acme", "Data Intern", "https://x.test/1");
        let b = fingerprint("Remotive", "Acme", "Data Intern", "https://x.test/1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_changes_with_each_field() {
        let base = listing("Remotive", "Acme", "Data Intern", "https://x.test/1");
        let variants = [
            listing("Arbeitnow", "Acme", "Data Intern", "https://x.test/1"),
            listing("Remotive", "Acme GmbH", "Data Intern", "https://x.test/1"),
            listing("Remotive", "Acme", "ML Intern", "https://x.test/1"),
            listing("Remotive", "Acme", "Data Intern", "https://x.test/2"),
        ];
        for v in variants {
            assert_ne!(base.fingerprint(), v.fingerprint(), "{v:?}");
        }
    }

    #[test]
    fn fingerprint_ignores_tags_and_date() {
        let mut a = listing("Remotive", "Acme", "Data Intern", "https://x.test/1");
        let mut b = a.clone();
        a.tags = vec!["python".into()];
        b.tags = vec!["sql".into()];
        b.date = "2025-01-01".into();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn search_text_joins_fields_lowercased() {
        let mut l = listing("Remotive", "Acme", "  Data Intern ", "u");
        l.location = "Remote".into();
        l.tags = vec!["Python".into(), "SQL".into()];
        assert_eq!(l.search_text(), "data intern acme remote python sql");
    }

    #[test]
    fn normalize_text_strips_markup() {
        let s = "  <b>ML&nbsp;Intern</b>\n &amp; Trainee ";
        assert_eq!(normalize_text(s), "ML Intern & Trainee");
    }
}
