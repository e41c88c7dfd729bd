//! # Relevance Scorer
//! One oracle round-trip per run, validated into a [`ScoreOutcome`].
//!
//! The oracle reply is only trusted when it is a JSON array; anything else
//! (prose, markdown fences, truncation, transport error) switches the whole
//! batch to [`heuristic_score`]. Either way every candidate gets a score in
//! `0..=10` and a reason.

pub mod openai;

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use metrics::counter;
use serde_json::Value;

use crate::filter::INTERNSHIP_TERMS;
use crate::listing::Listing;

pub use openai::OpenAiCompatOracle;

pub const FALLBACK_REASON: &str = "Fallback ranking (LLM JSON parse failed).";
pub const MAX_SCORE: u8 = 10;

/// Title terms worth +1 in the heuristic.
const HEURISTIC_DOMAIN_TERMS: &[&str] = &["machine learning", "data science"];

/// Opaque text-completion service. Stateless between calls.
#[async_trait::async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Used when no LLM is configured; every run takes the heuristic path.
pub struct DisabledOracle;

#[async_trait::async_trait]
impl ScoringOracle for DisabledOracle {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("scoring oracle disabled (no LLM_API_KEY)"))
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreEntry {
    pub score: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    OracleError(String),
    NotJson(String),
    NotAnArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    Structured(HashMap<String, ScoreEntry>),
    Fallback(FallbackCause),
}

impl ScoreOutcome {
    pub fn mode(&self) -> &'static str {
        match self {
            ScoreOutcome::Structured(_) => "llm",
            ScoreOutcome::Fallback(_) => "fallback",
        }
    }
}

/// Prompt listing every candidate, asking for a strict JSON array back.
pub fn build_prompt(items: &[Listing]) -> String {
    let mut prompt = String::from(
        "You are helping a Data Science student find internships/entry-level roles.\n\
         Score each job from 1-10 based on relevance to: Data Science, ML, NLP, LLM, RAG, Python, analytics.\n\
         Also penalize if it looks like senior/experienced role.\n\
         Return STRICT JSON array of objects: {\"id\": \"...\", \"score\": 0-10, \"reason\": \"...\"}.\n\
         Output only the JSON array, no prose and no markdown.\n\nJobs:\n",
    );
    for j in items {
        prompt.push_str(&format!(
            "- id={} title={} company={} location={} tags={:?}\n",
            j.id_or_fingerprint(),
            j.title,
            j.company,
            j.location,
            j.tags
        ));
    }
    prompt
}

/// Coerce a JSON score into `0..=10`. Integers, floats (truncated) and numeric strings count.
fn coerce_score(v: Option<&Value>) -> u8 {
    let raw: i64 = match v {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    raw.clamp(0, MAX_SCORE as i64) as u8
}

/// Decide between structured scores and the heuristic for this reply.
///
/// Only a top-level JSON array is accepted. Inside it, objects with a string
/// `id` are kept (later duplicates overwrite earlier ones); other elements are
/// ignored.
pub fn validate_response(text: &str) -> ScoreOutcome {
    let parsed: Value = match serde_json::from_str(text.trim()) {
        Ok(v) => v,
        Err(e) => return ScoreOutcome::Fallback(FallbackCause::NotJson(e.to_string())),
    };
    let Value::Array(items) = parsed else {
        return ScoreOutcome::Fallback(FallbackCause::NotAnArray);
    };

    let mut map = HashMap::with_capacity(items.len());
    for item in items {
        let Value::Object(obj) = item else { continue };
        let Some(id) = obj.get("id").and_then(Value::as_str) else {
            continue;
        };
        let reason = obj
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        map.insert(
            id.to_string(),
            ScoreEntry {
                score: coerce_score(obj.get("score")),
                reason,
            },
        );
    }
    ScoreOutcome::Structured(map)
}

/// Deterministic score: 6, +1 for an internship term in the title, +1 for a domain term.
pub fn heuristic_score(listing: &Listing) -> u8 {
    let t = listing.title.to_lowercase();
    let mut score: u8 = 6;
    if INTERNSHIP_TERMS.iter().any(|k| t.contains(k)) {
        score += 1;
    }
    if HEURISTIC_DOMAIN_TERMS.iter().any(|k| t.contains(k)) {
        score += 1;
    }
    score.min(MAX_SCORE)
}

/// Attach scores and reasons to every candidate according to `outcome`.
pub fn apply_outcome(items: Vec<Listing>, outcome: &ScoreOutcome) -> Vec<Listing> {
    items
        .into_iter()
        .map(|mut j| {
            match outcome {
                ScoreOutcome::Structured(map) => {
                    let entry = map.get(&j.id_or_fingerprint()).cloned().unwrap_or_default();
                    j.score = Some(entry.score);
                    j.reason = Some(entry.reason);
                }
                ScoreOutcome::Fallback(_) => {
                    j.score = Some(heuristic_score(&j));
                    j.reason = Some(FALLBACK_REASON.to_string());
                }
            }
            j
        })
        .collect()
}

/// Score the first `max_jobs` listings and sort them by score, highest first (stable).
/// Listings past the cap are dropped.
pub async fn rank(
    mut items: Vec<Listing>,
    max_jobs: usize,
    oracle: &dyn ScoringOracle,
) -> Vec<Listing> {
    items.truncate(max_jobs);
    if items.is_empty() {
        return items;
    }

    let prompt = build_prompt(&items);
    let outcome = match oracle.complete(&prompt).await {
        Ok(text) => validate_response(&text),
        Err(e) => ScoreOutcome::Fallback(FallbackCause::OracleError(format!("{e:#}"))),
    };

    match &outcome {
        ScoreOutcome::Structured(map) => tracing::info!(
            oracle = oracle.name(),
            candidates = items.len(),
            returned = map.len(),
            "llm scores parsed"
        ),
        ScoreOutcome::Fallback(cause) => tracing::warn!(
            oracle = oracle.name(),
            candidates = items.len(),
            cause = ?cause,
            "llm scoring unavailable, using heuristic"
        ),
    }
    counter!("digest_scored_total", "mode" => outcome.mode()).increment(items.len() as u64);

    let mut ranked = apply_outcome(items, &outcome);
    // sort_by is stable: equal scores keep filter order
    ranked.sort_by(|a, b| b.score_or_zero().cmp(&a.score_or_zero()));
    ranked
}
