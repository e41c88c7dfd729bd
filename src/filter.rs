//! # Normalizer / Filter
//! Validates, gates and deduplicates the merged listing collection.
//!
//! Gating is a chain of [`ListingPredicate`]s evaluated in order against the
//! listing and its lowercased search text; the first rejection wins. Which
//! predicates run is decided by [`FilterPolicy`], or a caller can assemble
//! its own chain.

use std::collections::HashSet;

use metrics::counter;

use crate::config::{DigestConfig, FilterPolicy};
use crate::listing::Listing;

/// Terms marking a posting as internship-type. Always required.
pub const INTERNSHIP_TERMS: &[&str] = &["intern", "internship", "trainee"];

/// Domain terms for the strict policy and the heuristic scorer.
pub const DOMAIN_TERMS: &[&str] = &[
    "data science",
    "data scientist",
    "data analyst",
    "machine learning",
    "deep learning",
    "computer vision",
    "ml",
    "ai",
    "nlp",
    "llm",
    "rag",
    "analytics",
    "python",
];

pub trait ListingPredicate: Send + Sync {
    fn name(&self) -> &'static str;
    /// `search_text` is [`Listing::search_text`], computed once per listing.
    fn accepts(&self, listing: &Listing, search_text: &str) -> bool;
}

fn contains_any<S: AsRef<str>>(haystack: &str, needles: &[S]) -> bool {
    needles.iter().any(|n| {
        let n = n.as_ref();
        !n.is_empty() && haystack.contains(n)
    })
}

fn lowered(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub struct NonEmptyTitle;

impl ListingPredicate for NonEmptyTitle {
    fn name(&self) -> &'static str {
        "non_empty_title"
    }
    fn accepts(&self, listing: &Listing, _search_text: &str) -> bool {
        !listing.title.trim().is_empty()
    }
}

/// Seniority/experience exclusion: any hit rejects.
pub struct ExcludeKeywords {
    terms: Vec<String>,
}

impl ExcludeKeywords {
    pub fn new(terms: &[String]) -> Self {
        Self {
            terms: lowered(terms),
        }
    }
}

impl ListingPredicate for ExcludeKeywords {
    fn name(&self) -> &'static str {
        "exclude_keywords"
    }
    fn accepts(&self, _listing: &Listing, search_text: &str) -> bool {
        !contains_any(search_text, &self.terms)
    }
}

pub struct RequireInternship;

impl ListingPredicate for RequireInternship {
    fn name(&self) -> &'static str {
        "require_internship"
    }
    fn accepts(&self, _listing: &Listing, search_text: &str) -> bool {
        contains_any(search_text, INTERNSHIP_TERMS)
    }
}

/// At least one configured include keyword. An empty list accepts everything.
pub struct IncludeKeywords {
    terms: Vec<String>,
}

impl IncludeKeywords {
    pub fn new(terms: &[String]) -> Self {
        Self {
            terms: lowered(terms),
        }
    }
}

impl ListingPredicate for IncludeKeywords {
    fn name(&self) -> &'static str {
        "include_keywords"
    }
    fn accepts(&self, _listing: &Listing, search_text: &str) -> bool {
        self.terms.is_empty() || contains_any(search_text, &self.terms)
    }
}

/// Location allowlist. Soft: a blank location or an empty allowlist always passes.
pub struct PreferredLocation {
    locations: Vec<String>,
}

impl PreferredLocation {
    pub fn new(locations: &[String]) -> Self {
        Self {
            locations: lowered(locations),
        }
    }
}

impl ListingPredicate for PreferredLocation {
    fn name(&self) -> &'static str {
        "preferred_location"
    }
    fn accepts(&self, listing: &Listing, _search_text: &str) -> bool {
        let loc = listing.location.trim().to_lowercase();
        loc.is_empty() || self.locations.is_empty() || contains_any(&loc, &self.locations)
    }
}

pub struct DomainRelevance;

impl ListingPredicate for DomainRelevance {
    fn name(&self) -> &'static str {
        "domain_relevance"
    }
    fn accepts(&self, _listing: &Listing, search_text: &str) -> bool {
        let words: Vec<&str> = search_text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        DOMAIN_TERMS.iter().any(|t| {
            if t.contains(' ') {
                search_text.contains(t)
            } else {
                // short terms like "ai"/"ml" only as whole words
                words.iter().any(|w| w == t)
            }
        })
    }
}

/// Ordered predicate chain.
pub struct FilterChain {
    predicates: Vec<Box<dyn ListingPredicate>>,
}

impl FilterChain {
    /// Custom chain. [`NonEmptyTitle`] is always evaluated first.
    pub fn new(predicates: Vec<Box<dyn ListingPredicate>>) -> Self {
        let mut all: Vec<Box<dyn ListingPredicate>> = vec![Box::new(NonEmptyTitle)];
        all.extend(predicates);
        Self { predicates: all }
    }

    pub fn from_config(cfg: &DigestConfig) -> Self {
        let mut preds: Vec<Box<dyn ListingPredicate>> = vec![
            Box::new(ExcludeKeywords::new(&cfg.keywords_exclude)),
            Box::new(RequireInternship),
        ];
        match cfg.filter_policy {
            FilterPolicy::Internship => {}
            FilterPolicy::Keywords => {
                preds.push(Box::new(IncludeKeywords::new(&cfg.keywords_include)));
            }
            FilterPolicy::Strict => {
                preds.push(Box::new(PreferredLocation::new(&cfg.locations_prefer)));
                preds.push(Box::new(DomainRelevance));
            }
        }
        Self::new(preds)
    }

    pub fn predicate_names(&self) -> Vec<&'static str> {
        self.predicates.iter().map(|p| p.name()).collect()
    }

    /// Name of the first predicate that rejects the listing, if any.
    pub fn rejection(&self, listing: &Listing) -> Option<&'static str> {
        let text = listing.search_text();
        self.predicates
            .iter()
            .find(|p| !p.accepts(listing, &text))
            .map(|p| p.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub rejected: usize,
    pub duplicates: usize,
}

/// Gate, fingerprint and dedup `raw` in input order. First occurrence of an id wins.
pub fn normalize_filter_dedup(raw: Vec<Listing>, chain: &FilterChain) -> (Vec<Listing>, FilterStats) {
    let mut stats = FilterStats::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for mut listing in raw {
        if let Some(pred) = chain.rejection(&listing) {
            tracing::trace!(title = %listing.title, predicate = pred, "listing rejected");
            counter!("digest_filtered_total", "predicate" => pred).increment(1);
            stats.rejected += 1;
            continue;
        }

        let id = listing.fingerprint();
        if !seen.insert(id.clone()) {
            counter!("digest_dedup_total").increment(1);
            stats.duplicates += 1;
            continue;
        }
        listing.id = Some(id);
        out.push(listing);
    }

    (out, stats)
}
