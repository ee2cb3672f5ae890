//! Fuzzy-matcher capability seam.
//!
//! The overlay treats ranked matching as an injected collaborator: anything
//! that can take the indexed documents once and answer ranked queries fits
//! behind [`Matcher`]. [`BuiltinMatcher`] is the bundled implementation so a
//! site works with no external matching library; hosts with their own engine
//! supply a different [`MatcherProvider`].

use ch_core::ChromeResult;

use crate::SearchDocument;

/// Matcher construction options, mirroring the library contract the overlay
/// was written against: scored results, a similarity cutoff, and the
/// document fields to match on.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    pub include_score: bool,
    pub threshold: f64,
    pub keys: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            include_score: true,
            threshold: 0.35,
            keys: vec!["title".to_owned(), "content".to_owned()],
        }
    }
}

/// One ranked hit. `index` addresses the document slice the matcher was
/// built over; `score` is a distance, zero being a perfect match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedMatch {
    pub index: usize,
    pub score: f64,
}

/// Ranked matching over the loaded index.
pub trait Matcher {
    fn search(&self, query: &str, limit: usize) -> Vec<RankedMatch>;
}

/// One-shot matcher construction. Loading is performed at most once per
/// page load; the caller caches the returned matcher.
pub trait MatcherProvider {
    fn load(
        &self,
        documents: &[SearchDocument],
        config: &MatcherConfig,
    ) -> ChromeResult<Box<dyn Matcher>>;
}

/// Default provider wiring [`BuiltinMatcher`] into the overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMatcherProvider;

impl MatcherProvider for BuiltinMatcherProvider {
    fn load(
        &self,
        documents: &[SearchDocument],
        config: &MatcherConfig,
    ) -> ChromeResult<Box<dyn Matcher>> {
        Ok(Box::new(BuiltinMatcher::new(documents, config)))
    }
}

/// Bundled matcher: containment beats subsequence coverage, earlier
/// containment beats later, and everything past the threshold is cut.
pub struct BuiltinMatcher {
    fields: Vec<Vec<String>>,
    threshold: f64,
}

impl BuiltinMatcher {
    pub fn new(documents: &[SearchDocument], config: &MatcherConfig) -> Self {
        let fields = documents
            .iter()
            .map(|document| {
                config
                    .keys
                    .iter()
                    .map(|key| document.field(key).to_lowercase())
                    .collect()
            })
            .collect();

        Self {
            fields,
            threshold: config.threshold,
        }
    }
}

impl Matcher for BuiltinMatcher {
    fn search(&self, query: &str, limit: usize) -> Vec<RankedMatch> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for (index, fields) in self.fields.iter().enumerate() {
            let score = fields
                .iter()
                .map(|field| field_score(field, &needle))
                .fold(1.0_f64, f64::min);
            if score <= self.threshold {
                out.push(RankedMatch { index, score });
            }
        }

        out.sort_by(|left, right| {
            left.score
                .partial_cmp(&right.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(left.index.cmp(&right.index))
        });
        out.truncate(limit);
        out
    }
}

/// Distance of one field from the query: 0 is a perfect match, 1 no match.
fn field_score(field: &str, needle: &str) -> f64 {
    if field.is_empty() {
        return 1.0;
    }

    if let Some(position) = field.find(needle) {
        // Contained matches always clear the default threshold; earlier
        // positions rank higher.
        let span = field.len().max(1) as f64;
        return 0.2 * (position as f64 / span);
    }

    let covered = subsequence_coverage(field, needle);
    if covered >= 1.0 {
        return 0.3;
    }
    1.0 - covered
}

/// Fraction of query characters found in order within the field.
fn subsequence_coverage(field: &str, needle: &str) -> f64 {
    let total = needle.chars().count();
    if total == 0 {
        return 0.0;
    }

    let mut matched = 0_usize;
    let mut field_chars = field.chars();
    for wanted in needle.chars() {
        if field_chars.any(|ch| ch == wanted) {
            matched += 1;
        } else {
            break;
        }
    }

    matched as f64 / total as f64
}
