//! Memoization of analysis results.
//!
//! Results are keyed by an xxh3 hash of the submission text plus a
//! fingerprint of everything else that influences the result (analyzer
//! settings and grader, rubric, references, options). The cache is owned by the host and injected into the
//! [`Analyzer`](crate::analyzer::Analyzer); there is no global instance.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use log::{debug, warn};
use xxhash_rust::xxh3::Xxh3;

use crate::config::AnalyzerConfig;
use crate::detection::PlagiarismResult;
use crate::grading::types::GradingResult;
use crate::grading::Rubric;
use crate::models::ReferenceText;

/// Incremental builder for cache keys.
pub struct CacheKey {
    hasher: Xxh3,
}

impl CacheKey {
    pub fn new(namespace: &str) -> Self {
        let mut key = Self {
            hasher: Xxh3::new(),
        };
        key.push_str(namespace);
        key
    }

    /// Length-prefixed so adjacent fields cannot run together.
    pub fn push_str(&mut self, value: &str) -> &mut Self {
        self.hasher.update(&(value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn push_u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn push_f64(&mut self, value: f64) -> &mut Self {
        self.push_u64(value.to_bits())
    }

    pub fn finish(&self) -> u64 {
        self.hasher.digest()
    }
}

/// Fingerprint of the analyzer settings that shape a result.
///
/// Analyzers with different thresholds or graders can share one cache
/// without seeing each other's entries.
pub fn analyzer_fingerprint(config: &AnalyzerConfig, grader: Option<&str>) -> u64 {
    let mut key = CacheKey::new("analyzer");
    key.push_str(&format!("{:?}", config));
    match grader {
        Some(model) => key.push_u64(1).push_str(model),
        None => key.push_u64(0),
    };
    key.finish()
}

/// Key for a grading request.
pub fn grading_key(fingerprint: u64, text: &str, rubric: &Rubric, max_score: Option<f64>) -> u64 {
    let mut key = CacheKey::new("grade");
    key.push_u64(fingerprint)
        .push_str(text)
        .push_u64(rubric.len() as u64);
    for criterion in rubric.iter() {
        key.push_str(&criterion.name)
            .push_u64(criterion.max_points as u64)
            .push_f64(criterion.effective_weight());
    }
    match max_score {
        Some(max) => key.push_u64(1).push_f64(max),
        None => key.push_u64(0),
    };
    key.finish()
}

/// Key for a plagiarism request.
pub fn detection_key(fingerprint: u64, text: &str, references: &[ReferenceText]) -> u64 {
    let mut key = CacheKey::new("detect");
    key.push_u64(fingerprint)
        .push_str(text)
        .push_u64(references.len() as u64);
    for reference in references {
        key.push_str(&reference.id).push_str(&reference.text);
    }
    key.finish()
}

/// Hit and miss counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe get-or-compute map.
///
/// Values are inserted only after computation finishes, so a reader never
/// observes a partial result. Two concurrent misses on the same key may both
/// compute; the last insert wins and both values are equal.
pub struct ResultCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Eq + Hash, V: Clone> ResultCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Stop inserting once `max` entries are held.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let found = match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => {
                warn!("Result cache lock poisoned; bypassing cache");
                None
            }
        };
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&self, key: K, value: V) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("Result cache lock poisoned; skipping insert");
            return;
        };
        if let Some(max) = self.max_entries {
            if entries.len() >= max && !entries.contains_key(&key) {
                debug!("Result cache full ({} entries); skipping insert", max);
                return;
            }
        }
        entries.insert(key, value);
    }

    /// Return the cached value or compute, store and return a new one.
    ///
    /// Errors from `compute` are returned and nothing is stored.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        self.get_or_try_insert_when(key, compute, |_| true)
    }

    /// Like [`get_or_try_insert_with`](Self::get_or_try_insert_with), but a
    /// computed value is only stored when `keep` accepts it.
    pub fn get_or_try_insert_when<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
        keep: impl FnOnce(&V) -> bool,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        if keep(&value) {
            self.insert(key, value.clone());
        }
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Default for ResultCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Caches for the analyzer's expensive operations.
#[derive(Default)]
pub struct AnalysisCache {
    pub grading: ResultCache<u64, GradingResult>,
    pub plagiarism: ResultCache<u64, PlagiarismResult>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound each cache to `max` entries.
    pub fn with_max_entries(max: usize) -> Self {
        Self {
            grading: ResultCache::new().with_max_entries(max),
            plagiarism: ResultCache::new().with_max_entries(max),
        }
    }

    pub fn clear(&self) {
        self.grading.clear();
        self.plagiarism.clear();
    }
}
