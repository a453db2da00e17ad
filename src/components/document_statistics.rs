//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zift.
//! The Zift project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Document Statistics
//!
//! Document frequency of every term over a corpus, with pruning and dense
//! term indices.
//!
//! ## Training
//!
//! One `fit` call is one document. The document is tokenized by the
//! configured analyzer, every token is passed through the optional
//! decorator, and each distinct term of the document adds one to its
//! document count. The total document count grows by one per call.
//!
//! ## Completion
//!
//! 1. Terms whose `count / total` falls outside `[min_df, max_df]` are
//!    dropped (only when `min_df > 0` or `max_df < 1`).
//! 2. When `top_k` is set and smaller than the number of terms, the K-th
//!    largest count is located with [`kth_largest`]. Terms above it are kept;
//!    terms tied at it are kept in ascending text order until K terms remain.
//! 3. Surviving terms get indices from [`create_index_map`], seeded with the
//!    configured vocabulary.
//!
//! The published annotation maps each term to `(document count, index)`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::annotation::ZiAnnotationView;
use crate::components::index_map::create_index_map;
use crate::components::training::{ZiAnnotationEstimator, ZiTrainingPolicy};
use crate::errors::{Result, ZiError};
use crate::estimator::ZiFitResult;
use crate::select::kth_largest;
use crate::strings::{to_lower, ZiAnalyzer, ZiDocumentParser};

/// Transformation applied to every token before counting.
pub type ZiStringDecorator = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Decorator that lowercases tokens.
pub fn lowercase_decorator() -> ZiStringDecorator {
    Arc::new(to_lower)
}

/// Serializable document statistics settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiDocumentStatisticsConfig {
    pub analyzer: ZiAnalyzer,
    pub regex: Option<String>,
    pub vocabulary: Option<BTreeMap<String, u32>>,
    pub top_k: Option<u32>,
    pub min_df: f32,
    pub max_df: f32,
    pub ngram_min: u32,
    pub ngram_max: u32,
    /// Lowercases tokens before counting.
    pub lowercase: bool,
}

impl Default for ZiDocumentStatisticsConfig {
    fn default() -> Self {
        Self {
            analyzer: ZiAnalyzer::Word,
            regex: None,
            vocabulary: None,
            top_k: None,
            min_df: 0.0,
            max_df: 1.0,
            ngram_min: 1,
            ngram_max: 1,
            lowercase: false,
        }
    }
}

/// Published result of document statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct ZiDocumentStatisticsAnnotation {
    term_frequency_and_index: BTreeMap<String, (u32, u32)>,
    total_documents: u32,
}

impl ZiDocumentStatisticsAnnotation {
    /// Fails when no term survived or no document was seen.
    pub fn new(term_frequency_and_index: BTreeMap<String, (u32, u32)>, total_documents: u32) -> Result<Self> {
        if term_frequency_and_index.is_empty() {
            return Err(ZiError::invalid_argument("document statistics produced no terms"));
        }
        if total_documents == 0 {
            return Err(ZiError::invalid_argument("document statistics saw no documents"));
        }
        Ok(Self {
            term_frequency_and_index,
            total_documents,
        })
    }

    /// Term to `(document count, index)`.
    pub fn term_frequency_and_index(&self) -> &BTreeMap<String, (u32, u32)> {
        &self.term_frequency_and_index
    }

    pub fn total_documents(&self) -> u32 {
        self.total_documents
    }

    pub fn frequency(&self, term: &str) -> Option<u32> {
        self.term_frequency_and_index.get(term).map(|(count, _)| *count)
    }

    pub fn index(&self, term: &str) -> Option<u32> {
        self.term_frequency_and_index.get(term).map(|(_, index)| *index)
    }

    /// Term to index.
    pub fn index_map(&self) -> BTreeMap<String, u32> {
        self.term_frequency_and_index
            .iter()
            .map(|(term, (_, index))| (term.clone(), *index))
            .collect()
    }
}

/// Training policy behind [`ZiDocumentStatisticsEstimator`].
pub struct ZiDocumentStatisticsPolicy {
    decorator: Option<ZiStringDecorator>,
    parser: ZiDocumentParser,
    existing_vocabulary: Option<BTreeMap<String, u32>>,
    top_k: Option<u32>,
    min_df: f32,
    max_df: f32,
    term_frequency: HashMap<String, u32>,
    total_documents: u32,
}

impl ZiDocumentStatisticsPolicy {
    /// Validates `config`; `decorator` takes precedence over `config.lowercase`.
    pub fn new(config: &ZiDocumentStatisticsConfig, decorator: Option<ZiStringDecorator>) -> Result<Self> {
        if matches!(&config.vocabulary, Some(vocabulary) if vocabulary.is_empty()) {
            return Err(ZiError::invalid_argument("existing vocabulary must not be empty"));
        }
        if config.top_k == Some(0) {
            return Err(ZiError::invalid_argument("top_k must be positive"));
        }
        if !(0.0..=1.0).contains(&config.min_df) {
            return Err(ZiError::invalid_argument("min_df must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&config.max_df) {
            return Err(ZiError::invalid_argument("max_df must be within [0, 1]"));
        }
        if config.min_df > config.max_df {
            return Err(ZiError::invalid_argument("min_df > max_df"));
        }

        let parser = ZiDocumentParser::new(
            config.analyzer,
            config.regex.as_deref(),
            config.ngram_min,
            config.ngram_max,
        )?;

        let decorator = decorator.or_else(|| config.lowercase.then(lowercase_decorator));

        Ok(Self {
            decorator,
            parser,
            existing_vocabulary: config.vocabulary.clone(),
            top_k: config.top_k,
            min_df: config.min_df,
            max_df: config.max_df,
            term_frequency: HashMap::new(),
            total_documents: 0,
        })
    }

    pub fn parser(&self) -> &ZiDocumentParser {
        &self.parser
    }

    fn count_term(&mut self, term: &str) {
        match self.term_frequency.get_mut(term) {
            Some(count) => *count = count.saturating_add(1),
            None => {
                self.term_frequency.insert(term.to_string(), 1);
            }
        }
    }
}

impl ZiTrainingPolicy<String> for ZiDocumentStatisticsPolicy {
    const NAME: &'static str = "DocumentStatisticsEstimator";
    type Annotation = ZiDocumentStatisticsAnnotation;

    fn fit(&mut self, document: &String) -> Result<ZiFitResult> {
        let processed = self.parser.preprocess(document);

        match self.decorator.clone() {
            Some(decorate) => {
                let mut terms = HashSet::new();
                self.parser.tokenize(&processed, |token| {
                    terms.insert(decorate(token));
                });
                for term in &terms {
                    self.count_term(term);
                }
            }
            None => {
                let mut terms = HashSet::new();
                self.parser.tokenize(&processed, |token| {
                    terms.insert(token);
                });
                for term in terms {
                    self.count_term(term);
                }
            }
        }

        self.total_documents = self.total_documents.saturating_add(1);
        Ok(ZiFitResult::Continue)
    }

    fn complete_training(&mut self, _annotations: &ZiAnnotationView) -> Result<Self::Annotation> {
        let term_frequency: BTreeMap<String, u32> = std::mem::take(&mut self.term_frequency).into_iter().collect();
        let pruned = prune_term_frequency(
            term_frequency,
            self.min_df,
            self.max_df,
            self.total_documents,
            self.top_k,
        );

        let index_map = create_index_map(&pruned, self.existing_vocabulary.take().unwrap_or_default())?;

        let merged = pruned
            .into_iter()
            .map(|(term, count)| {
                let index = index_map.get(&term).copied().ok_or_else(|| {
                    ZiError::internal(format!("term '{term}' has no index"))
                })?;
                Ok((term, (count, index)))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        log::info!(
            "document statistics kept {} term(s) over {} document(s)",
            merged.len(),
            self.total_documents
        );
        ZiDocumentStatisticsAnnotation::new(merged, self.total_documents)
    }
}

/// Applies document-frequency bounds, then top-K selection.
pub fn prune_term_frequency(
    term_frequency: BTreeMap<String, u32>,
    min_df: f32,
    max_df: f32,
    total_documents: u32,
    top_k: Option<u32>,
) -> BTreeMap<String, u32> {
    let term_frequency: BTreeMap<String, u32> = if min_df > 0.0 || max_df < 1.0 {
        let total = total_documents as f32;
        term_frequency
            .into_iter()
            .filter(|(_, count)| {
                let frequency = *count as f32 / total;
                frequency >= min_df && frequency <= max_df
            })
            .collect()
    } else {
        term_frequency
    };

    let k = match top_k {
        Some(k) if (k as usize) < term_frequency.len() => k as usize,
        _ => return term_frequency,
    };

    let mut counts: Vec<u32> = term_frequency.values().copied().collect();
    let threshold = match kth_largest(&mut counts, k) {
        Some(threshold) => threshold,
        None => return term_frequency,
    };

    let above = term_frequency.values().filter(|count| **count > threshold).count();
    let mut ties_to_keep = k - above;

    // Ascending key order makes the lexicographically smallest ties win.
    term_frequency
        .into_iter()
        .filter(|(_, count)| {
            if *count > threshold {
                true
            } else if *count == threshold && ties_to_keep > 0 {
                ties_to_keep -= 1;
                true
            } else {
                false
            }
        })
        .collect()
}

pub type ZiDocumentStatisticsEstimator = ZiAnnotationEstimator<String, ZiDocumentStatisticsPolicy>;
