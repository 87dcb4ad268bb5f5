/*
 * MIT License
 *
 * Copyright (c) 2025 The wordle-suggest Authors
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

pub mod dispatch;
pub mod score;
pub mod session;

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::wordle::{GuessEntry, InvalidWord, Word, WordLists};
use crate::wordle::prelude::*;

pub use dispatch::CancelToken;
pub use session::{RequestId, Session, SessionEvent, StreamStatus};

/// Upper bound on the worker pool regardless of how many cores the machine has.
pub const MAX_WORKERS: usize = 8;
/// How many contiguous shards a request's candidate list is split into.
pub const DEFAULT_SHARDS: usize = 4;
/// Wall-clock budget for a single suggestion request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    InvalidWord(#[from] InvalidWord),
    #[error("engine is not initialized")]
    NotInitialized,
    #[error("request was cancelled")]
    Cancelled,
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("worker failure: {0}")]
    Internal(String),
}

///
/// The knobs a request does not choose: worker pool size, shard count and the
/// per-request wall-clock budget. These are soft policy, not correctness; the
/// binaries expose flags for all three.
///
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub workers: usize,
    pub shards: usize,
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            shards: DEFAULT_SHARDS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Leave one core for the caller, use at least one, and cap the pool.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).clamp(1, MAX_WORKERS)
}

///
/// The per-request options a caller chooses.
///
///   * strict_guesses = only suggest words that could still be the answer
///   * typed_prefix = only suggest words starting with what the user has
///     typed so far (case-insensitive; empty matches everything)
///   * top_k = how many suggestions to return
///
#[derive(Clone, Debug)]
pub struct Policy {
    pub strict_guesses: bool,
    pub typed_prefix: String,
    pub top_k: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            strict_guesses: false,
            typed_prefix: String::new(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// A candidate guess and the information gain (in bits) expected from playing
/// it. The score is +inf when the guess is a guaranteed solve.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ScoredGuess {
    pub word: Word,
    pub score: WordleFloat,
}

///
/// Ranking comparator shared by the scorer, the merge step and the tests:
/// score descending, ties broken by word ascending. Scores are never NaN
/// (they are log2 of counts >= 1, or +inf), so the partial comparison always
/// resolves.
///
pub fn rank_order(a: &ScoredGuess, b: &ScoredGuess) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.word.cmp(&b.word))
}

/// What a finished request produces: the ranked suggestions and how many
/// answers remain consistent with history.
#[derive(Clone, PartialEq, Debug)]
pub struct SuggestionResult {
    pub ranked: Vec<ScoredGuess>,
    pub remaining_answers: usize,
}

///
/// The engine owns the two immutable word universes and the worker pool that
/// scores candidates against them. Construct it once and share it; every
/// request borrows the universes read-only.
///
pub struct Engine {
    answers: Arc<Vec<Word>>,
    guesses: Arc<Vec<Word>>,
    pool: rayon::ThreadPool,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        answers: Vec<Word>,
        guesses: Vec<Word>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let workers = config.workers.clamp(1, MAX_WORKERS);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("suggest-worker-{}", i))
            .build()
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        log::info!(
            "engine ready: {} answers, {} guesses, {} workers",
            answers.len(),
            guesses.len(),
            workers
        );

        Ok(Self {
            answers: Arc::new(answers),
            guesses: Arc::new(guesses),
            pool,
            config,
        })
    }

    /// Builds an engine from already-parsed word lists, validating nothing
    /// further: Word construction is the ingest gate.
    pub fn from_lists(lists: WordLists, config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(lists.answers, lists.guesses, config)
    }

    /// Parses and validates raw word lists, then builds the engine. Any entry
    /// that is not a five letter word fails the whole construction.
    pub fn from_raw_lists<S: AsRef<str>>(
        answers: &[S],
        guesses: &[S],
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let parse = |texts: &[S]| -> Result<Vec<Word>, InvalidWord> {
            texts.iter().map(|t| Word::new(t.as_ref())).collect()
        };
        let answers = parse(answers)?;
        let guesses = parse(guesses)?;
        Self::new(answers, guesses, config)
    }

    pub fn answer_universe(&self) -> &[Word] {
        &self.answers
    }

    pub fn guess_universe(&self) -> &[Word] {
        &self.guesses
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    ///
    /// Computes the ranked suggestions for one request, blocking until done,
    /// cancelled or timed out. This is the single-shot form; the streaming
    /// form with progress events lives on [Session].
    ///
    pub fn suggest(
        &self,
        history: &[GuessEntry],
        policy: &Policy,
        cancel: &CancelToken,
    ) -> Result<SuggestionResult, EngineError> {
        dispatch::run(self, history, policy, cancel, |_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_worker_count_bounds() {
        let workers = default_worker_count();
        assert!(workers >= 1);
        assert!(workers <= MAX_WORKERS);
    }

    #[test]
    fn test_rank_order_sorts_by_score_then_word() {
        let w = |t: &str| Word::new(t).unwrap();
        let mut scored = vec![
            ScoredGuess { word: w("ZESTY"), score: 1.0 },
            ScoredGuess { word: w("AAAAA"), score: 1.0 },
            ScoredGuess { word: w("CRANE"), score: 2.5 },
            ScoredGuess { word: w("SLATE"), score: f64::INFINITY },
        ];
        scored.sort_by(rank_order);
        let words: Vec<String> = scored.iter().map(|s| s.word.to_string()).collect();
        assert_eq!(words, vec!["SLATE", "CRANE", "AAAAA", "ZESTY"]);
    }

    #[test]
    fn test_from_raw_lists_rejects_invalid_entries() {
        let result = Engine::from_raw_lists(
            &["CRANE", "TOOLONG"],
            &["CRANE"],
            EngineConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidWord(_))));
    }
}
