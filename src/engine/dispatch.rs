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

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{mpsc, Arc};
use std::time::Instant;

use super::score::score_shard;
use super::{rank_order, Engine, EngineError, Policy, ScoredGuess, SuggestionResult};
use crate::util::TopK;
use crate::wordle::prelude::*;
use crate::wordle::{candidate_guesses, surviving_answers, GuessEntry};

///
/// Cooperative cancellation flag shared between the request owner and every
/// worker scoring a shard for it. Firing is idempotent; workers poll the flag
/// between guesses and stop at the next boundary.
///
#[derive(Clone, Default)]
pub struct CancelToken {
    fired: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        if !self.fired.swap(true, AtomicOrdering::SeqCst) {
            log::debug!("cancellation fired");
        }
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(AtomicOrdering::SeqCst)
    }
}

/// A snapshot of the best suggestions merged so far. `depth` counts merged
/// shards; the snapshot after the final shard is the complete ranking.
pub struct ProgressUpdate<'a> {
    pub ranked: &'a [ScoredGuess],
    pub remaining_answers: usize,
    pub depth: usize,
    pub max_depth: usize,
}

///
/// Runs one suggestion request to completion: derives the surviving answers
/// and candidate guesses, fans the candidates out over the worker pool in
/// contiguous shards, and merges per-shard scores as they arrive, invoking
/// `on_progress` after each merge.
///
/// The degenerate cases never reach the pool:
///   * no surviving answers -> empty ranking, zero remaining, no error
///   * one surviving answer -> that word alone with an infinite score
///   * no candidate guesses -> empty ranking with the survivor count
///
/// Cancellation, a worker failure, or the wall-clock deadline each abandon the
/// merge immediately; outstanding workers notice the fired token and bail at
/// their next shard boundary.
///
pub(crate) fn run(
    engine: &Engine,
    history: &[GuessEntry],
    policy: &Policy,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(ProgressUpdate<'_>),
) -> Result<SuggestionResult, EngineError> {
    let deadline = Instant::now() + engine.config.timeout;

    let surviving = Arc::new(surviving_answers(engine.answer_universe(), history));
    let remaining = surviving.len();

    if remaining == 0 {
        return Ok(SuggestionResult {
            ranked: Vec::new(),
            remaining_answers: 0,
        });
    }

    if remaining == 1 {
        return Ok(SuggestionResult {
            ranked: vec![ScoredGuess {
                word: surviving[0],
                score: WordleFloat::INFINITY,
            }],
            remaining_answers: 1,
        });
    }

    let candidates = candidate_guesses(
        engine.guess_universe(),
        history,
        policy.strict_guesses,
        &policy.typed_prefix,
    );

    if candidates.is_empty() {
        return Ok(SuggestionResult {
            ranked: Vec::new(),
            remaining_answers: remaining,
        });
    }

    let candidates = Arc::new(candidates);
    let shard_len = shard_length(candidates.len(), engine.config.shards);
    let shard_count = (candidates.len() + shard_len - 1) / shard_len;

    log::debug!(
        "dispatching {} candidates over {} shards against {} answers",
        candidates.len(),
        shard_count,
        remaining
    );

    let (tx, rx) = mpsc::channel::<Result<Vec<ScoredGuess>, EngineError>>();
    for shard_idx in 0..shard_count {
        let start = shard_idx * shard_len;
        let end = (start + shard_len).min(candidates.len());

        let tx = tx.clone();
        let cancel = cancel.clone();
        let candidates = Arc::clone(&candidates);
        let surviving = Arc::clone(&surviving);
        engine.pool.spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                score_shard(&candidates[start..end], &surviving, &cancel)
            }));
            let result = outcome.unwrap_or_else(|panic| Err(describe_panic(panic)));
            // the receiver goes away when the request is abandoned
            let _ = tx.send(result);
        });
    }
    drop(tx);

    let mut top = TopK::new(policy.top_k, rank_order);
    let mut merged = 0;
    while merged < shard_count {
        if cancel.is_fired() {
            return Err(EngineError::Cancelled);
        }

        let now = Instant::now();
        if now >= deadline {
            cancel.fire();
            return Err(EngineError::Timeout(engine.config.timeout));
        }

        match rx.recv_timeout(deadline - now) {
            Ok(Ok(scored)) => {
                merged += 1;
                top.extend(scored);
                on_progress(ProgressUpdate {
                    ranked: top.as_slice(),
                    remaining_answers: remaining,
                    depth: merged,
                    max_depth: shard_count,
                });
            }
            Ok(Err(EngineError::Cancelled)) => return Err(EngineError::Cancelled),
            Ok(Err(err)) => {
                // one worker failed; stop the rest and surface the failure
                cancel.fire();
                return Err(err);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                cancel.fire();
                return Err(EngineError::Timeout(engine.config.timeout));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                cancel.fire();
                return Err(EngineError::Internal(
                    "workers disconnected before completing".to_string(),
                ));
            }
        }
    }

    Ok(SuggestionResult {
        ranked: top.into_sorted_vec(),
        remaining_answers: remaining,
    })
}

fn shard_length(candidates: usize, shards: usize) -> usize {
    let shards = shards.max(1);
    ((candidates + shards - 1) / shards).max(1)
}

fn describe_panic(panic: Box<dyn std::any::Any + Send>) -> EngineError {
    let message = if let Some(text) = panic.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "worker panicked".to_string()
    };

    EngineError::Internal(message)
}
