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

use super::{CancelToken, EngineError, ScoredGuess};
use crate::wordle::prelude::*;
use crate::wordle::{Colorings, Word};

///
/// Computes the information gained, on average, by playing `guess` when the
/// remaining possibilities are `answers`.
///
/// I like to think of "information" as a measurement of how much of the search
/// space a guess eliminates. We cannot know which coloring the judge will
/// paint, but for every hypothetical answer we can compute the coloring it
/// would produce, which partitions the answers into buckets -- one per
/// coloring. Seeing a coloring narrows the field to its bucket.
///
/// With every remaining answer equally likely, the entropy of the field is
/// log2(N) bits and a bucket of size |B| leaves log2(|B|) bits behind, reached
/// with probability |B|/N. The expected gain is therefore
///
/// ```text
/// log2(N) - sum over buckets of (|B|/N) * log2(|B|)
/// ```
///
/// A guess whose buckets are all singletons gains the full log2(N); a guess
/// that leaves every answer in one bucket gains nothing.
///
/// The buckets live in a fixed 243-slot array indexed by the coloring's base-3
/// code, so the inner loop allocates nothing.
///
pub fn information_gain(guess: &Word, answers: &[Word]) -> WordleFloat {
    let mut buckets = [0u32; Colorings::NUM_STATES];
    for answer in answers {
        let coloring = Colorings::with_guess_answer(guess, answer);
        buckets[coloring.to_code() as usize] += 1;
    }

    let n = answers.len() as WordleFloat;

    // buckets of size 0 or 1 contribute nothing (log2(1) = 0)
    let expected_remaining: WordleFloat = buckets
        .iter()
        .filter(|count| **count > 1)
        .map(|count| {
            let count = *count as WordleFloat;
            (count / n) * count.log2()
        })
        .sum();

    n.log2() - expected_remaining
}

///
/// Scores one contiguous shard of candidate guesses against the shared
/// surviving-answer set, checking for cancellation between guesses. The output
/// is unsorted; ordering is the merge step's job.
///
pub fn score_shard(
    shard: &[Word],
    answers: &[Word],
    cancel: &CancelToken,
) -> Result<Vec<ScoredGuess>, EngineError> {
    let mut out = Vec::with_capacity(shard.len());
    for guess in shard {
        if cancel.is_fired() {
            return Err(EngineError::Cancelled);
        }

        out.push(ScoredGuess {
            word: *guess,
            score: information_gain(guess, answers),
        });
    }

    Ok(out)
}
