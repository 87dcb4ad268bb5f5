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

use super::color::Colorings;
use super::word::Word;

///
/// One observed round: the word the player guessed and the colors the judge
/// painted for it.
///
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct GuessEntry {
    pub word: Word,
    pub coloring: Colorings,
}

impl GuessEntry {
    pub fn new(word: Word, coloring: Colorings) -> Self {
        Self { word, coloring }
    }
}

///
/// Tests whether a word could still be the secret answer given every round
/// observed so far.
///
/// A word is consistent with a round (g, f) exactly when a correct judge,
/// scoring g against that word, would have painted f. Replaying the judge and
/// comparing colorings handles all of the duplicate-letter subtleties for
/// free, because the judge itself does.
///
pub fn matches_history(word: &Word, history: &[GuessEntry]) -> bool {
    history
        .iter()
        .all(|entry| Colorings::with_guess_answer(&entry.word, word) == entry.coloring)
}

/// The subset of the answer universe consistent with history, in universe order.
pub fn surviving_answers(universe: &[Word], history: &[GuessEntry]) -> Vec<Word> {
    universe
        .iter()
        .filter(|answer| matches_history(answer, history))
        .copied()
        .collect()
}

///
/// The subset of the guess universe eligible to be suggested: words matching
/// the typed prefix (empty prefix matches all), and, when strict is set, words
/// that could themselves still be the answer.
///
pub fn candidate_guesses(
    universe: &[Word],
    history: &[GuessEntry],
    strict: bool,
    typed_prefix: &str,
) -> Vec<Word> {
    universe
        .iter()
        .filter(|guess| guess.starts_with(typed_prefix))
        .filter(|guess| !strict || matches_history(guess, history))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordle::color::Coloring::*;

    fn w(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    fn entry(guess: &str, letters: &str) -> GuessEntry {
        GuessEntry::new(w(guess), Colorings::from_letters(letters).unwrap())
    }

    fn universe(words: &[&str]) -> Vec<Word> {
        words.iter().map(|t| w(t)).collect()
    }

    #[test]
    fn test_filter_agrees_with_judge() {
        // a word passes the filter exactly when the judge reproduces the
        // observed coloring against it
        let guess = w("SLATE");
        let words = universe(&["SCAMP", "SHARD", "CRANE", "SLATE", "SALTY", "GLOBE"]);

        for answer in &words {
            let observed = Colorings::with_guess_answer(&guess, answer);
            let history = [GuessEntry::new(guess, observed)];
            assert!(matches_history(answer, &history), "{} must match its own coloring", answer);

            // every other coloring must reject the word
            for other in &words {
                let foreign = Colorings::with_guess_answer(&guess, other);
                if foreign != observed {
                    assert!(
                        !matches_history(answer, &[GuessEntry::new(guess, foreign)]),
                        "{} must not match the coloring produced by {}",
                        answer,
                        other,
                    );
                }
            }
        }
    }

    #[test]
    fn test_filter_is_monotonic_in_history() {
        // adding rounds can only shrink the set of consistent words
        let words = universe(&["CRANE", "CRONE", "CRIME", "GRIME", "PRIDE"]);
        let h1 = vec![entry("SLATE", "BBYBG")];
        let mut h2 = h1.clone();
        h2.push(entry("PRICE", "BGGBG"));

        for word in &words {
            if matches_history(word, &h2) {
                assert!(matches_history(word, &h1), "{} passed h2 but failed its prefix", word);
            }
        }
    }

    #[test]
    fn test_surviving_answers_preserves_universe_order() {
        let answers = universe(&["MOURN", "CRANE", "CHOIR", "CRUMB"]);
        // an all-gray SLATE eliminates every word containing S, L, A, T or E
        let history = [entry("SLATE", "BBBBB")];
        let surviving = surviving_answers(&answers, &history);
        assert_eq!(surviving, universe(&["MOURN", "CHOIR", "CRUMB"]));
    }

    #[test]
    fn test_empty_history_survives_everything() {
        let answers = universe(&["AAAAA", "ZZZZZ"]);
        assert_eq!(surviving_answers(&answers, &[]), answers);
    }

    #[test]
    fn test_contradictory_history_survives_nothing() {
        let answers = universe(&["CRANE", "SLATE"]);
        let history = [
            entry("CRANE", "GGGGG"),
            entry("SLATE", "GGGGG"),
        ];
        assert!(surviving_answers(&answers, &history).is_empty());
    }

    #[test]
    fn test_candidate_guesses_prefix_filter() {
        let guesses = universe(&["STORM", "STONE", "SLATE", "TRAIN"]);
        assert_eq!(
            candidate_guesses(&guesses, &[], false, "st"),
            universe(&["STORM", "STONE"]),
        );
        assert_eq!(candidate_guesses(&guesses, &[], false, ""), guesses);
        assert!(candidate_guesses(&guesses, &[], false, "Q").is_empty());
    }

    #[test]
    fn test_candidate_guesses_strict_filter() {
        let guesses = universe(&["CRANE", "CRIME", "SLATE"]);
        // C, R and E confirmed in place, A gray
        let history = [entry("CRANE", "GGBBG")];
        assert_eq!(
            candidate_guesses(&guesses, &history, true, ""),
            universe(&["CRIME"]),
        );
        // without strict filtering, eliminated words remain guessable probes
        assert_eq!(candidate_guesses(&guesses, &history, false, ""), guesses);
    }

    #[test]
    fn test_duplicate_letter_rounds() {
        // ABBEY with the second B gray means exactly one B in the answer
        let history = [GuessEntry::new(
            w("ABBEY"),
            Colorings([Correct, Correct, Excluded, Excluded, Excluded]),
        )];
        assert!(!matches_history(&w("ABBOT"), &history));

        let one_b = w("ABOVE");
        let observed = Colorings::with_guess_answer(&w("ABBEY"), &one_b);
        assert!(matches_history(&one_b, &[GuessEntry::new(w("ABBEY"), observed)]));
    }
}
