pub mod messaging;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::ScoredGuess;
use crate::wordle::prelude::*;
use crate::wordle::{Coloring, Colorings, GuessEntry, InvalidWord, Word};

// Everything that speaks the outside world's encoding lives in this module
// tree: the engine's own types never carry serde derives. Scores are the one
// subtle spot -- JSON has no +inf, so the forced-win sentinel travels as the
// largest finite f64, and receivers treat anything at or above it as the
// sentinel.

pub const SCORE_SENTINEL: f64 = f64::MAX;

pub fn encode_score(score: WordleFloat) -> f64 {
    if score.is_infinite() {
        SCORE_SENTINEL
    } else {
        score
    }
}

pub fn is_sentinel_score(encoded: f64) -> bool {
    encoded >= SCORE_SENTINEL
}

/// Raised when a request body cannot be turned into engine types.
#[derive(Error, Debug)]
pub enum DecodeErr {
    #[error(transparent)]
    InvalidWord(#[from] InvalidWord),
    #[error("feedback must have exactly five colors, got {0}")]
    BadFeedbackLength(usize),
}

#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ColorDto {
    Gray,
    Yellow,
    Green,
}

impl From<ColorDto> for Coloring {
    fn from(color: ColorDto) -> Self {
        match color {
            ColorDto::Gray => Coloring::Excluded,
            ColorDto::Yellow => Coloring::Misplaced,
            ColorDto::Green => Coloring::Correct,
        }
    }
}

impl From<Coloring> for ColorDto {
    fn from(coloring: Coloring) -> Self {
        match coloring {
            Coloring::Excluded => ColorDto::Gray,
            Coloring::Misplaced => ColorDto::Yellow,
            Coloring::Correct => ColorDto::Green,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeedbackDto {
    pub colors: Vec<ColorDto>,
}

/// One observed round as transports carry it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GuessEntryDto {
    pub word: String,
    pub feedback: FeedbackDto,
}

impl GuessEntryDto {
    pub fn decode(&self) -> Result<GuessEntry, DecodeErr> {
        let word = Word::new(&self.word)?;

        if self.feedback.colors.len() != WORD_SIZE {
            return Err(DecodeErr::BadFeedbackLength(self.feedback.colors.len()));
        }
        let mut coloring = Colorings::default();
        for (i, color) in self.feedback.colors.iter().enumerate() {
            coloring[i] = (*color).into();
        }

        Ok(GuessEntry::new(word, coloring))
    }
}

pub fn decode_history(entries: &[GuessEntryDto]) -> Result<Vec<GuessEntry>, DecodeErr> {
    entries.iter().map(GuessEntryDto::decode).collect()
}

/// A suggestion as transports carry it, with the score already encoded.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SuggestionDto {
    pub word: String,
    pub score: f64,
}

impl From<&ScoredGuess> for SuggestionDto {
    fn from(scored: &ScoredGuess) -> Self {
        Self {
            word: scored.word.to_string(),
            score: encode_score(scored.score),
        }
    }
}

pub fn encode_suggestions(ranked: &[ScoredGuess]) -> Vec<SuggestionDto> {
    ranked.iter().map(SuggestionDto::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_sentinel_roundtrip() {
        assert!(is_sentinel_score(encode_score(WordleFloat::INFINITY)));
        assert!(!is_sentinel_score(encode_score(3.5)));
        assert_eq!(encode_score(3.5), 3.5);
        // the documented threshold is the largest finite f64
        assert!(is_sentinel_score(1.7976931348623157e308));
    }

    #[test]
    fn test_color_names_on_the_wire() {
        let json = serde_json::to_string(&vec![ColorDto::Gray, ColorDto::Yellow, ColorDto::Green])
            .unwrap();
        assert_eq!(json, r#"["gray","yellow","green"]"#);
    }

    #[test]
    fn test_decode_guess_entry() {
        let dto: GuessEntryDto = serde_json::from_str(
            r#"{"word":"slate","feedback":{"colors":["green","gray","yellow","gray","gray"]}}"#,
        )
        .unwrap();
        let entry = dto.decode().unwrap();
        assert_eq!(entry.word.to_string(), "SLATE");
        assert_eq!(entry.coloring[0], Coloring::Correct);
        assert_eq!(entry.coloring[2], Coloring::Misplaced);
        assert_eq!(entry.coloring[4], Coloring::Excluded);
    }

    #[test]
    fn test_decode_rejects_malformed_entries() {
        let short: GuessEntryDto = serde_json::from_str(
            r#"{"word":"slate","feedback":{"colors":["green","gray"]}}"#,
        )
        .unwrap();
        assert!(matches!(short.decode(), Err(DecodeErr::BadFeedbackLength(2))));

        let bad_word: GuessEntryDto = serde_json::from_str(
            r#"{"word":"toolong","feedback":{"colors":["gray","gray","gray","gray","gray"]}}"#,
        )
        .unwrap();
        assert!(matches!(bad_word.decode(), Err(DecodeErr::InvalidWord(_))));
    }
}
