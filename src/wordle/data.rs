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

use std::path::Path;
use std::str::Utf8Error;

use rust_embed::RustEmbed;
use thiserror::Error;

use super::word::{InvalidWord, Word};

// Word lists shipped with the binary. One word per line; blank lines are
// skipped; anything that isn't five letters fails the whole load.
pub const DATA_DIRECTORY: &str = "data/";
pub const ANSWERS_FILE_NAME: &str = "answers.txt";
pub const GUESSES_FILE_NAME: &str = "guesses.txt";

#[derive(RustEmbed)]
#[folder = "data/"]
struct RawData;

/// The two word universes the engine is built from: the words that can be the
/// secret answer, and the (usually larger) set of words a player may guess.
#[derive(Clone, Debug)]
pub struct WordLists {
    pub answers: Vec<Word>,
    pub guesses: Vec<Word>,
}

#[derive(Error, Debug)]
pub enum LoadDataErr {
    #[error("missing word list file '{0}'")]
    MissingFile(String),
    #[error(transparent)]
    EncodingError(#[from] Utf8Error),
    #[error(transparent)]
    NonWordleWord(#[from] InvalidWord),
    #[error("failed to read '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl WordLists {
    /// Loads the word lists shipped inside the binary.
    pub fn embedded() -> Result<Self, LoadDataErr> {
        let out = Self {
            answers: parse_word_list(&retrieve_embedded_str(ANSWERS_FILE_NAME)?)?,
            guesses: parse_word_list(&retrieve_embedded_str(GUESSES_FILE_NAME)?)?,
        };
        log::debug!(
            "loaded embedded word lists: {} answers, {} guesses",
            out.answers.len(),
            out.guesses.len()
        );
        Ok(out)
    }

    /// Loads word lists from the two files the caller points at.
    pub fn from_files(answers: &Path, guesses: &Path) -> Result<Self, LoadDataErr> {
        let out = Self {
            answers: parse_word_list(&read_file_to_string(answers)?)?,
            guesses: parse_word_list(&read_file_to_string(guesses)?)?,
        };
        log::debug!(
            "loaded word lists from disk: {} answers, {} guesses",
            out.answers.len(),
            out.guesses.len()
        );
        Ok(out)
    }
}

/// Parses a word list: one word per line, blank lines ignored, case folded.
/// A line that is not a valid five letter word fails the load with the
/// offending text, rather than being silently dropped.
pub fn parse_word_list(contents: &str) -> Result<Vec<Word>, InvalidWord> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Word::new)
        .collect()
}

fn retrieve_embedded_str(name: &str) -> Result<String, LoadDataErr> {
    let f: rust_embed::EmbeddedFile = if let Some(data) = RawData::get(name) {
        data
    } else {
        // during development the data directory may not have been embedded yet
        if let Ok(out) = std::fs::read_to_string(format!("{}{}", DATA_DIRECTORY, name)) {
            return Ok(out);
        }

        return Err(LoadDataErr::MissingFile(name.to_string()));
    };

    Ok(std::str::from_utf8(&f.data)
        .map_err(LoadDataErr::EncodingError)?
        .to_string())
}

fn read_file_to_string(path: &Path) -> Result<String, LoadDataErr> {
    std::fs::read_to_string(path).map_err(|source| LoadDataErr::Io {
        path: path.display().to_string(),
        source,
    })
}
