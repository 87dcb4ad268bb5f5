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

use std::fmt::{self, Debug, Display, Formatter, Write as _};
use thiserror::Error;

use super::prelude::*;

///
/// A five letter word, stored as exactly WORD_SIZE uppercase ASCII bytes.
///
/// Input is normalized on construction (trimmed, uppercased); anything that is
/// not exactly five A-Z letters after normalization is rejected with
/// InvalidWord. Equality, ordering and hashing are all byte-level, which makes
/// Word cheap to copy, compare and bucket in the scoring inner loop.
///
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word([u8; WORD_SIZE]);

/// Raised when text cannot be normalized into a five letter A-Z word.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid five letter word")]
pub struct InvalidWord(pub String);

impl Word {
    pub fn new(text: &str) -> Result<Self, InvalidWord> {
        let cleaned = text.trim();
        if cleaned.len() != WORD_SIZE {
            return Err(InvalidWord(text.to_string()));
        }

        let mut letters = [0u8; WORD_SIZE];
        for (i, b) in cleaned.bytes().enumerate() {
            let b = b.to_ascii_uppercase();
            if !is_word_char(b) {
                return Err(InvalidWord(text.to_string()));
            }
            letters[i] = b;
        }

        Ok(Self(letters))
    }

    /// The raw uppercase ASCII bytes of this word.
    #[inline]
    pub fn bytes(&self) -> &[u8; WORD_SIZE] {
        &self.0
    }

    /// Returns the number of times each letter of the alphabet occurs in this
    /// word, indexed by the position of the letter in the alphabet.
    pub fn count_letters(&self) -> [u8; ALPHABET_SIZE] {
        let mut out = [0; ALPHABET_SIZE];
        for i in 0..WORD_SIZE {
            out[letter_idx(self.0[i])] += 1;
        }

        out
    }

    /// Case-insensitive prefix test. An empty prefix matches every word; a
    /// prefix longer than the word matches none.
    pub fn starts_with(&self, prefix: &str) -> bool {
        let prefix = prefix.trim();
        if prefix.len() > WORD_SIZE {
            return false;
        }

        prefix
            .bytes()
            .enumerate()
            .all(|(i, b)| b.to_ascii_uppercase() == self.0[i])
    }
}

impl TryFrom<&str> for Word {
    type Error = InvalidWord;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            f.write_char(b as char)?;
        }

        Ok(())
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}
