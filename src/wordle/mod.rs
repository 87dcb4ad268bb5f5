pub mod color;
pub mod data;
pub mod filter;
pub mod prelude;
pub mod word;

pub use color::{Coloring, Colorings, ColoringCode};
pub use data::{LoadDataErr, WordLists};
pub use filter::{candidate_guesses, matches_history, surviving_answers, GuessEntry};
pub use prelude::*;
pub use word::{InvalidWord, Word};
