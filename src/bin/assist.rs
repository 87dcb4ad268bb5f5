use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use wordle_suggest::engine::{Engine, EngineConfig, Policy, Session, SessionEvent, StreamStatus};
use wordle_suggest::wordle::prelude::*;
use wordle_suggest::wordle::{Colorings, GuessEntry, Word, WordLists};

/// Interactive terminal assistant: feed it each round you play and it ranks
/// your next guesses.
#[derive(Parser, Debug)]
#[command(name = "wordle-suggest", version, about)]
struct Args {
    /// Answer word list, one word per line (embedded list when omitted)
    #[arg(long, requires = "guesses")]
    answers: Option<PathBuf>,

    /// Guess word list, one word per line (embedded list when omitted)
    #[arg(long, requires = "answers")]
    guesses: Option<PathBuf>,

    /// How many suggestions to show after each round
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Only suggest words that could still be the answer
    #[arg(long)]
    strict: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let lists = match load_lists(&args) {
        Ok(lists) => lists,
        Err(err) => {
            eprintln!("failed to load word lists: {}", err);
            process::exit(1);
        }
    };

    let engine = match Engine::from_lists(lists, EngineConfig::default()) {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            eprintln!("failed to build engine: {}", err);
            process::exit(1);
        }
    };
    let session = Session::new(engine);

    println!("Enter each round as: GUESS COLORS  (colors: G=green Y=yellow B=gray)");
    println!("Example: SLATE BYGBB -- blank line or 'q' quits.");

    let mut history: Vec<GuessEntry> = Vec::new();
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("failed to read input: {}", err);
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("q") {
            break;
        }

        let entry = match parse_round(line) {
            Ok(entry) => entry,
            Err(msg) => {
                eprintln!("{}", msg);
                continue;
            }
        };

        if entry.coloring.is_win() {
            println!("Solved in {} guesses. Nice!", history.len() + 1);
            break;
        }

        history.push(entry);
        if history.len() > NUM_TURNS {
            println!("(note: the official game would be over by now)");
        }

        let policy = Policy {
            strict_guesses: args.strict,
            typed_prefix: String::new(),
            top_k: args.top_k.max(1),
        };
        let (_, events) = session.submit(history.clone(), policy);
        print_outcome(events);
    }
}

/// Waits for the request to finish and prints its final ranking.
fn print_outcome(events: std::sync::mpsc::Receiver<SessionEvent>) {
    let mut last = None;
    for event in events.iter() {
        match event {
            SessionEvent::Suggestions {
                ranked,
                remaining_answers,
                ..
            } => last = Some((ranked, remaining_answers)),
            SessionEvent::Completed {
                status: StreamStatus::Completed,
                ..
            } => {
                let (ranked, remaining) = match last.take() {
                    Some(snapshot) => snapshot,
                    None => break,
                };
                println!("{} possible answer(s) remain", remaining);
                if ranked.is_empty() {
                    println!("  no candidate guesses match -- check the colors you entered?");
                }
                for (i, scored) in ranked.iter().enumerate() {
                    if scored.score.is_infinite() {
                        println!("  {}. {} (guaranteed solve)", i + 1, scored.word);
                    } else {
                        println!("  {}. {} ({:.3} bits)", i + 1, scored.word, scored.score);
                    }
                }
            }
            SessionEvent::Completed { .. } => {}
            SessionEvent::Failed { error, .. } => eprintln!("request failed: {}", error),
        }
    }
}

fn parse_round(line: &str) -> Result<GuessEntry, String> {
    let mut parts = line.split_whitespace();
    let (word, colors) = match (parts.next(), parts.next(), parts.next()) {
        (Some(word), Some(colors), None) => (word, colors),
        _ => return Err("expected exactly: GUESS COLORS (e.g. SLATE BYGBB)".to_string()),
    };

    let word = Word::new(word).map_err(|err| err.to_string())?;
    let coloring = Colorings::from_letters(colors)
        .ok_or_else(|| format!("'{}' is not five of G/Y/B", colors))?;

    Ok(GuessEntry::new(word, coloring))
}

fn load_lists(args: &Args) -> Result<WordLists, wordle_suggest::wordle::LoadDataErr> {
    match (&args.answers, &args.guesses) {
        (Some(answers), Some(guesses)) => WordLists::from_files(answers, guesses),
        _ => WordLists::embedded(),
    }
}
