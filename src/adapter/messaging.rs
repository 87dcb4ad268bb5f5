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

use std::sync::{mpsc, Arc};
use std::thread;

use serde::{Deserialize, Serialize};

use super::{decode_history, encode_suggestions, GuessEntryDto, SuggestionDto};
use crate::engine::{
    Engine, EngineConfig, EngineError, Policy, RequestId, Session, SessionEvent, StreamStatus,
};
use crate::wordle::prelude::*;

///
/// The message protocol for embedding the solver behind a channel pair: a
/// host thread posts requests, the service computes on its own threads and
/// posts replies. Request ids are chosen by the host and echoed back, so the
/// host can discard replies for requests it has abandoned.
///
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum SolverReq {
    #[serde(rename = "INIT")]
    Init {
        answers: Vec<String>,
        guesses: Vec<String>,
    },
    #[serde(rename = "SOLVE")]
    Solve {
        #[serde(rename = "requestId")]
        request_id: String,
        history: Vec<GuessEntryDto>,
        #[serde(rename = "strictGuesses", default)]
        strict_guesses: bool,
        #[serde(rename = "typedPrefix", default)]
        typed_prefix: String,
        #[serde(rename = "topK", default)]
        top_k: Option<usize>,
    },
    #[serde(rename = "CANCEL")]
    Cancel {
        #[serde(rename = "requestId")]
        request_id: String,
    },
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum SolverResp {
    #[serde(rename = "INIT_COMPLETE")]
    InitComplete,
    #[serde(rename = "SOLVE_COMPLETE")]
    SolveComplete {
        #[serde(rename = "requestId")]
        request_id: String,
        suggestions: Vec<SuggestionDto>,
        #[serde(rename = "remainingAnswers")]
        remaining_answers: usize,
    },
    #[serde(rename = "ERROR")]
    Error {
        #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        error: String,
    },
}

///
/// Runs the protocol on a dedicated thread. A SOLVE preempts whatever request
/// was in flight (the session fires its cancellation token); a CANCEL stops
/// the current request without starting a new one. Cancelled requests post no
/// reply at all -- the host asked for them to go away.
///
pub struct SolverService {
    session: Option<Session>,
    config: EngineConfig,
    out: mpsc::Sender<SolverResp>,
}

impl SolverService {
    pub fn spawn(config: EngineConfig) -> (mpsc::Sender<SolverReq>, mpsc::Receiver<SolverResp>) {
        let (in_tx, in_rx) = mpsc::channel();
        let (out_tx, out_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut service = SolverService {
                session: None,
                config,
                out: out_tx,
            };
            for req in in_rx {
                service.handle(req);
            }
            log::debug!("solver service shutting down");
        });

        (in_tx, out_rx)
    }

    fn handle(&mut self, req: SolverReq) {
        log::debug!("solver msg {:?}", req);
        match req {
            SolverReq::Init { answers, guesses } => self.handle_init(answers, guesses),
            SolverReq::Solve {
                request_id,
                history,
                strict_guesses,
                typed_prefix,
                top_k,
            } => self.handle_solve(request_id, history, strict_guesses, typed_prefix, top_k),
            SolverReq::Cancel { request_id } => self.handle_cancel(request_id),
        }
    }

    fn handle_init(&mut self, answers: Vec<String>, guesses: Vec<String>) {
        match Engine::from_raw_lists(&answers, &guesses, self.config.clone()) {
            Ok(engine) => {
                self.session = Some(Session::new(Arc::new(engine)));
                self.respond(SolverResp::InitComplete);
            }
            Err(err) => self.respond(SolverResp::Error {
                request_id: None,
                error: err.to_string(),
            }),
        }
    }

    fn handle_solve(
        &mut self,
        request_id: String,
        history: Vec<GuessEntryDto>,
        strict_guesses: bool,
        typed_prefix: String,
        top_k: Option<usize>,
    ) {
        let session = match &self.session {
            Some(session) => session,
            None => {
                self.respond(SolverResp::Error {
                    request_id: Some(request_id),
                    error: EngineError::NotInitialized.to_string(),
                });
                return;
            }
        };

        let history = match decode_history(&history) {
            Ok(history) => history,
            Err(err) => {
                self.respond(SolverResp::Error {
                    request_id: Some(request_id),
                    error: err.to_string(),
                });
                return;
            }
        };

        let policy = Policy {
            strict_guesses,
            typed_prefix,
            top_k: top_k.unwrap_or(DEFAULT_TOP_K),
        };

        let (rid, events) = session.submit_with_id(RequestId::from(request_id), history, policy);

        // relay the request's outcome without blocking the protocol loop, so
        // a CANCEL can still land while this request computes
        let out = self.out.clone();
        thread::spawn(move || {
            let mut last_snapshot: Option<(Vec<SuggestionDto>, usize)> = None;
            for event in events.iter() {
                match event {
                    SessionEvent::Suggestions {
                        ranked,
                        remaining_answers,
                        ..
                    } => {
                        last_snapshot = Some((encode_suggestions(&ranked), remaining_answers));
                    }
                    SessionEvent::Completed {
                        status: StreamStatus::Completed,
                        ..
                    } => {
                        let (suggestions, remaining_answers) =
                            last_snapshot.take().unwrap_or_default();
                        let _ = out.send(SolverResp::SolveComplete {
                            request_id: rid.to_string(),
                            suggestions,
                            remaining_answers,
                        });
                    }
                    SessionEvent::Completed {
                        status: StreamStatus::Cancelled,
                        ..
                    } => {}
                    SessionEvent::Failed { error, .. } => {
                        let _ = out.send(SolverResp::Error {
                            request_id: Some(rid.to_string()),
                            error: error.to_string(),
                        });
                    }
                }
            }
        });
    }

    fn handle_cancel(&mut self, request_id: String) {
        if let Some(session) = &self.session {
            session.cancel(&RequestId::from(request_id));
        }
    }

    fn respond(&self, resp: SolverResp) {
        let _ = self.out.send(resp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_json(word: &str, colors: &str) -> String {
        let colors: Vec<String> = colors
            .split(',')
            .map(|c| format!("\"{}\"", c.trim()))
            .collect();
        format!(
            r#"{{"word":"{}","feedback":{{"colors":[{}]}}}}"#,
            word,
            colors.join(",")
        )
    }

    #[test]
    fn test_request_wire_shape() {
        let json = format!(
            r#"{{"type":"SOLVE","requestId":"req-1","history":[{}],"strictGuesses":true,"typedPrefix":"st"}}"#,
            history_json("slate", "green,gray,yellow,gray,gray"),
        );
        let req: SolverReq = serde_json::from_str(&json).unwrap();
        match req {
            SolverReq::Solve {
                request_id,
                history,
                strict_guesses,
                typed_prefix,
                top_k,
            } => {
                assert_eq!(request_id, "req-1");
                assert_eq!(history.len(), 1);
                assert!(strict_guesses);
                assert_eq!(typed_prefix, "st");
                assert_eq!(top_k, None);
            }
            other => panic!("parsed into {:?}", other),
        }
    }

    #[test]
    fn test_response_wire_shape() {
        let resp = SolverResp::SolveComplete {
            request_id: "req-1".to_string(),
            suggestions: vec![SuggestionDto {
                word: "CRANE".to_string(),
                score: 1.5,
            }],
            remaining_answers: 7,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""type":"SOLVE_COMPLETE""#));
        assert!(json.contains(r#""requestId":"req-1""#));
        assert!(json.contains(r#""remainingAnswers":7"#));

        let error = SolverResp::Error {
            request_id: None,
            error: "boom".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(!json.contains("requestId"));
    }

    #[test]
    fn test_solve_before_init_is_an_error() {
        let (tx, rx) = SolverService::spawn(EngineConfig::default());
        tx.send(SolverReq::Solve {
            request_id: "early".to_string(),
            history: Vec::new(),
            strict_guesses: false,
            typed_prefix: String::new(),
            top_k: None,
        })
        .unwrap();

        match rx.recv().unwrap() {
            SolverResp::Error { request_id, error } => {
                assert_eq!(request_id.as_deref(), Some("early"));
                assert!(error.contains("not initialized"));
            }
            other => panic!("expected an error, got {:?}", other),
        }
    }

    #[test]
    fn test_init_then_solve_round_trip() {
        let (tx, rx) = SolverService::spawn(EngineConfig::default());
        let lists = vec!["CRANE", "SLATE", "GRIME", "STORM"];
        tx.send(SolverReq::Init {
            answers: lists.iter().map(|s| s.to_string()).collect(),
            guesses: lists.iter().map(|s| s.to_string()).collect(),
        })
        .unwrap();
        assert!(matches!(rx.recv().unwrap(), SolverResp::InitComplete));

        tx.send(SolverReq::Solve {
            request_id: "round-1".to_string(),
            history: Vec::new(),
            strict_guesses: false,
            typed_prefix: String::new(),
            top_k: Some(2),
        })
        .unwrap();

        match rx.recv().unwrap() {
            SolverResp::SolveComplete {
                request_id,
                suggestions,
                remaining_answers,
            } => {
                assert_eq!(request_id, "round-1");
                assert_eq!(remaining_answers, 4);
                assert_eq!(suggestions.len(), 2);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_init_rejects_invalid_words() {
        let (tx, rx) = SolverService::spawn(EngineConfig::default());
        tx.send(SolverReq::Init {
            answers: vec!["CRANE".to_string(), "TOOLONG".to_string()],
            guesses: vec!["CRANE".to_string()],
        })
        .unwrap();

        match rx.recv().unwrap() {
            SolverResp::Error { request_id, error } => {
                assert_eq!(request_id, None);
                assert!(error.contains("TOOLONG"));
            }
            other => panic!("expected an error, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_without_session_is_quiet() {
        let (tx, _rx) = SolverService::spawn(EngineConfig::default());
        tx.send(SolverReq::Cancel {
            request_id: "whatever".to_string(),
        })
        .unwrap();
        // nothing to assert beyond "no reply and no panic"; give the loop a
        // chance to process before the channels drop
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
}
