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

use std::fmt::{self, Display, Formatter};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread;

use uuid::Uuid;

use super::dispatch::{self, CancelToken};
use super::{Engine, EngineError, Policy, ScoredGuess};
use crate::wordle::GuessEntry;

///
/// Opaque token tagging one submitted suggestion request. Every event a
/// session emits carries the id of the request it belongs to, so a consumer
/// that has moved on can discard stragglers by comparing ids.
///
/// Ids minted by the session are UUIDv4; transports that assign their own ids
/// (the message protocol lets the client pick) wrap them unchanged.
///
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct RequestId(String);

impl RequestId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RequestId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for RequestId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a request's stream ended, reported by the terminal sentinel event.
/// Preempted and explicitly cancelled requests are indistinguishable to
/// observers.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StreamStatus {
    Completed,
    Cancelled,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Completed => "completed",
            StreamStatus::Cancelled => "cancelled",
        }
    }
}

///
/// Everything a session can tell its consumer about one request:
///
///   * Suggestions -- a ranking snapshot; `depth` counts merged shards, and
///     the snapshot with depth == max_depth is the complete result
///   * Completed -- the terminal sentinel, sent exactly once per request
///   * Failed -- terminal too, for timeouts and worker failures
///
#[derive(Debug)]
pub enum SessionEvent {
    Suggestions {
        request_id: RequestId,
        ranked: Vec<ScoredGuess>,
        remaining_answers: usize,
        depth: usize,
        max_depth: usize,
    },
    Completed {
        request_id: RequestId,
        status: StreamStatus,
    },
    Failed {
        request_id: RequestId,
        error: EngineError,
    },
}

impl SessionEvent {
    pub fn request_id(&self) -> &RequestId {
        match self {
            SessionEvent::Suggestions { request_id, .. } => request_id,
            SessionEvent::Completed { request_id, .. } => request_id,
            SessionEvent::Failed { request_id, .. } => request_id,
        }
    }

    /// Whether this event ends its request's stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionEvent::Suggestions { .. })
    }
}

struct ActiveRequest {
    id: RequestId,
    cancel: CancelToken,
}

///
/// Owns the lifecycle of suggestion requests for one consumer: at most one
/// request is in flight, and submitting a new one preempts the old by firing
/// its cancellation token. Each submission gets its own event channel, which
/// carries some number of Suggestions events followed by exactly one terminal
/// event.
///
/// The computation itself runs on a short-lived thread per request; the heavy
/// scoring work inside it is fanned out over the engine's shared worker pool.
///
pub struct Session {
    engine: Arc<Engine>,
    current: Arc<Mutex<Option<ActiveRequest>>>,
}

impl Session {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Submits a request under a freshly minted id.
    pub fn submit(
        &self,
        history: Vec<GuessEntry>,
        policy: Policy,
    ) -> (RequestId, mpsc::Receiver<SessionEvent>) {
        self.submit_with_id(RequestId::fresh(), history, policy)
    }

    ///
    /// Submits a request under a caller-chosen id, preempting whatever request
    /// was running. The returned receiver yields this request's events only;
    /// the preempted request's channel gets its own cancelled sentinel.
    ///
    pub fn submit_with_id(
        &self,
        id: RequestId,
        history: Vec<GuessEntry>,
        policy: Policy,
    ) -> (RequestId, mpsc::Receiver<SessionEvent>) {
        let cancel = CancelToken::new();

        {
            let mut current = lock(&self.current);
            if let Some(prev) = current.replace(ActiveRequest {
                id: id.clone(),
                cancel: cancel.clone(),
            }) {
                log::debug!("request {} preempts {}", id, prev.id);
                prev.cancel.fire();
            }
        }

        let (tx, rx) = mpsc::channel();
        let engine = Arc::clone(&self.engine);
        let current = Arc::clone(&self.current);
        let rid = id.clone();

        thread::spawn(move || {
            let mut snapshots_sent = 0usize;
            let result = dispatch::run(&engine, &history, &policy, &cancel, |update| {
                snapshots_sent += 1;
                let _ = tx.send(SessionEvent::Suggestions {
                    request_id: rid.clone(),
                    ranked: update.ranked.to_vec(),
                    remaining_answers: update.remaining_answers,
                    depth: update.depth,
                    max_depth: update.max_depth,
                });
            });

            // a request that lost the race to a newer submission must not
            // report success, even if its computation happened to finish
            let superseded = {
                let current = lock(&current);
                current.as_ref().map(|active| active.id != rid).unwrap_or(true)
            };

            let terminal = match result {
                Ok(result) if !superseded => {
                    if snapshots_sent == 0 {
                        // degenerate requests skip the dispatcher entirely and
                        // still owe the consumer one suggestions event
                        let _ = tx.send(SessionEvent::Suggestions {
                            request_id: rid.clone(),
                            ranked: result.ranked,
                            remaining_answers: result.remaining_answers,
                            depth: 1,
                            max_depth: 1,
                        });
                    }
                    SessionEvent::Completed {
                        request_id: rid.clone(),
                        status: StreamStatus::Completed,
                    }
                }
                Ok(_) | Err(EngineError::Cancelled) => SessionEvent::Completed {
                    request_id: rid.clone(),
                    status: StreamStatus::Cancelled,
                },
                Err(error) => SessionEvent::Failed {
                    request_id: rid.clone(),
                    error,
                },
            };
            let _ = tx.send(terminal);

            // return the session to idle unless someone else took over
            let mut current = lock(&current);
            if current.as_ref().map(|active| active.id == rid).unwrap_or(false) {
                *current = None;
            }
        });

        (id, rx)
    }

    ///
    /// Fires cancellation for the given request. Idempotent, and a no-op for
    /// ids that are not the one currently in flight (they are already
    /// terminal).
    ///
    pub fn cancel(&self, id: &RequestId) {
        let current = lock(&self.current);
        if let Some(active) = current.as_ref() {
            if &active.id == id {
                active.cancel.fire();
            }
        }
    }
}

/// Locks a mutex, tolerating poisoning: the state a session guards (the
/// current request id and token) stays meaningful even if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::wordle::Word;
    use std::time::Duration;

    fn words(texts: &[&str]) -> Vec<Word> {
        texts.iter().map(|t| Word::new(t).unwrap()).collect()
    }

    fn small_engine() -> Arc<Engine> {
        Arc::new(
            Engine::new(
                words(&["CRANE", "SLATE", "GRIME", "STORM"]),
                words(&["CRANE", "SLATE", "GRIME", "STORM", "POINT"]),
                EngineConfig::default(),
            )
            .unwrap(),
        )
    }

    fn drain(rx: mpsc::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        rx.iter().collect()
    }

    #[test]
    fn test_submit_yields_suggestions_then_sentinel() {
        let session = Session::new(small_engine());
        let (rid, rx) = session.submit(Vec::new(), Policy::default());
        let events = drain(rx);

        assert!(events.len() >= 2);
        for event in &events {
            assert_eq!(event.request_id(), &rid);
        }
        for event in &events[..events.len() - 1] {
            assert!(matches!(event, SessionEvent::Suggestions { .. }));
        }
        assert!(matches!(
            events.last().unwrap(),
            SessionEvent::Completed { status: StreamStatus::Completed, .. }
        ));

        // the last snapshot is the complete ranking
        if let SessionEvent::Suggestions { depth, max_depth, ranked, remaining_answers, .. } =
            &events[events.len() - 2]
        {
            assert_eq!(depth, max_depth);
            assert_eq!(*remaining_answers, 4);
            assert!(!ranked.is_empty());
        } else {
            panic!("expected a suggestions event before the sentinel");
        }
    }

    #[test]
    fn test_each_request_has_a_unique_fresh_id() {
        let session = Session::new(small_engine());
        let (r1, rx1) = session.submit(Vec::new(), Policy::default());
        let (r2, rx2) = session.submit(Vec::new(), Policy::default());
        assert_ne!(r1, r2);
        drain(rx1);
        drain(rx2);
    }

    #[test]
    fn test_preemption_terminates_the_older_request() {
        let session = Session::new(small_engine());
        let (r1, rx1) = session.submit(Vec::new(), Policy::default());
        let (r2, rx2) = session.submit(
            Vec::new(),
            Policy {
                typed_prefix: "ST".to_string(),
                ..Policy::default()
            },
        );

        // the newer request completes normally and only carries its own id
        let events2 = drain(rx2);
        for event in &events2 {
            assert_eq!(event.request_id(), &r2);
        }
        assert!(matches!(
            events2.last().unwrap(),
            SessionEvent::Completed { status: StreamStatus::Completed, .. }
        ));

        // the older request ends with exactly one terminal event; whether it
        // managed to complete before being preempted is a race, but nothing
        // follows the terminal event and every event carries r1
        let events1 = drain(rx1);
        assert!(!events1.is_empty());
        for event in &events1 {
            assert_eq!(event.request_id(), &r1);
        }
        let terminals = events1.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(terminals, 1);
        assert!(events1.last().unwrap().is_terminal());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let session = Session::new(small_engine());
        let (rid, rx) = session.submit(Vec::new(), Policy::default());
        session.cancel(&rid);
        session.cancel(&rid);

        let events = drain(rx);
        let terminals = events.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(terminals, 1);

        // cancelling an id that is no longer in flight is a quiet no-op
        session.cancel(&rid);
        session.cancel(&RequestId::from("no-such-request"));
    }

    #[test]
    fn test_timeout_surfaces_as_failure() {
        let engine = Arc::new(
            Engine::new(
                words(&["CRANE", "SLATE"]),
                words(&["CRANE", "SLATE"]),
                EngineConfig {
                    timeout: Duration::ZERO,
                    ..EngineConfig::default()
                },
            )
            .unwrap(),
        );
        let session = Session::new(engine);
        let (rid, rx) = session.submit(Vec::new(), Policy::default());
        let events = drain(rx);

        assert_eq!(events.len(), 1);
        match &events[0] {
            SessionEvent::Failed { request_id, error } => {
                assert_eq!(request_id, &rid);
                assert!(matches!(error, EngineError::Timeout(_)));
            }
            other => panic!("expected a timeout failure, got {:?}", other),
        }
    }

    #[test]
    fn test_forced_win_stream_shape() {
        let engine = Arc::new(
            Engine::new(
                words(&["CRANE"]),
                words(&["CRANE", "SLATE"]),
                EngineConfig::default(),
            )
            .unwrap(),
        );
        let session = Session::new(engine);
        let (_, rx) = session.submit(Vec::new(), Policy::default());
        let events = drain(rx);

        assert_eq!(events.len(), 2);
        match &events[0] {
            SessionEvent::Suggestions { ranked, remaining_answers, .. } => {
                assert_eq!(*remaining_answers, 1);
                assert_eq!(ranked.len(), 1);
                assert!(ranked[0].score.is_infinite());
            }
            other => panic!("expected suggestions, got {:?}", other),
        }
        assert!(matches!(
            events[1],
            SessionEvent::Completed { status: StreamStatus::Completed, .. }
        ));
    }
}
