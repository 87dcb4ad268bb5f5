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

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::{Deserialize, Serialize};

use crate::adapter::{decode_history, encode_suggestions, GuessEntryDto, SuggestionDto};
use crate::engine::{Engine, Policy, RequestId, Session, SessionEvent};
use crate::wordle::prelude::*;

pub const STREAM_PATH: &str = "/api/v1/suggest/stream";
pub const CLOSE_PATH: &str = "/api/v1/suggest/close";

struct AppState {
    engine: Arc<Engine>,
    // one session per open stream, keyed by the streamId handed to the client
    streams: Mutex<HashMap<String, Session>>,
}

#[derive(Deserialize, Debug)]
struct StreamRequest {
    #[serde(default)]
    history: Vec<GuessEntryDto>,
    #[serde(rename = "maxDepth", default)]
    max_depth: Option<usize>,
    #[serde(rename = "strictGuesses", default)]
    strict_guesses: bool,
    #[serde(rename = "typedPrefix", default)]
    typed_prefix: String,
    #[serde(rename = "topK", default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct StreamCreatedFrame<'a> {
    #[serde(rename = "streamId")]
    stream_id: &'a str,
}

#[derive(Serialize)]
struct SuggestionsFrame<'a> {
    #[serde(rename = "streamId")]
    stream_id: &'a str,
    suggestions: Vec<SuggestionDto>,
    #[serde(rename = "topSuggestion")]
    top_suggestion: Option<SuggestionDto>,
    depth: usize,
    #[serde(rename = "remainingAnswers")]
    remaining_answers: usize,
}

#[derive(Serialize)]
struct StreamCompletedFrame<'a> {
    #[serde(rename = "streamId")]
    stream_id: &'a str,
    status: &'a str,
}

#[derive(Serialize)]
struct ErrorFrame<'a> {
    #[serde(rename = "streamId")]
    stream_id: &'a str,
    error: String,
}

#[derive(Deserialize)]
struct CloseRequest {
    #[serde(rename = "streamId")]
    stream_id: String,
}

///
/// Binds the SSE endpoint and serves until ctrl-c. Bind failures surface as
/// the returned error so the binary can exit non-zero.
///
pub async fn run(engine: Arc<Engine>, addr: SocketAddr) -> Result<(), hyper::Error> {
    let state = Arc::new(AppState {
        engine,
        streams: Mutex::new(HashMap::new()),
    });

    let make_svc = make_service_fn(move |_conn| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| route(Arc::clone(&state), req)))
        }
    });

    let server = Server::try_bind(&addr)?.serve(make_svc);
    log::info!("listening on http://{}", addr);

    server.with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        log::info!("shutdown signal received");
    }
}

async fn route(state: Arc<AppState>, req: Request<Body>) -> Result<Response<Body>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::POST, STREAM_PATH) => open_stream(state, req).await,
        (&Method::POST, CLOSE_PATH) => close_stream(state, req).await,
        _ => json_response(StatusCode::NOT_FOUND, &serde_json::json!({"error": "not found"})),
    };

    Ok(response)
}

async fn open_stream(state: Arc<AppState>, req: Request<Body>) -> Response<Body> {
    let bytes = match hyper::body::to_bytes(req.into_body()).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({"error": err.to_string()}),
            )
        }
    };

    let request: StreamRequest = match serde_json::from_slice(&bytes) {
        Ok(request) => request,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({"error": err.to_string()}),
            )
        }
    };

    let history = match decode_history(&request.history) {
        Ok(history) => history,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({"error": err.to_string()}),
            )
        }
    };

    let policy = Policy {
        strict_guesses: request.strict_guesses,
        typed_prefix: request.typed_prefix,
        top_k: request.top_k.unwrap_or(DEFAULT_TOP_K).max(1),
    };

    let session = Session::new(Arc::clone(&state.engine));
    let (rid, events) = session.submit(history, policy);
    let stream_id = rid.to_string();
    lock_streams(&state).insert(stream_id.clone(), session);
    log::debug!("stream {} opened", stream_id);

    // bridge the session's sync receiver onto the async side
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        for event in events.iter() {
            if event_tx.send(event).is_err() {
                break;
            }
        }
    });

    let (mut body_tx, body) = Body::channel();
    let max_depth_cap = request.max_depth;
    tokio::spawn(async move {
        let created = sse_frame(
            "stream-created",
            &StreamCreatedFrame { stream_id: &stream_id },
        );
        let mut connected = body_tx.send_data(created.into()).await.is_ok();

        while connected {
            let event = match event_rx.recv().await {
                Some(event) => event,
                None => break,
            };

            let frame = match &event {
                SessionEvent::Suggestions {
                    ranked,
                    remaining_answers,
                    depth,
                    max_depth,
                    ..
                } => {
                    if skip_snapshot(*depth, *max_depth, max_depth_cap) {
                        continue;
                    }
                    let suggestions = encode_suggestions(ranked);
                    sse_frame(
                        "suggestions",
                        &SuggestionsFrame {
                            stream_id: &stream_id,
                            top_suggestion: suggestions.first().cloned(),
                            suggestions,
                            depth: *depth,
                            remaining_answers: *remaining_answers,
                        },
                    )
                }
                SessionEvent::Completed { status, .. } => sse_frame(
                    "stream-completed",
                    &StreamCompletedFrame {
                        stream_id: &stream_id,
                        status: status.as_str(),
                    },
                ),
                SessionEvent::Failed { error, .. } => sse_frame(
                    "error",
                    &ErrorFrame {
                        stream_id: &stream_id,
                        error: error.to_string(),
                    },
                ),
            };

            connected = body_tx.send_data(frame.into()).await.is_ok();
            if event.is_terminal() {
                break;
            }
        }

        let removed = lock_streams(&state).remove(&stream_id);
        if !connected {
            // client went away mid-stream; stop paying for its answer
            log::debug!("stream {} client disconnected", stream_id);
            if let Some(session) = removed {
                session.cancel(&RequestId::from(stream_id.as_str()));
            }
        }
    });

    match Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/event-stream")
        .header("Cache-Control", "no-cache")
        .body(body)
    {
        Ok(response) => response,
        Err(err) => {
            log::error!("failed to build stream response: {}", err);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &serde_json::json!({"error": "internal error"}),
            )
        }
    }
}

async fn close_stream(state: Arc<AppState>, req: Request<Body>) -> Response<Body> {
    let bytes = match hyper::body::to_bytes(req.into_body()).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({"error": err.to_string()}),
            )
        }
    };

    let request: CloseRequest = match serde_json::from_slice(&bytes) {
        Ok(request) => request,
        Err(err) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({"error": err.to_string()}),
            )
        }
    };

    let session = lock_streams(&state).remove(&request.stream_id);
    match session {
        Some(session) => {
            session.cancel(&RequestId::from(request.stream_id.as_str()));
            log::debug!("stream {} closed by client", request.stream_id);
            json_response(StatusCode::OK, &serde_json::json!({"status": "closed"}))
        }
        None => json_response(
            StatusCode::NOT_FOUND,
            &serde_json::json!({"error": "unknown stream"}),
        ),
    }
}

/// Intermediate snapshots past the client's requested depth are suppressed;
/// the final snapshot always goes out.
fn skip_snapshot(depth: usize, max_depth: usize, cap: Option<usize>) -> bool {
    match cap {
        Some(cap) => depth < max_depth && depth > cap,
        None => false,
    }
}

fn sse_frame<T: Serialize>(event: &str, data: &T) -> String {
    // our frame types serialize infallibly; fall back to an empty object so a
    // framing bug cannot take the stream down
    let json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
    format!("event: {}\ndata: {}\n\n", event, json)
}

fn json_response<T: Serialize>(status: StatusCode, data: &T) -> Response<Body> {
    let json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
    match Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(json.into())
    {
        Ok(response) => response,
        Err(_) => {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn lock_streams(state: &AppState) -> MutexGuard<'_, HashMap<String, Session>> {
    state
        .streams
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::wordle::Word;

    fn words(texts: &[&str]) -> Vec<Word> {
        texts.iter().map(|t| Word::new(t).unwrap()).collect()
    }

    fn state() -> Arc<AppState> {
        let engine = Engine::new(
            words(&["CRANE", "SLATE", "GRIME", "STORM"]),
            words(&["CRANE", "SLATE", "GRIME", "STORM", "POINT"]),
            EngineConfig::default(),
        )
        .unwrap();
        Arc::new(AppState {
            engine: Arc::new(engine),
            streams: Mutex::new(HashMap::new()),
        })
    }

    fn post(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_sse_frame_format() {
        let frame = sse_frame("stream-created", &StreamCreatedFrame { stream_id: "abc" });
        assert_eq!(frame, "event: stream-created\ndata: {\"streamId\":\"abc\"}\n\n");
    }

    #[test]
    fn test_skip_snapshot() {
        // no cap: everything goes out
        assert!(!skip_snapshot(1, 4, None));
        // capped at 1: intermediate depth 2 and 3 are skipped
        assert!(skip_snapshot(2, 4, Some(1)));
        assert!(skip_snapshot(3, 4, Some(1)));
        // the final snapshot always goes out
        assert!(!skip_snapshot(4, 4, Some(1)));
        assert!(!skip_snapshot(1, 4, Some(1)));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = route(state(), post("/nope", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let response = route(state(), post(STREAM_PATH, "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_history_word_is_400() {
        let body = r#"{"history":[{"word":"toolong","feedback":{"colors":["gray","gray","gray","gray","gray"]}}]}"#;
        let response = route(state(), post(STREAM_PATH, body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_close_unknown_stream_is_404() {
        let response = route(state(), post(CLOSE_PATH, r#"{"streamId":"missing"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stream_end_to_end() {
        let state = state();
        let response = route(Arc::clone(&state), post(STREAM_PATH, r#"{"history":[]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/event-stream"
        );

        // the body ends when the stream completes, so collecting it sees the
        // whole conversation
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(text.contains("event: stream-created"), "got: {}", text);
        assert!(text.contains("event: suggestions"), "got: {}", text);
        assert!(text.contains("event: stream-completed"), "got: {}", text);
        assert!(text.contains("\"status\":\"completed\""), "got: {}", text);
        assert!(text.contains("\"remainingAnswers\":4"), "got: {}", text);

        // the registry is cleaned up once the stream finishes
        for _ in 0..50 {
            if lock_streams(&state).is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(lock_streams(&state).is_empty());
    }

    #[tokio::test]
    async fn test_close_open_stream() {
        let state = state();
        let response = route(Arc::clone(&state), post(STREAM_PATH, r#"{"history":[]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // the stream id arrives in the first frame; for the test, read it from
        // the registry instead of parsing the body
        let stream_id = {
            let streams = lock_streams(&state);
            streams.keys().next().cloned()
        };

        if let Some(stream_id) = stream_id {
            let body = format!(r#"{{"streamId":"{}"}}"#, stream_id);
            let response = route(Arc::clone(&state), post(CLOSE_PATH, &body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        // either way the request may already have completed and cleaned up
        // after itself, which is fine
    }
}
