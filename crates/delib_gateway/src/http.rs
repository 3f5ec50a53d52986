//! HTTP implementation of `ModelGateway` for the NDJSON streaming protocol
//! spec §6 describes: POST a JSON body `{model, prompt, system?, stream:
//! true, options:{temperature, top_p, top_k}}`; the response is a stream of
//! newline-delimited JSON objects each carrying a `response` chunk,
//! terminated by `{"done": true}` (this is the Ollama generate-endpoint
//! wire shape, the most common instance of "a streaming transport
//! conforming to concatenation-of-chunks-yields-the-completion").

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::cancel::CancelToken;
use crate::gateway::{ChunkStream, CompletionRequest, GatewayError, ModelGateway};

#[derive(Serialize)]
struct RequestOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: RequestOptions,
}

/// Thin wrapper over `reqwest::Client`.
pub struct HttpModelGateway {
    client: reqwest::Client,
}

impl HttpModelGateway {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpModelGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    async fn complete(&self, request: CompletionRequest, cancel: &CancelToken) -> Result<ChunkStream, GatewayError> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let body = RequestBody {
            model: &request.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: true,
            options: RequestOptions {
                temperature: request.sampling.temperature,
                top_p: request.sampling.top_p,
                top_k: request.sampling.top_k,
            },
        };

        let response = self
            .client
            .post(&request.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Transport(format!(
                "gateway returned status {}",
                response.status()
            )));
        }

        let (mut tx, rx) = mpsc::unbounded();
        let mut byte_stream = response.bytes_stream();
        let cancel = cancel.clone();

        tokio::spawn(async move {
            let mut buffer = String::new();
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        break;
                    }
                    next = byte_stream.next() => {
                        let Some(chunk) = next else { break };
                        let bytes = match chunk {
                            Ok(b) => b,
                            Err(e) => {
                                let _ = tx.send(Err(GatewayError::Transport(e.to_string()))).await;
                                break;
                            }
                        };
                        buffer.push_str(&String::from_utf8_lossy(&bytes));

                        while let Some(newline_pos) = buffer.find('\n') {
                            let line = buffer[..newline_pos].trim().to_string();
                            buffer.drain(..=newline_pos);
                            if line.is_empty() {
                                continue;
                            }
                            match parse_ndjson_line(&line) {
                                Ok(LineOutcome::Chunk(text)) => {
                                    if tx.send(Ok(text)).await.is_err() {
                                        return;
                                    }
                                }
                                Ok(LineOutcome::Done) => return,
                                Err(e) => {
                                    let _ = tx.send(Err(GatewayError::Transport(e))).await;
                                    return;
                                }
                            }
                        }
                    }
                }
            }
        });

        Ok(Box::pin(rx))
    }
}

enum LineOutcome {
    Chunk(String),
    Done,
}

fn parse_ndjson_line(line: &str) -> Result<LineOutcome, String> {
    let value: Value = serde_json::from_str(line).map_err(|e| format!("malformed NDJSON line: {e}"))?;
    if value.get("done").and_then(Value::as_bool) == Some(true) {
        return Ok(LineOutcome::Done);
    }
    let text = value
        .get("response")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    Ok(LineOutcome::Chunk(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_response_chunk() {
        let outcome = parse_ndjson_line(r#"{"response":"hello","done":false}"#).unwrap();
        assert!(matches!(outcome, LineOutcome::Chunk(ref s) if s == "hello"));
    }

    #[test]
    fn recognizes_done_marker() {
        let outcome = parse_ndjson_line(r#"{"done":true}"#).unwrap();
        assert!(matches!(outcome, LineOutcome::Done));
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(parse_ndjson_line("not json").is_err());
    }
}
