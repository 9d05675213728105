use async_trait::async_trait;
use groundgen::services::google_ai::{
    GenerateContentRequest, HttpTransport, TransportError, TransportResponse,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

pub type Reply = Result<TransportResponse, TransportError>;

/// Replays a fixed list of replies, one per call, and records every call.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    repeat_last: bool,
    pending_forever: bool,
    calls: Mutex<Vec<(Instant, GenerateContentRequest)>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            repeat_last: false,
            pending_forever: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn statuses(statuses: &[u16], success_body: &str) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|&status| {
                    let body = if (200..300).contains(&status) {
                        success_body.to_string()
                    } else {
                        format!(r#"{{"error":{{"code":{status},"message":"status {status}"}}}}"#)
                    };
                    Ok(TransportResponse::new(status, body))
                })
                .collect(),
        )
    }

    /// Answers every call with the same reply.
    pub fn repeating(reply: Reply) -> Self {
        Self {
            repeat_last: true,
            ..Self::new(vec![reply])
        }
    }

    /// Never answers; only cancellation ends a call.
    pub fn hanging() -> Self {
        Self {
            pending_forever: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post_json(
        &self,
        _url: &str,
        _api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), body.clone()));

        if self.pending_forever {
            return std::future::pending().await;
        }

        let mut replies = self.replies.lock().unwrap();
        let reply = if self.repeat_last && replies.len() == 1 {
            replies.front().cloned()
        } else {
            replies.pop_front()
        };

        reply.unwrap_or_else(|| {
            Err(TransportError::Network {
                message: "script exhausted".to_string(),
            })
        })
    }
}

pub fn text_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
    .to_string()
}
