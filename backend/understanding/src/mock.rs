use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use dropcheck_core::{VisionModel, VisionRequest, VisionResponse};

enum Canned {
    Text(String),
    Error(String),
}

/// A vision model double that returns canned responses and records every
/// request it receives.
///
/// Responses are consumed in order; the last one repeats once the queue is
/// down to a single entry.
pub struct MockVisionModel {
    responses: Mutex<VecDeque<Canned>>,
    requests: Mutex<Vec<VisionRequest>>,
    gate: Option<Arc<Notify>>,
}

impl MockVisionModel {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Canned::Text(text.into()));
        self
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Canned::Error(message.into()));
        self
    }

    /// Hold every call until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn push(&self, canned: Canned) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(canned);
    }

    pub fn requests(&self) -> Vec<VisionRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next_response(&self) -> Result<String> {
        let mut queue = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        let canned = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().map(|c| match c {
                Canned::Text(t) => Canned::Text(t.clone()),
                Canned::Error(e) => Canned::Error(e.clone()),
            })
        };
        match canned {
            Some(Canned::Text(text)) => Ok(text),
            Some(Canned::Error(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("mock vision model has no canned response")),
        }
    }
}

impl Default for MockVisionModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionModel for MockVisionModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let text = self.next_response()?;
        Ok(VisionResponse {
            text,
            provider: "mock".to_string(),
            model: request.model.clone(),
            latency_ms: 0,
        })
    }
}
