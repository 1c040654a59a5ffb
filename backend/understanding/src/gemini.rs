//! Google Gemini `generateContent` client.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use dropcheck_core::{ContentPart, VisionModel, VisionRequest, VisionResponse};

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key. Keeps the key out of URLs and so out of logs.
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn to_wire(request: &VisionRequest) -> GenerateContentRequest<'_> {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Image(image) => Part::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            },
            ContentPart::Text(text) => Part::Text { text },
        })
        .collect();

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: GenerationConfig {
            response_mime_type: &request.response_mime_type,
            response_schema: &request.response_schema,
        },
    }
}

#[async_trait]
impl VisionModel for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse> {
        let start = Instant::now();
        let body = to_wire(request);

        info!(
            model = %request.model,
            images = request.image_count(),
            "Sending request to Gemini"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Gemini HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("Gemini returned {}: {}", status, error_body);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let Some(content) = parsed.candidates.into_iter().next().and_then(|c| c.content) else {
            bail!("Gemini returned no candidates");
        };
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(latency_ms, chars = text.len(), "Gemini responded");

        Ok(VisionResponse {
            text,
            provider: "gemini".to_string(),
            model: request.model.clone(),
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use dropcheck_core::InlineImage;
    use serde_json::json;

    #[derive(Clone, Default)]
    struct Captured {
        call: Arc<Mutex<Option<(String, Option<String>, Value)>>>,
    }

    async fn fake_generate(
        State(captured): State<Captured>,
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *captured.call.lock().unwrap() = Some((call, key, body));
        (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] }
                }]
            })),
        )
    }

    async fn spawn_fake(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> VisionRequest {
        VisionRequest {
            model: "gemini-2.5-flash".into(),
            parts: vec![
                ContentPart::Image(InlineImage {
                    mime_type: "image/jpeg".into(),
                    data: "aGVsbG8=".into(),
                }),
                ContentPart::Text("check it".into()),
            ],
            response_mime_type: "application/json".into(),
            response_schema: json!({ "type": "OBJECT" }),
        }
    }

    #[tokio::test]
    async fn sends_wire_format_and_joins_text_parts() {
        let captured = Captured::default();
        let router = Router::new()
            .route("/models/:call", post(fake_generate))
            .with_state(captured.clone());
        let base = spawn_fake(router).await;

        let provider = GeminiProvider::new("test-key").with_base_url(format!("{base}/"));
        let response = provider.generate(&request()).await.unwrap();
        assert_eq!(response.text, "{\"a\":1}");
        assert_eq!(response.provider, "gemini");

        let (call, key, body) = captured.call.lock().unwrap().take().unwrap();
        assert_eq!(call, "gemini-2.5-flash:generateContent");
        assert_eq!(key.as_deref(), Some("test-key"));
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "aGVsbG8=");
        assert_eq!(parts[1]["text"], "check it");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let router = Router::new().route(
            "/models/:call",
            post(|| async { (StatusCode::FORBIDDEN, "API key not valid") }),
        );
        let base = spawn_fake(router).await;

        let provider = GeminiProvider::new("bad").with_base_url(base);
        let err = provider.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn empty_candidates_is_an_error() {
        let router = Router::new().route(
            "/models/:call",
            post(|| async { Json(json!({ "candidates": [] })) }),
        );
        let base = spawn_fake(router).await;

        let provider = GeminiProvider::new("k").with_base_url(base);
        assert!(provider.generate(&request()).await.is_err());
    }
}
