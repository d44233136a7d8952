use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

use super::{fallback_reply, Backend};
use crate::capture::CaptureFrame;
use crate::models::{ChatReply, EmotionResult, MoodSample, SessionContext, Turn};
use crate::settings::ClientSettings;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Turn],
    input: &'a str,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Serialize)]
struct MoodRequest<'a> {
    score: u8,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

/// HTTP gateway to the MindCare backend (`/api` base path).
pub struct HttpGateway {
    client: Client,
    base_url: String,
    context: Option<SessionContext>,
}

impl HttpGateway {
    /// `timeout` bounds every request so no call can hang the caller.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            context: None,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::new(
            &settings.api_base_url,
            Duration::from_secs(settings.request_timeout_secs.max(1)),
        )
    }

    /// Attaches the signed-in user so mood samples are filed under them.
    pub fn with_context(mut self, context: SessionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn try_send_chat_turn(&self, transcript: &[Turn], new_text: &str) -> Result<ChatReply> {
        let request = ChatRequest {
            messages: transcript,
            input: new_text,
        };
        let response = self
            .client
            .post(self.endpoint("chat"))
            .json(&request)
            .send()
            .await
            .context("chat request failed")?;

        ensure_success(response)
            .await?
            .json::<ChatReply>()
            .await
            .context("failed to parse chat reply")
    }

    async fn try_analyze_image(&self, frame: &CaptureFrame) -> Result<EmotionResult> {
        let encoded = frame.to_base64();
        let response = self
            .client
            .post(self.endpoint("analyze-emotion"))
            .json(&AnalyzeRequest { image: &encoded })
            .send()
            .await
            .context("analysis request failed")?;

        ensure_success(response)
            .await?
            .json::<EmotionResult>()
            .await
            .context("failed to parse emotion result")
    }

    async fn try_persist_mood(&self, score: u8, label: &str) -> Result<()> {
        let request = MoodRequest {
            score,
            label,
            user_id: self.context.as_ref().map(SessionContext::user_id),
        };
        let response = self
            .client
            .post(self.endpoint("mood"))
            .json(&request)
            .send()
            .await
            .context("mood request failed")?;

        ensure_success(response).await.map(|_| ())
    }

    async fn try_fetch_mood_history(&self) -> Result<Vec<MoodSample>> {
        let response = self
            .client
            .get(self.endpoint("mood"))
            .send()
            .await
            .context("mood history request failed")?;

        ensure_success(response)
            .await?
            .json::<Vec<MoodSample>>()
            .await
            .context("failed to parse mood history")
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("backend returned {}: {}", status, body))
}

#[async_trait]
impl Backend for HttpGateway {
    async fn send_chat_turn(&self, transcript: &[Turn], new_text: &str) -> ChatReply {
        match self.try_send_chat_turn(transcript, new_text).await {
            Ok(reply) => {
                log_debug!("chat reply received from {:?} path", reply.source);
                reply
            }
            Err(err) => {
                log_error!("Backend connection error: {err:#}");
                fallback_reply()
            }
        }
    }

    async fn analyze_image(&self, frame: CaptureFrame) -> Option<EmotionResult> {
        match self.try_analyze_image(&frame).await {
            Ok(result) => Some(result),
            Err(err) => {
                log_error!("Vision API error: {err:#}");
                None
            }
        }
    }

    async fn persist_mood(&self, score: u8, label: &str) {
        if let Err(err) = self.try_persist_mood(score, label).await {
            log_warn!("Mood persistence failed: {err:#}");
        }
    }

    async fn fetch_mood_history(&self) -> Option<Vec<MoodSample>> {
        match self.try_fetch_mood_history().await {
            Ok(samples) => Some(samples),
            Err(err) => {
                log_warn!("Mood history unavailable: {err:#}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReplyProvenance, User};
    use axum::{
        extract::State,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Recorded = Arc<Mutex<Vec<Value>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn gateway(base_url: &str) -> HttpGateway {
        HttpGateway::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn frame() -> CaptureFrame {
        CaptureFrame::from_jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9], 1, 1)
    }

    fn unreachable() -> HttpGateway {
        gateway("http://127.0.0.1:1/api")
    }

    #[tokio::test]
    async fn chat_posts_transcript_and_input() {
        let recorded: Recorded = Arc::default();
        let router = Router::new()
            .route(
                "/api/chat",
                post(|State(seen): State<Recorded>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(json!({ "text": "That sounds hard.", "source": "ai", "confidence": 1.0 }))
                }),
            )
            .with_state(recorded.clone());
        let base = serve(router).await;

        let transcript = vec![Turn::assistant("Hello")];
        let reply = gateway(&base)
            .send_chat_turn(&transcript, "I feel anxious today")
            .await;

        assert_eq!(reply.text, "That sounds hard.");
        assert_eq!(reply.source, ReplyProvenance::Ai);
        let body = recorded.lock().unwrap()[0].clone();
        assert_eq!(
            body,
            json!({
                "messages": [{ "role": "model", "text": "Hello" }],
                "input": "I feel anxious today"
            })
        );
    }

    #[tokio::test]
    async fn chat_falls_back_on_server_error() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "text": "static", "source": "error" })),
                )
            }),
        );
        let base = serve(router).await;

        let reply = gateway(&base).send_chat_turn(&[], "hi").await;
        assert_eq!(reply, fallback_reply());
    }

    #[tokio::test]
    async fn chat_falls_back_when_backend_is_down() {
        let reply = unreachable().send_chat_turn(&[], "hi").await;
        assert_eq!(reply.source, ReplyProvenance::Error);
        assert_eq!(reply.text, crate::gateway::CHAT_FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn chat_falls_back_on_garbage_body() {
        let router = Router::new().route("/api/chat", post(|| async { "not json" }));
        let base = serve(router).await;

        let reply = gateway(&base).send_chat_turn(&[], "hi").await;
        assert_eq!(reply, fallback_reply());
    }

    #[tokio::test]
    async fn chat_falls_back_on_unknown_source() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { Json(json!({ "text": "hi", "source": "gpt" })) }),
        );
        let base = serve(router).await;

        let reply = gateway(&base).send_chat_turn(&[], "hi").await;
        assert_eq!(reply, fallback_reply());
    }

    #[tokio::test]
    async fn analyze_sends_base64_frame() {
        let recorded: Recorded = Arc::default();
        let router = Router::new()
            .route(
                "/api/analyze-emotion",
                post(|State(seen): State<Recorded>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(json!({
                        "emotion": "happy",
                        "confidence": 0.9,
                        "stressLevel": 20,
                        "advice": "Keep it up"
                    }))
                }),
            )
            .with_state(recorded.clone());
        let base = serve(router).await;

        let result = gateway(&base).analyze_image(frame()).await.unwrap();
        assert_eq!(result.emotion, "happy");
        assert_eq!(result.stress_level, 20.0);
        assert_eq!(recorded.lock().unwrap()[0], json!({ "image": "/9j/2Q==" }));
    }

    #[tokio::test]
    async fn analyze_returns_none_on_failure() {
        let router = Router::new().route(
            "/api/analyze-emotion",
            post(|| async { (StatusCode::BAD_GATEWAY, "vision down") }),
        );
        let base = serve(router).await;

        assert!(gateway(&base).analyze_image(frame()).await.is_none());
        assert!(unreachable().analyze_image(frame()).await.is_none());
    }

    #[tokio::test]
    async fn analyze_returns_none_on_garbage_body() {
        let router = Router::new().route("/api/analyze-emotion", post(|| async { "not json" }));
        let base = serve(router).await;

        assert!(gateway(&base).analyze_image(frame()).await.is_none());
    }

    #[tokio::test]
    async fn persist_mood_includes_user_when_context_attached() {
        let recorded: Recorded = Arc::default();
        let router = Router::new()
            .route(
                "/api/mood",
                post(|State(seen): State<Recorded>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(json!({ "status": "saved" }))
                }),
            )
            .with_state(recorded.clone());
        let base = serve(router).await;

        gateway(&base).persist_mood(80, "happy").await;
        gateway(&base)
            .with_context(SessionContext::new(User::default()))
            .persist_mood(55, "calm")
            .await;

        let seen = recorded.lock().unwrap();
        assert_eq!(seen[0], json!({ "score": 80, "label": "happy" }));
        assert_eq!(
            seen[1],
            json!({ "score": 55, "label": "calm", "user_id": "Alex Johnson" })
        );
    }

    #[tokio::test]
    async fn persist_mood_swallows_failures() {
        unreachable().persist_mood(10, "sad").await;
    }

    #[tokio::test]
    async fn history_decodes_samples() {
        let router = Router::new().route(
            "/api/mood",
            get(|| async {
                Json(json!([
                    { "score": 70, "label": "calm", "day": "10-14" },
                    { "score": 45, "label": "tired", "day": "10-15" }
                ]))
            }),
        );
        let base = serve(router).await;

        let history = gateway(&base).fetch_mood_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], MoodSample::new("10-15", 45, "tired"));
    }

    #[tokio::test]
    async fn history_is_none_on_non_success() {
        let router = Router::new().route(
            "/api/mood",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!([]))) }),
        );
        let base = serve(router).await;

        assert!(gateway(&base).fetch_mood_history().await.is_none());
        assert!(unreachable().fetch_mood_history().await.is_none());
    }

    #[tokio::test]
    async fn hung_backend_resolves_after_timeout() {
        let router = Router::new().route(
            "/api/mood",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(json!([]))
            }),
        );
        let base = serve(router).await;
        let gateway = HttpGateway::new(&base, Duration::from_millis(200)).unwrap();

        assert!(gateway.fetch_mood_history().await.is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let gateway = gateway("http://localhost:5000/api/");
        assert_eq!(gateway.endpoint("mood"), "http://localhost:5000/api/mood");
    }
}
