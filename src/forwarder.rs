use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::ChatError;
use crate::metrics::{FALLBACK_REPLIES, UPSTREAM_FAILURES};
use crate::models::{ChatReply, CompletionMessage, CompletionRequest, CompletionResponse};
use crate::persona;

/// A chat-completion API.
///
/// `Ok(None)` means the upstream answered successfully but produced no
/// usable text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<Option<String>, ChatError>;
}

// OpenAI-compatible `/chat/completions` over reqwest
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<Option<String>, ChatError> {
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Upstream { status, body });
        }

        let body = res.json::<CompletionResponse>().await?;
        Ok(body.first_content())
    }
}

/// Turns an admitted message into a reply. Every `Err` it returns already
/// carries a themed reply and status through [`ChatError`].
pub struct CompletionForwarder {
    backend: Arc<dyn CompletionBackend>,
    api_key: Option<String>,
    model: String,
}

impl CompletionForwarder {
    pub fn new(backend: Arc<dyn CompletionBackend>, api_key: Option<String>, model: String) -> Self {
        Self {
            backend,
            api_key,
            model,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn build_request(&self, message: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                CompletionMessage::system(persona::SYSTEM_PERSONA),
                CompletionMessage::user(message),
            ],
            temperature: persona::TEMPERATURE,
            max_tokens: persona::MAX_TOKENS,
        }
    }

    pub async fn forward(&self, message: &str) -> Result<ChatReply, ChatError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("missing upstream API key");
            FALLBACK_REPLIES.inc();
            return Err(ChatError::MissingCredentials);
        };

        let request = self.build_request(message);
        match self.backend.complete(api_key, &request).await {
            Ok(Some(reply)) => Ok(ChatReply::new(reply)),
            Ok(None) => {
                debug!("upstream returned no content");
                FALLBACK_REPLIES.inc();
                Ok(ChatReply::new(persona::EMPTY_COMPLETION_REPLY))
            }
            Err(err) => {
                match &err {
                    ChatError::Upstream { status, body } => {
                        error!(%status, body = %body, "upstream API error")
                    }
                    other => error!(error = %other, "upstream call failed"),
                }
                UPSTREAM_FAILURES.inc();
                FALLBACK_REPLIES.inc();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Canned-outcome backend that records every call
    pub(crate) struct StubBackend {
        outcome: Box<dyn Fn() -> Result<Option<String>, ChatError> + Send + Sync>,
        pub calls: AtomicUsize,
        pub last_request: Mutex<Option<(String, CompletionRequest)>>,
    }

    impl StubBackend {
        pub(crate) fn new(
            outcome: impl Fn() -> Result<Option<String>, ChatError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                outcome: Box::new(outcome),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        pub(crate) fn replying(text: &'static str) -> Arc<Self> {
            Self::new(move || Ok(Some(text.to_string())))
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for StubBackend {
        async fn complete(
            &self,
            api_key: &str,
            request: &CompletionRequest,
        ) -> Result<Option<String>, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some((api_key.to_string(), request.clone()));
            (self.outcome)()
        }
    }

    fn forwarder(backend: Arc<StubBackend>, key: Option<&str>) -> CompletionForwarder {
        CompletionForwarder::new(backend, key.map(str::to_string), "gpt-4o-mini".to_string())
    }

    #[tokio::test]
    async fn missing_key_skips_network() {
        let backend = StubBackend::replying("Hi!");
        let err = forwarder(backend.clone(), None).forward("hello").await.unwrap_err();

        assert!(matches!(err, ChatError::MissingCredentials));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.reply(), persona::MISSING_KEY_REPLY);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn successful_completion_is_returned() {
        let backend = StubBackend::replying("Hi!");
        let reply = forwarder(backend.clone(), Some("sk-test")).forward("hello").await.unwrap();
        assert_eq!(reply, ChatReply::new("Hi!"));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn request_carries_persona_and_fixed_parameters() {
        let backend = StubBackend::replying("Hi!");
        forwarder(backend.clone(), Some("sk-test")).forward("hello").await.unwrap();

        let (key, req) = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(key, "sk-test");
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.temperature, 0.85);
        assert_eq!(req.max_tokens, 300);
        assert_eq!(
            req.messages,
            vec![
                CompletionMessage::system(persona::SYSTEM_PERSONA),
                CompletionMessage::user("hello"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_completion_gets_fallback() {
        let backend = StubBackend::new(|| Ok(None));
        let reply = forwarder(backend, Some("sk-test")).forward("hello").await.unwrap();
        assert_eq!(reply.reply, persona::EMPTY_COMPLETION_REPLY);
    }

    #[tokio::test]
    async fn upstream_error_status_is_mirrored() {
        let backend = StubBackend::new(|| {
            Err(ChatError::Upstream {
                status: StatusCode::TOO_MANY_REQUESTS,
                body: "quota".to_string(),
            })
        });
        let err = forwarder(backend, Some("sk-test")).forward("hello").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.reply(), persona::UPSTREAM_FAILURE_REPLY);
    }

    #[tokio::test]
    async fn transport_failure_is_500() {
        let backend = StubBackend::new(|| Err(ChatError::Unexpected("connection reset".into())));
        let err = forwarder(backend, Some("sk-test")).forward("hello").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.reply(), persona::UNEXPECTED_REPLY);
    }

    // Throwaway upstream on an ephemeral port
    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn backend(url: &str) -> OpenAiBackend {
        OpenAiBackend::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn openai_backend_reads_first_choice() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: axum::http::HeaderMap, Json(body): Json<CompletionRequest>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body.messages.len(), 2);
                Json(serde_json::json!({
                    "choices": [{ "message": { "role": "assistant", "content": " Hi! " } }]
                }))
            }),
        );
        let url = spawn_upstream(app).await;

        let fwd = CompletionForwarder::new(
            Arc::new(backend(&url)),
            Some("sk-test".into()),
            "gpt-4o-mini".into(),
        );
        assert_eq!(fwd.forward("hello").await.unwrap(), ChatReply::new("Hi!"));
    }

    #[tokio::test]
    async fn openai_backend_surfaces_error_body() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let url = spawn_upstream(app).await;

        let req = forwarder(StubBackend::replying("unused"), Some("k")).build_request("hi");
        match backend(&url).complete("bad", &req).await {
            Err(ChatError::Upstream { status, body }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn openai_backend_malformed_json_is_unexpected() {
        let app = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
        let url = spawn_upstream(app).await;

        let req = forwarder(StubBackend::replying("unused"), Some("k")).build_request("hi");
        let res = backend(&url).complete("k", &req).await;
        assert!(matches!(res, Err(ChatError::Unexpected(_))));
    }

    #[tokio::test]
    async fn openai_backend_unreachable_is_unexpected() {
        // bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let req = forwarder(StubBackend::replying("unused"), Some("k")).build_request("hi");
        let res = backend(&format!("http://{addr}")).complete("k", &req).await;
        assert!(matches!(res, Err(ChatError::Unexpected(_))));
    }
}
