use serde::{Deserialize, Serialize};

// Widget request format is `{ "message": string }`. The body stays untyped so
// the gate can answer arrays, scalars and non-string messages with a themed 400
pub fn chat_message(body: &serde_json::Value) -> Option<&serde_json::Value> {
    body.as_object().and_then(|o| o.get("message"))
}

// Widget response format, the only body this service ever returns on /chat
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ChatReply {
    pub reply: String,
}

impl ChatReply {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

// Chat-completion API request format
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

impl CompletionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

// Chat-completion API response format. Every level is optional, a missing
// choice or content is a normal outcome
#[derive(Deserialize, Debug)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Option<Vec<CompletionChoice>>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionChoiceMessage>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// First candidate's text, trimmed. `None` when absent or blank.
    pub fn first_content(&self) -> Option<String> {
        self.choices
            .as_ref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}
