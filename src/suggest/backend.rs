// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ErrorType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub error_type: ErrorType,
    pub message: String,
}

impl BackendError {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.error_type)
    }
}

impl std::error::Error for BackendError {}

/// A text-completion provider.
pub trait CompletionBackend: Send + Sync + 'static {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<String, BackendError>> + Send;
}

/// OpenAI-compatible `chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BackendError> {
        let body = ChatRequest {
            model: &request.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| BackendError::new(ErrorType::Unknown, err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| BackendError::new(ErrorType::Unknown, err.to_string()))?;

        if !status.is_success() {
            let error = classify_failure(status.as_u16(), &text);
            tracing::warn!(
                model = %request.model,
                status = status.as_u16(),
                error_type = %error.error_type,
                "completion request failed"
            );
            return Err(error);
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|err| {
            BackendError::new(ErrorType::Unknown, format!("unexpected completion response: {err}"))
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BackendError::new(ErrorType::Unknown, "completion response had no text"))
    }
}

/// Maps a provider error response to an [`ErrorType`].
pub fn classify_failure(status: u16, body: &str) -> BackendError {
    let detail = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);
    let message = detail
        .as_ref()
        .map(|d| d.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {status}: {body}"));
    let code = detail
        .as_ref()
        .and_then(|d| d.code.clone().or_else(|| d.kind.clone()))
        .unwrap_or_default();

    let error_type = match (status, code.as_str()) {
        (_, "insufficient_quota") => ErrorType::QuotaExceeded,
        (_, "model_not_found") => ErrorType::ModelAccess,
        (_, "invalid_api_key") | (401, _) => ErrorType::InvalidApiKey,
        (429, _) => ErrorType::RateLimit,
        (403 | 404, _) => ErrorType::ModelAccess,
        _ => classify_message(&message),
    };
    BackendError::new(error_type, message)
}

/// Fallback classification on the error text alone.
pub fn classify_message(message: &str) -> ErrorType {
    let lower = message.to_ascii_lowercase();
    if lower.contains("api key") {
        ErrorType::InvalidApiKey
    } else if lower.contains("quota") {
        ErrorType::QuotaExceeded
    } else if lower.contains("rate limit") {
        ErrorType::RateLimit
    } else if lower.contains("model") && (lower.contains("not exist") || lower.contains("access")) {
        ErrorType::ModelAccess
    } else {
        ErrorType::Unknown
    }
}
