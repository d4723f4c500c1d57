// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{
    AnalyzeRequest, Diagnostics, ErrorResponse, ErrorType, SuggestionResponse, UploadRequest,
};
use crate::editor::ValidationError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub model_used: Option<String>,
    /// Produced by the canned fallback instead of a model.
    pub simulated: bool,
}

/// What a caller should do after a failed suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    RetryAlternateModel,
    UseSimulated,
    ShowDiagnostic,
}

#[derive(Debug)]
pub enum SuggestError {
    EmptyContent,
    MissingCredential { message: String },
    RateLimited { message: String },
    QuotaDenied { message: String },
    Timeout,
    Failed { status: Option<u16>, message: String },
}

impl SuggestError {
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::QuotaDenied { .. } => Recovery::RetryAlternateModel,
            Self::RateLimited { .. } => Recovery::UseSimulated,
            Self::EmptyContent
            | Self::MissingCredential { .. }
            | Self::Timeout
            | Self::Failed { .. } => Recovery::ShowDiagnostic,
        }
    }

    fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
        let message = parsed
            .as_ref()
            .map(|err| match &err.error {
                Some(detail) if detail != &err.message => format!("{}: {detail}", err.message),
                _ => err.message.clone(),
            })
            .unwrap_or_else(|| body.trim().to_owned());

        match parsed.and_then(|err| err.error_type) {
            Some(ErrorType::MissingApiKey | ErrorType::InvalidApiKey) => {
                Self::MissingCredential { message }
            }
            Some(ErrorType::RateLimit) => Self::RateLimited { message },
            Some(ErrorType::QuotaExceeded | ErrorType::ModelAccess) => Self::QuotaDenied { message },
            Some(ErrorType::Unknown) => Self::Failed {
                status: Some(status),
                message,
            },
            None => match status {
                400 => Self::EmptyContent,
                429 => Self::RateLimited { message },
                _ => Self::Failed {
                    status: Some(status),
                    message,
                },
            },
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Failed {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

impl fmt::Display for SuggestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyContent => ValidationError::EmptyContent.fmt(f),
            Self::MissingCredential { message } => write!(f, "credential problem: {message}"),
            Self::RateLimited { message } => write!(f, "rate limited: {message}"),
            Self::QuotaDenied { message } => write!(f, "quota or model access denied: {message}"),
            Self::Timeout => f.write_str("the suggestion request timed out"),
            Self::Failed {
                status: Some(status),
                message,
            } => write!(f, "suggestion request failed (HTTP {status}): {message}"),
            Self::Failed {
                status: None,
                message,
            } => write!(f, "suggestion request failed: {message}"),
        }
    }
}

impl std::error::Error for SuggestError {}

/// HTTP client for the suggestion server.
#[derive(Debug, Clone)]
pub struct SuggestionClient {
    http: reqwest::Client,
    base_url: String,
    alternate_model: Option<String>,
}

impl SuggestionClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            alternate_model: None,
        })
    }

    /// Model requested when the server reports quota or model-access denial.
    pub fn with_alternate_model(mut self, model: impl Into<String>) -> Self {
        self.alternate_model = Some(model.into());
        self
    }

    pub async fn analyze(&self, content: &str) -> Result<Suggestion, SuggestError> {
        self.analyze_with_model(content, None).await
    }

    pub async fn analyze_with_model(
        &self,
        content: &str,
        model: Option<&str>,
    ) -> Result<Suggestion, SuggestError> {
        if content.trim().is_empty() {
            return Err(SuggestError::EmptyContent);
        }
        let request = AnalyzeRequest {
            model: model.map(str::to_owned),
            ..AnalyzeRequest::new(content)
        };
        let response: SuggestionResponse = self.post_json("/api/analyze", &request).await?;
        Ok(Suggestion {
            text: response.suggestions,
            model_used: response.model_used,
            simulated: false,
        })
    }

    pub async fn simulate(&self, content: &str) -> Result<Suggestion, SuggestError> {
        if content.trim().is_empty() {
            return Err(SuggestError::EmptyContent);
        }
        let response: SuggestionResponse = self
            .post_json("/api/mock-analyze", &AnalyzeRequest::new(content))
            .await?;
        Ok(Suggestion {
            text: response.suggestions,
            model_used: response.model_used,
            simulated: true,
        })
    }

    /// Analyzes the placeholder text the server substitutes for an uploaded document.
    pub async fn analyze_document(&self, file_name: &str) -> Result<Suggestion, SuggestError> {
        if file_name.trim().is_empty() {
            return Err(SuggestError::EmptyContent);
        }
        let request = UploadRequest {
            file_name: file_name.to_owned(),
        };
        let response: SuggestionResponse = self.post_json("/api/upload", &request).await?;
        Ok(Suggestion {
            text: response.suggestions,
            model_used: response.model_used,
            simulated: false,
        })
    }

    /// Analyzes `content`, following each error's [`Recovery`]: a quota denial retries once
    /// with the alternate model, and rate limits (or a second denial) fall back to the
    /// simulated analysis.
    pub async fn suggest_or_simulate(&self, content: &str) -> Result<Suggestion, SuggestError> {
        let err = match self.analyze(content).await {
            Ok(suggestion) => return Ok(suggestion),
            Err(err) => err,
        };

        let err = match (err.recovery(), self.alternate_model.as_deref()) {
            (Recovery::RetryAlternateModel, Some(model)) => {
                tracing::warn!(error = %err, %model, "retrying suggestions with alternate model");
                match self.analyze_with_model(content, Some(model)).await {
                    Ok(suggestion) => return Ok(suggestion),
                    Err(retry_err) => retry_err,
                }
            }
            _ => err,
        };

        match err.recovery() {
            Recovery::UseSimulated | Recovery::RetryAlternateModel => {
                tracing::warn!(error = %err, "falling back to simulated suggestions");
                self.simulate(content).await
            }
            Recovery::ShowDiagnostic => Err(err),
        }
    }

    pub async fn diagnose(&self) -> Result<Diagnostics, SuggestError> {
        let response = self
            .http
            .get(format!("{}/api/diagnose", self.base_url))
            .send()
            .await
            .map_err(SuggestError::from_transport)?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, SuggestError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(SuggestError::from_transport)?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SuggestError> {
    let status = response.status();
    let text = response.text().await.map_err(SuggestError::from_transport)?;
    if !status.is_success() {
        return Err(SuggestError::from_response(status.as_u16(), &text));
    }
    serde_json::from_str(&text).map_err(|err| SuggestError::Failed {
        status: Some(status.as_u16()),
        message: format!("unexpected response body: {err}"),
    })
}
