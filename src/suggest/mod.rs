// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! LLM-backed suggestions for a diagram.
//!
//! The HTTP server ([`server`]) keeps the provider credential on the server side and exposes a
//! small JSON API; [`client`] talks to that API and classifies failures so callers can pick a
//! recovery path. Suggestions are never applied to the diagram automatically.

pub mod backend;
pub mod client;
pub mod server;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use backend::{BackendError, CompletionBackend, CompletionRequest, OpenAiBackend};
pub use client::{Recovery, SuggestError, Suggestion, SuggestionClient};
pub use server::{router, serve, AppState};

/// Completion budget for one analysis.
pub const MAX_TOKENS: u32 = 500;

/// Failure tag carried in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    MissingApiKey,
    InvalidApiKey,
    RateLimit,
    QuotaExceeded,
    ModelAccess,
    Unknown,
}

impl ErrorType {
    /// HTTP status used when reporting this failure.
    pub fn status_code(self) -> u16 {
        match self {
            Self::RateLimit | Self::QuotaExceeded => 429,
            Self::MissingApiKey
            | Self::InvalidApiKey
            | Self::ModelAccess
            | Self::Unknown => 500,
        }
    }

    /// Whether another model might succeed where this one failed.
    pub fn retry_with_other_model(self) -> bool {
        matches!(self, Self::QuotaExceeded | Self::ModelAccess)
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingApiKey => "missing_api_key",
            Self::InvalidApiKey => "invalid_api_key",
            Self::RateLimit => "rate_limit",
            Self::QuotaExceeded => "quota_exceeded",
            Self::ModelAccess => "model_access",
            Self::Unknown => "unknown",
        })
    }
}

/// Body of `POST /api/analyze` and `POST /api/mock-analyze`.
///
/// `content` is the current field; `text` and `documentContent` are accepted for older callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_content: Option<String>,
    /// Preferred model; the server's primary model when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// First non-blank of `content`, `text`, `documentContent`.
    pub fn content(&self) -> Option<&str> {
        [&self.content, &self.text, &self.document_content]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub suggestions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
}

/// Body of `GET /api/diagnose`. The key itself is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub status: String,
    pub message: String,
    pub has_api_key: bool,
    pub api_key_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_format: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
}

/// Cheap shape check on a provider key: `sk-` prefix and at least 20 characters.
pub fn api_key_looks_valid(key: &str) -> bool {
    key.starts_with("sk-") && key.len() >= 20
}

pub fn build_prompt(content: &str) -> String {
    format!(
        "You are an expert in Theory of Change methodology for social impact organizations.\n\
Analyze the following text and provide specific suggestions to improve a Theory of Change diagram.\n\
Focus on identifying: key needs, activities, outputs, outcomes, and impact.\n\
Format your response as 3-5 specific, actionable recommendations.\n\
\n\
Text to analyze: {content}"
    )
}

pub fn build_document_prompt(document_text: &str) -> String {
    format!(
        "You are an expert in Theory of Change methodology for social impact organizations.\n\
Analyze the following text extracted from a document and provide specific suggestions to improve a Theory of Change diagram.\n\
Focus on identifying: key needs, activities, outputs, outcomes, and impact.\n\
Format your response as 3-5 specific, actionable recommendations.\n\
\n\
Text from document: {document_text}"
    )
}

/// Placeholder "extracted" text for an uploaded document; no real extraction happens.
pub fn simulated_document_text(file_name: &str) -> String {
    format!(
        "This is simulated text extracted from {file_name}.\n\
\n\
Our organization aims to improve education access in underserved communities.\n\
\n\
Need: Limited access to quality education in rural areas\n\
Vision: Equal educational opportunities for all children regardless of location\n\
Purpose: To bridge the educational gap between urban and rural communities\n\
\n\
Key activities include:\n\
- Developing digital learning resources\n\
- Training local teachers\n\
- Providing technology infrastructure\n\
- Creating community learning centers\n\
\n\
Expected outcomes include improved literacy rates, higher graduation rates, and increased employment opportunities."
    )
}

/// Canned suggestions returned by the simulated analysis.
pub fn simulated_suggestions(content: &str) -> String {
    format!(
        "Based on your input ({} characters), here are some suggestions:\n\
\n\
1. Consider clarifying your Need statement to focus more on root causes rather than symptoms.\n\
\n\
2. Add specific measurable indicators for your outcomes to make them more trackable.\n\
\n\
3. Consider adding a \"Stakeholder Engagement\" component to your activities section.\n\
\n\
4. Your long-term outcomes could be more clearly linked to your stated impact.\n\
\n\
5. Consider adding external factors or assumptions that might affect your theory of change.",
        content.encode_utf16().count()
    )
}

/// Acknowledges suggestions without touching the diagram.
pub fn apply_suggestions(suggestions: &str) -> String {
    tracing::debug!(chars = suggestions.len(), "suggestions acknowledged");
    "AI suggestions received. Review them and update the diagram cells manually.".to_owned()
}
