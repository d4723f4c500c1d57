// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use super::backend::{BackendError, CompletionBackend, CompletionRequest};
use super::{
    api_key_looks_valid, build_document_prompt, build_prompt, simulated_document_text,
    simulated_suggestions, AnalyzeRequest, Diagnostics, ErrorResponse, ErrorType,
    SuggestionResponse, UploadRequest, MAX_TOKENS,
};

/// Shared state of the suggestion server.
#[derive(Debug)]
pub struct AppState<B> {
    pub backend: B,
    /// Provider credential, only checked for presence and shape here.
    pub api_key: Option<String>,
    pub primary_model: String,
    pub fallback_model: String,
    /// Artificial delay of the simulated analysis.
    pub simulated_delay: Duration,
}

impl<B: CompletionBackend> AppState<B> {
    pub fn new(backend: B, api_key: Option<String>) -> Self {
        Self {
            backend,
            api_key,
            primary_model: "gpt-4o".to_owned(),
            fallback_model: "gpt-3.5-turbo".to_owned(),
            simulated_delay: Duration::from_millis(1500),
        }
    }

    fn check_credential(&self) -> Result<(), BackendError> {
        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => Err(BackendError::new(
                ErrorType::MissingApiKey,
                "OpenAI API key is missing. Please add it to your environment variables.",
            )),
            Some(key) if !api_key_looks_valid(key) => Err(BackendError::new(
                ErrorType::InvalidApiKey,
                "OpenAI API key appears to be invalid. Please check your API key format.",
            )),
            Some(_) => Ok(()),
        }
    }

    /// Runs the prompt on the requested (or primary) model, then once more on the fallback
    /// model when the first failure is model specific.
    async fn complete_with_fallback(
        &self,
        prompt: String,
        requested_model: Option<&str>,
    ) -> Result<SuggestionResponse, BackendError> {
        let first = requested_model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(&self.primary_model)
            .to_owned();
        let mut models = vec![first];
        if models[0] != self.fallback_model {
            models.push(self.fallback_model.clone());
        }

        let mut last_error = None;
        for model in models {
            let request = CompletionRequest {
                model: model.clone(),
                prompt: prompt.clone(),
                max_tokens: MAX_TOKENS,
            };
            match self.backend.complete(request).await {
                Ok(suggestions) => {
                    return Ok(SuggestionResponse {
                        suggestions,
                        model_used: Some(model),
                    })
                }
                Err(err) if err.error_type.retry_with_other_model() => {
                    tracing::warn!(%model, error = %err, "model unavailable; trying fallback");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_error.unwrap_or_else(|| BackendError::new(ErrorType::Unknown, "no model tried")))
    }
}

pub fn router<B: CompletionBackend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze::<B>))
        .route("/api/mock-analyze", post(mock_analyze::<B>))
        .route("/api/upload", post(upload::<B>))
        .route("/api/diagnose", get(diagnose::<B>))
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve<B: CompletionBackend>(
    addr: SocketAddr,
    state: AppState<B>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "suggestion server listening");
    axum::serve(listener, router(state)).await
}

fn error_response(
    status: StatusCode,
    message: &str,
    error: Option<String>,
    error_type: Option<ErrorType>,
) -> Response {
    let body = ErrorResponse {
        message: message.to_owned(),
        error,
        error_type,
    };
    (status, Json(body)).into_response()
}

fn no_content() -> Response {
    error_response(StatusCode::BAD_REQUEST, "No content provided", None, None)
}

fn backend_failure(err: BackendError) -> Response {
    let message = match err.error_type {
        ErrorType::MissingApiKey | ErrorType::InvalidApiKey
            if err.message.contains("OpenAI API key") =>
        {
            err.message.clone()
        }
        ErrorType::MissingApiKey => "OpenAI API key is missing".to_owned(),
        ErrorType::InvalidApiKey => "Invalid OpenAI API key".to_owned(),
        ErrorType::RateLimit => "OpenAI API rate limit exceeded".to_owned(),
        ErrorType::QuotaExceeded => "OpenAI API quota exceeded".to_owned(),
        ErrorType::ModelAccess => "No accessible model is available for this API key".to_owned(),
        ErrorType::Unknown => "Error generating AI response".to_owned(),
    };
    let status = StatusCode::from_u16(err.error_type.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, &message, Some(err.message), Some(err.error_type))
}

async fn analyze<B: CompletionBackend>(
    State(state): State<Arc<AppState<B>>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    if let Err(err) = state.check_credential() {
        return backend_failure(err);
    }
    let Some(content) = request.content() else {
        return no_content();
    };

    match state
        .complete_with_fallback(build_prompt(content), request.model.as_deref())
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(err) => backend_failure(err),
    }
}

async fn mock_analyze<B: CompletionBackend>(
    State(state): State<Arc<AppState<B>>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let Some(content) = request.content() else {
        return no_content();
    };
    tokio::time::sleep(state.simulated_delay).await;
    Json(SuggestionResponse {
        suggestions: simulated_suggestions(content),
        model_used: None,
    })
    .into_response()
}

async fn upload<B: CompletionBackend>(
    State(state): State<Arc<AppState<B>>>,
    Json(request): Json<UploadRequest>,
) -> Response {
    if let Err(err) = state.check_credential() {
        return backend_failure(err);
    }
    let file_name = request.file_name.trim();
    if file_name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No file provided", None, None);
    }

    let document = simulated_document_text(file_name);
    match state
        .complete_with_fallback(build_document_prompt(&document), None)
        .await
    {
        Ok(response) => Json(json!({
            "success": true,
            "suggestions": response.suggestions,
            "modelUsed": response.model_used,
        }))
        .into_response(),
        Err(err) => backend_failure(err),
    }
}

async fn diagnose<B: CompletionBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<Diagnostics> {
    let key = state.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty());
    let diagnostics = match key {
        None => Diagnostics {
            status: "error".to_owned(),
            message: "OpenAI API key is missing".to_owned(),
            has_api_key: false,
            api_key_length: 0,
            api_key_format: None,
            primary_model: state.primary_model.clone(),
            fallback_model: state.fallback_model.clone(),
        },
        Some(key) => Diagnostics {
            status: "success".to_owned(),
            message: "Diagnostics completed".to_owned(),
            has_api_key: true,
            api_key_length: key.len(),
            api_key_format: Some(
                if api_key_looks_valid(key) { "valid" } else { "invalid" }.to_owned(),
            ),
            primary_model: state.primary_model.clone(),
            fallback_model: state.fallback_model.clone(),
        },
    };
    Json(diagnostics)
}
