// ABOUTME: Google Gemini vision client for food image analysis
// ABOUTME: Sends a text prompt plus an inline base64 image to generateContent and returns the text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Gemini Vision Client
//!
//! Implementation of [`VisionAnalyzer`] for Google's Gemini models through the
//! Generative Language REST API.
//!
//! ## Configuration
//!
//! Set `GOOGLE_API_KEY` (or `GEMINI_API_KEY`) with a key from Google AI
//! Studio. `GEMINI_MODEL` selects the model (default `gemini-2.5-flash`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutrifind::config::GeminiConfig;
//! use nutrifind::llm::{nutrition_analysis_prompt, AnalysisRequest, GeminiVisionClient};
//! use nutrifind::llm::{ImageInput, ImageMimeType, VisionAnalyzer};
//! use nutrifind::errors::AppError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let client = GeminiVisionClient::new(&GeminiConfig {
//!         api_key: "my-key".to_owned(),
//!         ..GeminiConfig::default()
//!     });
//!     let photo = std::fs::read("lunch.jpg").unwrap_or_default();
//!     let request = AnalysisRequest {
//!         prompt: nutrition_analysis_prompt(70.0, 175.0, 30),
//!         image: ImageInput::new(photo, ImageMimeType::Jpeg),
//!     };
//!     println!("{}", client.analyze(&request).await?);
//!     Ok(())
//! }
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{AnalysisRequest, VisionAnalyzer};
use crate::config::GeminiConfig;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

/// Content structure for Gemini API
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

/// Part of content (text, inline image, or anything else the API adds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    /// Text content
    Text { text: String },
    /// Base64 image sent with the request
    InlineData { inline_data: InlineData },
    /// Parts this client does not use
    Other(serde_json::Value),
}

/// Inline binary payload
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
    error: Option<GeminiError>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// Safety feedback on the prompt
#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// API error response from Gemini
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Client Implementation
// ============================================================================

/// Google Gemini vision client
pub struct GeminiVisionClient {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl GeminiVisionClient {
    /// Create a client from configuration
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            client: Client::new(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Model this client calls
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the API URL for the configured model and a method
    fn build_url(&self, method: &str) -> String {
        format!("{}/models/{}:{method}", self.base_url, self.model)
    }

    /// Build the request body: prompt text first, then the image
    fn build_gemini_request(request: &AnalysisRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_owned()),
                parts: vec![
                    ContentPart::Text {
                        text: request.prompt.clone(),
                    },
                    ContentPart::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.mime.as_str().to_owned(),
                            data: STANDARD.encode(&request.image.data),
                        },
                    },
                ],
            }],
        }
    }

    /// Concatenate the text parts of the first candidate
    fn extract_content(response: &GeminiResponse) -> AppResult<String> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            return Err(AppError::external_service(
                "Gemini",
                format!("Request was blocked ({reason})"),
            ));
        }

        let candidate = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or_else(|| AppError::external_service("Gemini", "No content in response"))?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::Text { text } => Some(text.as_str()),
                        ContentPart::InlineData { .. } | ContentPart::Other(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
            return Err(AppError::external_service(
                "Gemini",
                format!("Response contained no text (finish reason {reason})"),
            ));
        }

        Ok(text)
    }

    /// Map API error status to appropriate error type
    fn map_api_error(status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);

        match status {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                "The AI service rejected the configured API key.",
            )
            .with_details(serde_json::json!({ "status": status, "message": message })),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                Self::extract_quota_message(&message),
            ),
            500..=599 => AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("Gemini is unavailable ({status}): {message}"),
            ),
            _ => AppError::external_service("Gemini", format!("API error ({status}): {message}")),
        }
    }

    /// Extract a user-friendly quota message from a Gemini 429 body
    fn extract_quota_message(message: &str) -> String {
        const RETRY_PREFIX: &str = "Please retry in ";

        // Example: "Please retry in 6.406453963s."
        let seconds = message.find(RETRY_PREFIX).and_then(|pos| {
            let after_prefix = &message[pos + RETRY_PREFIX.len()..];
            let end = after_prefix.find('s')?;
            after_prefix[..end].parse::<f64>().ok()
        });

        match seconds {
            Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
                let seconds_int = seconds.ceil() as u64;
                format!("AI service quota exceeded. Please try again in {seconds_int} seconds.")
            }
            _ => "AI service quota exceeded. Please wait a moment and try again.".to_owned(),
        }
    }
}

#[async_trait]
impl VisionAnalyzer for GeminiVisionClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(
        skip(self, request),
        fields(model = %self.model, image_bytes = request.image.data.len())
    )]
    async fn analyze(&self, request: &AnalysisRequest) -> AppResult<String> {
        let url = self.build_url("generateContent");
        let gemini_request = Self::build_gemini_request(request);

        debug!("Sending image analysis request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("Could not reach Gemini: {e}"),
                )
                .with_source(e)
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            AppError::external_service("Gemini", format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse Gemini response");
                AppError::external_service("Gemini", format!("Failed to parse response: {e}"))
            })?;

        if let Some(error) = gemini_response.error {
            return Err(AppError::external_service("Gemini", error.message));
        }

        let content = Self::extract_content(&gemini_response)?;
        debug!(chars = content.len(), "Received Gemini analysis");
        Ok(content)
    }
}

impl Debug for GeminiVisionClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiVisionClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ImageInput, ImageMimeType};

    fn client() -> GeminiVisionClient {
        GeminiVisionClient::new(&GeminiConfig {
            api_key: "secret-key".into(),
            model: "gemini-2.5-flash".into(),
            base_url: "https://example.test/v1beta/".into(),
        })
    }

    #[test]
    fn test_build_url_has_no_key() {
        let url = client().build_url("generateContent");
        assert_eq!(
            url,
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(!url.contains("secret-key"));
    }

    #[test]
    fn test_request_body_shape() {
        let request = AnalysisRequest {
            prompt: "Describe".into(),
            image: ImageInput::new(vec![1_u8, 2, 3], ImageMimeType::Png),
        };
        let body =
            serde_json::to_value(GeminiVisionClient::build_gemini_request(&request)).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Describe");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "AQID");
    }

    #[test]
    fn test_extract_content_concatenates_text_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[
                {"text":"Rice: 200 calories. "},
                {"thoughtSignature":"abc"},
                {"text":"Total: 200 calories"}
            ]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(
            GeminiVisionClient::extract_content(&response).unwrap(),
            "Rice: 200 calories. Total: 200 calories"
        );
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = GeminiVisionClient::extract_content(&response).unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
        assert!(err.message.contains("SAFETY"));
    }

    #[test]
    fn test_empty_candidate_is_an_error() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#).unwrap();
        let err = GeminiVisionClient::extract_content(&response).unwrap_err();
        assert!(err.message.contains("MAX_TOKENS"));
    }

    #[test]
    fn test_map_api_error_statuses() {
        let body = r#"{"error":{"message":"API key not valid"}}"#;
        assert_eq!(
            GeminiVisionClient::map_api_error(403, body).code,
            ErrorCode::ExternalAuthFailed
        );
        assert_eq!(
            GeminiVisionClient::map_api_error(503, "overloaded").code,
            ErrorCode::ExternalServiceUnavailable
        );
        let bad_request = GeminiVisionClient::map_api_error(400, body);
        assert_eq!(bad_request.code, ErrorCode::ExternalServiceError);
        assert!(bad_request.message.contains("API key not valid"));
    }

    #[test]
    fn test_quota_message() {
        let body = r#"{"error":{"message":"Quota exceeded. Please retry in 6.406453963s."}}"#;
        let err = GeminiVisionClient::map_api_error(429, body);
        assert_eq!(err.code, ErrorCode::ExternalRateLimited);
        assert_eq!(
            err.message,
            "AI service quota exceeded. Please try again in 7 seconds."
        );
        assert_eq!(
            GeminiVisionClient::extract_quota_message("Resource exhausted"),
            "AI service quota exceeded. Please wait a moment and try again."
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", client());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret-key"));
    }
}
