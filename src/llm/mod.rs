// ABOUTME: Vision model abstraction for food image analysis
// ABOUTME: Defines the VisionAnalyzer contract, request types and upload MIME detection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # Vision Analysis
//!
//! The analysis service hands a prompt and an image to a [`VisionAnalyzer`]
//! and gets free text back. [`GeminiVisionClient`] is the production
//! implementation; tests substitute their own.
//!
//! ```rust,no_run
//! use nutrifind::llm::{AnalysisRequest, ImageInput, ImageMimeType, VisionAnalyzer};
//!
//! async fn example(analyzer: &dyn VisionAnalyzer, photo: Vec<u8>) {
//!     let request = AnalysisRequest {
//!         prompt: "List the food items".to_owned(),
//!         image: ImageInput::new(photo, ImageMimeType::Jpeg),
//!     };
//!     let text = analyzer.analyze(&request).await;
//! }
//! ```

mod gemini;
/// Prompt templates sent with each image
pub mod prompts;

pub use gemini::GeminiVisionClient;
pub use prompts::nutrition_analysis_prompt;

use crate::errors::AppResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Image types accepted for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMimeType {
    /// `image/jpeg` (`.jpg`, `.jpeg`)
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
}

impl ImageMimeType {
    /// MIME string sent to the model
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Map a declared content type; parameters such as `; charset` are ignored
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Guess from a file name extension
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        mime_guess::from_path(file_name)
            .iter()
            .find_map(|mime| Self::from_content_type(mime.essence_str()))
    }

    /// Prefer the declared content type; fall back to the file name when the
    /// type is missing or generic
    #[must_use]
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        let declared = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && !is_generic_content_type(ct));

        match declared {
            Some(ct) => Self::from_content_type(ct),
            None => file_name.and_then(Self::from_file_name),
        }
    }
}

fn is_generic_content_type(content_type: &str) -> bool {
    let lower = content_type.to_lowercase();
    lower.starts_with("application/octet-stream") || lower.starts_with("binary/octet-stream")
}

impl fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw upload bytes with their type
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Image bytes exactly as uploaded
    pub data: Bytes,
    /// Detected type
    pub mime: ImageMimeType,
}

impl ImageInput {
    /// Wrap uploaded bytes
    #[must_use]
    pub fn new(data: impl Into<Bytes>, mime: ImageMimeType) -> Self {
        Self {
            data: data.into(),
            mime,
        }
    }
}

/// One prompt plus one image
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Instruction text
    pub prompt: String,
    /// Image to analyse
    pub image: ImageInput,
}

/// Contract for vision-language model clients
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Short provider identifier used in logs
    fn name(&self) -> &'static str;

    /// Send the prompt and image, returning the model's text verbatim
    async fn analyze(&self, request: &AnalysisRequest) -> AppResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(
            ImageMimeType::from_content_type("image/JPEG"),
            Some(ImageMimeType::Jpeg)
        );
        assert_eq!(
            ImageMimeType::from_content_type("image/webp; q=1"),
            Some(ImageMimeType::Webp)
        );
        assert_eq!(ImageMimeType::from_content_type("image/gif"), None);
    }

    #[test]
    fn test_file_name_mapping() {
        assert_eq!(
            ImageMimeType::from_file_name("lunch.JPG"),
            Some(ImageMimeType::Jpeg)
        );
        assert_eq!(
            ImageMimeType::from_file_name("dinner.png"),
            Some(ImageMimeType::Png)
        );
        assert_eq!(ImageMimeType::from_file_name("notes.txt"), None);
        assert_eq!(ImageMimeType::from_file_name("noextension"), None);
    }

    #[test]
    fn test_detect_prefers_declared_type() {
        assert_eq!(
            ImageMimeType::detect(Some("image/png"), Some("photo.jpg")),
            Some(ImageMimeType::Png)
        );
        assert_eq!(
            ImageMimeType::detect(Some("image/gif"), Some("photo.jpg")),
            None
        );
        assert_eq!(
            ImageMimeType::detect(Some("application/octet-stream"), Some("photo.webp")),
            Some(ImageMimeType::Webp)
        );
        assert_eq!(
            ImageMimeType::detect(None, Some("photo.jpeg")),
            Some(ImageMimeType::Jpeg)
        );
        assert_eq!(ImageMimeType::detect(None, None), None);
    }
}
