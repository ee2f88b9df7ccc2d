//! Request options and result types shared by the pipeline and the server

use crate::error::{Result, StudioError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Prompt used when the caller does not supply one
pub const DEFAULT_PROMPT: &str = "professional product photo, studio lighting, e-commerce";

/// Negative prompt sent with every enhancement call
pub const DEFAULT_NEGATIVE_PROMPT: &str = "ugly, deformed, noisy, blurry, distorted";

/// Suffix appended after the style when building the enhancement prompt
pub const PROMPT_QUALITY_SUFFIX: &str = "studio lighting, professional e-commerce photo";

/// Backdrop style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    /// Warm brown vertical gradient
    #[default]
    BrownGradient,
    /// Flat light gray
    MinimalWhite,
}

impl Style {
    /// All known styles
    pub const ALL: [Style; 2] = [Style::BrownGradient, Style::MinimalWhite];

    /// Kebab-case identifier used on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BrownGradient => "brown-gradient",
            Self::MinimalWhite => "minimal-white",
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Style {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| StudioError::unsupported_style(s))
    }
}

/// Per-image processing options
///
/// `style` stays a free string until the backdrop is synthesized so that an
/// unknown name surfaces as `UnsupportedStyle` from the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOptions {
    pub style: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub remove_background: bool,
    pub use_external_enhancement: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            style: Style::default().as_str().to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            remove_background: true,
            use_external_enhancement: true,
        }
    }
}

impl ProcessingOptions {
    #[must_use]
    pub fn with_style<S: Into<String>>(mut self, style: S) -> Self {
        self.style = style.into();
        self
    }

    #[must_use]
    pub fn with_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_remove_background(mut self, remove: bool) -> Self {
        self.remove_background = remove;
        self
    }

    #[must_use]
    pub fn with_external_enhancement(mut self, enabled: bool) -> Self {
        self.use_external_enhancement = enabled;
        self
    }

    /// Prompt sent to the generation service
    #[must_use]
    pub fn enhancement_prompt(&self) -> String {
        format!(
            "{}, {} background, {}",
            self.prompt, self.style, PROMPT_QUALITY_SUFFIX
        )
    }
}

/// Successful outcome of the pipeline before serialization
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub image: DynamicImage,
    /// Whether the external generation service produced the final image
    pub enhanced: bool,
}

impl ProcessedImage {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Serialized outcome of processing a single image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    /// Successful result carrying an encoded image
    #[must_use]
    pub fn success(image: String, width: u32, height: u32) -> Self {
        Self {
            success: true,
            image: Some(image),
            width: Some(width),
            height: Some(height),
            error: None,
        }
    }

    /// Failed result carrying a human-readable message
    #[must_use]
    pub fn failure<S: Into<String>>(error: S) -> Self {
        Self {
            success: false,
            image: None,
            width: None,
            height: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parsing() {
        assert_eq!("brown-gradient".parse::<Style>().unwrap(), Style::BrownGradient);
        assert_eq!("minimal-white".parse::<Style>().unwrap(), Style::MinimalWhite);
        assert!(matches!(
            "Brown-Gradient".parse::<Style>(),
            Err(StudioError::UnsupportedStyle(_))
        ));
        assert_eq!(Style::default().to_string(), "brown-gradient");
    }

    #[test]
    fn test_default_options() {
        let options = ProcessingOptions::default();
        assert_eq!(options.style, "brown-gradient");
        assert_eq!(options.prompt, DEFAULT_PROMPT);
        assert!(options.remove_background);
        assert!(options.use_external_enhancement);
    }

    #[test]
    fn test_enhancement_prompt() {
        let options = ProcessingOptions::default()
            .with_prompt("leather wallet")
            .with_style("minimal-white");
        assert_eq!(
            options.enhancement_prompt(),
            "leather wallet, minimal-white background, studio lighting, professional e-commerce photo"
        );
    }

    #[test]
    fn test_result_serialization_omits_absent_fields() {
        let failure = serde_json::to_value(ProcessingResult::failure("boom")).unwrap();
        assert_eq!(failure, serde_json::json!({"success": false, "error": "boom"}));

        let success =
            serde_json::to_value(ProcessingResult::success("data:x".into(), 4, 3)).unwrap();
        assert_eq!(
            success,
            serde_json::json!({"success": true, "image": "data:x", "width": 4, "height": 3})
        );
    }
}
