//! Customizer configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "canvas_size": 800.0, "asset_load_timeout_ms": 5000 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CustomizerError, CustomizerResult};

/// Tunables for sessions, captures and previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomizerConfig {
    /// Side length of the square design canvas.
    pub canvas_size: f32,
    /// Surface fill behind the product photo.
    pub surface_color: String,
    /// Artwork larger than this in either dimension is scaled down to fit.
    pub max_artwork_size: f32,
    /// Font size for newly added text.
    pub text_font_size: f32,
    /// Fill color for newly added text.
    pub text_fill: String,
    /// Resolution multiplier for job sheet captures.
    pub capture_multiplier: f32,
    /// Resolution multiplier for design record previews.
    pub preview_multiplier: f32,
    /// Encoding quality for design record previews (0.0 to 1.0).
    pub preview_quality: f32,
    /// Product name before the user sets one.
    pub default_product_name: String,
    /// Art print color before the user picks one.
    pub default_art_print_color: String,
    /// Font selected when a session starts.
    pub default_font: String,
    /// Fonts offered for text objects.
    pub fonts: Vec<String>,
    /// Swatches offered for text fill.
    pub text_colors: Vec<String>,
    /// Give up on an image load after this many milliseconds.
    pub asset_load_timeout_ms: Option<u64>,
}

impl Default for CustomizerConfig {
    fn default() -> Self {
        Self {
            canvas_size: 600.0,
            surface_color: "#f3f4f6".to_string(),
            max_artwork_size: 200.0,
            text_font_size: 40.0,
            text_fill: "#000000".to_string(),
            capture_multiplier: 2.0,
            preview_multiplier: 0.5,
            preview_quality: 0.8,
            default_product_name: "My Custom Product".to_string(),
            default_art_print_color: "#000000".to_string(),
            default_font: "Arial Black".to_string(),
            fonts: [
                "Arial Black",
                "Times New Roman",
                "Courier New",
                "Georgia",
                "Verdana",
                "Impact",
            ]
            .map(String::from)
            .to_vec(),
            text_colors: [
                "#000000", "#FFFFFF", "#EF4444", "#3B82F6", "#10B981", "#F59E0B", "#8B5CF6",
                "#EC4899",
            ]
            .map(String::from)
            .to_vec(),
            asset_load_timeout_ms: None,
        }
    }
}

impl CustomizerConfig {
    /// Load a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> CustomizerResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CustomizerError::InvalidState(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no session could work with.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizerError::InvalidState`] naming the offending field.
    pub fn validate(&self) -> CustomizerResult<()> {
        let positive = [
            ("canvas_size", self.canvas_size),
            ("max_artwork_size", self.max_artwork_size),
            ("text_font_size", self.text_font_size),
            ("capture_multiplier", self.capture_multiplier),
            ("preview_multiplier", self.preview_multiplier),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CustomizerError::InvalidState(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.preview_quality) {
            return Err(CustomizerError::InvalidState(format!(
                "preview_quality must be within 0.0..=1.0, got {}",
                self.preview_quality
            )));
        }
        Ok(())
    }

    /// Image load timeout, if configured.
    #[must_use]
    pub fn asset_load_timeout(&self) -> Option<Duration> {
        self.asset_load_timeout_ms.map(Duration::from_millis)
    }

    /// Whether a font is in the offered catalogue.
    #[must_use]
    pub fn offers_font(&self, font: &str) -> bool {
        self.fonts.iter().any(|f| f == font)
    }
}
