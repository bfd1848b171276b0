//! Styled text runs and style signatures.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Font size assumed when a run carries no size information.
pub const DEFAULT_FONT_SIZE: f64 = 10.5;

/// Weight added to the signature of bold runs.
const BOLD_WEIGHT: f64 = 1000.0;

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

/// A paragraph-level run of text with its dominant style.
///
/// Produced by an upstream text extractor and never mutated afterwards.
/// `original_order` is the only source of document sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledRun {
    /// The text content
    pub text: String,

    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Whether the run is bold
    #[serde(default)]
    pub bold: bool,

    /// Page or position index reported by the extractor
    #[serde(default)]
    pub position: u32,

    /// Position of the run in the document stream
    pub original_order: u32,
}

impl StyledRun {
    /// Create a new run.
    pub fn new(text: impl Into<String>, font_size: f64, bold: bool, original_order: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
            bold,
            position: 0,
            original_order,
        }
    }

    /// Create a run from possibly missing style metadata.
    pub fn from_style(
        text: impl Into<String>,
        font_size: Option<f64>,
        bold: Option<bool>,
        original_order: u32,
    ) -> Self {
        Self::new(
            text,
            font_size.unwrap_or(DEFAULT_FONT_SIZE),
            bold.unwrap_or(false),
            original_order,
        )
    }

    /// Set the page/position index.
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    /// Font size with unusable values replaced by the default.
    pub fn effective_font_size(&self) -> f64 {
        if self.font_size.is_finite() && self.font_size > 0.0 {
            self.font_size
        } else {
            DEFAULT_FONT_SIZE
        }
    }

    /// Style signature of this run.
    pub fn signature(&self) -> StyleSignature {
        StyleSignature::of(self.effective_font_size(), self.bold)
    }

    /// Check if the run has no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Scalar style key: `(bold ? 1000 : 0) + font_size`.
///
/// Larger means more prominent. Two runs share a signature iff the scalar
/// is identical, so a bold 9pt run and a plain 1009pt run collide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSignature(f64);

impl StyleSignature {
    /// Compute the signature for a size/emphasis pair.
    pub fn of(font_size: f64, bold: bool) -> Self {
        let weight = if bold { BOLD_WEIGHT } else { 0.0 };
        Self(weight + font_size)
    }

    /// The raw scalar value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialEq for StyleSignature {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StyleSignature {}

impl PartialOrd for StyleSignature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StyleSignature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for StyleSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
