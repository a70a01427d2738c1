use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Which form produced a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    #[default]
    File,
    Text,
    Base64,
    Image,
}

impl ConversionKind {
    /// Value sent in the `conversion_type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Text => "text",
            Self::Base64 => "base64",
            Self::Image => "image",
        }
    }

    /// Display name stored in history for payloads without a file name.
    pub fn default_record_name(&self) -> &'static str {
        match self {
            Self::File => "File conversion",
            Self::Text => "Text conversion",
            Self::Base64 => "Base64 conversion",
            Self::Image => "Image conversion",
        }
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What gets converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    File(PathBuf),
    Text(String),
    Base64(String),
}

/// Insertion-ordered set of option tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTags(Vec<String>);

impl OptionTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Blank input is a validation error; duplicates are
    /// ignored and reported with `Ok(false)`.
    pub fn add(&mut self, tag: &str) -> Result<bool, ConvertError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ConvertError::validation("Please enter an option"));
        }
        if self.0.iter().any(|t| t == tag) {
            return Ok(false);
        }
        self.0.push(tag.to_string());
        Ok(true)
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Wire form. The server splits options on whitespace.
    pub fn to_wire(&self) -> Option<String> {
        if self.0.is_empty() { None } else { Some(self.0.join(" ")) }
    }
}

impl<S: AsRef<str>> FromIterator<S> for OptionTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = OptionTags::new();
        for tag in iter {
            // Blank tags are dropped silently when collecting.
            let _ = tags.add(tag.as_ref());
        }
        tags
    }
}

/// Extra knobs for the image endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSettings {
    pub quality: Option<u8>,
    pub resize: Option<String>,
}

/// A conversion built from form state, sent once and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConversionRequest {
    pub kind: ConversionKind,
    pub from_format: String,
    pub to_format: String,
    pub payload: Payload,
    pub options: OptionTags,
    pub image: ImageSettings,
}

impl PendingConversionRequest {
    pub fn file(path: impl Into<PathBuf>, from: &str, to: &str) -> Self {
        Self::new(ConversionKind::File, from, to, Payload::File(path.into()))
    }

    pub fn text(text: impl Into<String>, from: &str, to: &str) -> Self {
        Self::new(ConversionKind::Text, from, to, Payload::Text(text.into()))
    }

    pub fn base64(data: impl Into<String>, from: &str, to: &str) -> Self {
        Self::new(ConversionKind::Base64, from, to, Payload::Base64(data.into()))
    }

    /// Image conversions only need a target; the source format is taken
    /// from the file extension.
    pub fn image(path: impl Into<PathBuf>, to: &str) -> Self {
        let path = path.into();
        let from = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "image".to_string());
        Self::new(ConversionKind::Image, &from, to, Payload::File(path))
    }

    fn new(kind: ConversionKind, from: &str, to: &str, payload: Payload) -> Self {
        Self {
            kind,
            from_format: from.trim().to_string(),
            to_format: to.trim().to_string(),
            payload,
            options: OptionTags::new(),
            image: ImageSettings::default(),
        }
    }

    pub fn with_options(mut self, options: OptionTags) -> Self {
        self.options = options;
        self
    }

    pub fn with_image_settings(mut self, image: ImageSettings) -> Self {
        self.image = image;
        self
    }

    /// Check the request locally. Nothing is sent when this fails.
    pub fn validate(&self) -> Result<(), ConvertError> {
        match (&self.kind, &self.payload) {
            (ConversionKind::File, Payload::File(path)) => {
                if path.as_os_str().is_empty() {
                    return Err(ConvertError::validation("Please select a file"));
                }
            }
            (ConversionKind::Image, Payload::File(path)) => {
                if path.as_os_str().is_empty() {
                    return Err(ConvertError::validation("Please select an image"));
                }
                if self.to_format.is_empty() {
                    return Err(ConvertError::validation("Please select an output format"));
                }
                if let Some(quality) = self.image.quality
                    && !(1..=100).contains(&quality)
                {
                    return Err(ConvertError::validation("Quality must be between 1 and 100"));
                }
                return Ok(());
            }
            (ConversionKind::Text, Payload::Text(text)) => {
                if text.trim().is_empty() {
                    return Err(ConvertError::validation("Please enter text to convert"));
                }
            }
            (ConversionKind::Base64, Payload::Base64(data)) => {
                if data.trim().is_empty() {
                    return Err(ConvertError::validation(
                        "Please enter base64 content to convert",
                    ));
                }
            }
            (kind, _) => {
                return Err(ConvertError::validation(format!(
                    "Payload does not match a {} conversion",
                    kind
                )));
            }
        }

        if self.from_format.is_empty() || self.to_format.is_empty() {
            return Err(ConvertError::validation("Please select both from and to formats"));
        }
        Ok(())
    }

    /// Name recorded in history for this request.
    pub fn display_name(&self) -> String {
        match &self.payload {
            Payload::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.kind.default_record_name().to_string()),
            _ => self.kind.default_record_name().to_string(),
        }
    }
}
