use serde::{Deserialize, Serialize};

/// Raw JSON body returned by the conversion endpoints.
///
/// Older server revisions used `download_url` and `content`; both are
/// accepted and folded into the primary names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, rename = "downloadUrl")]
    pub download_url: Option<String>,
    #[serde(default, rename = "download_url")]
    pub download_url_alias: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ConversionResponse {
    pub fn into_outcome(self) -> ConversionOutcome {
        ConversionOutcome {
            download_url: non_empty(self.download_url).or(non_empty(self.download_url_alias)),
            content: non_empty(self.result).or(non_empty(self.content)),
            base64: non_empty(self.base64),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Interpreted success response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub download_url: Option<String>,
    pub content: Option<String>,
    pub base64: Option<String>,
}

/// The payload to render first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryResult<'a> {
    Download(&'a str),
    Inline(&'a str),
    Nothing,
}

impl ConversionOutcome {
    pub fn primary(&self) -> PrimaryResult<'_> {
        if let Some(url) = self.download_url.as_deref() {
            PrimaryResult::Download(url)
        } else if let Some(content) = self.content.as_deref() {
            PrimaryResult::Inline(content)
        } else {
            PrimaryResult::Nothing
        }
    }
}

/// Supported format lists as served by `GET /api/formats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCatalog {
    pub input_formats: Vec<String>,
    pub output_formats: Vec<String>,
}

const BUILTIN_INPUT: &[&str] = &[
    "markdown", "commonmark", "gfm", "docx", "docbook", "html", "latex", "odt", "opml", "org",
    "rst", "mediawiki", "textile", "epub", "jats",
];

const BUILTIN_OUTPUT: &[&str] = &[
    "markdown", "commonmark", "gfm", "asciidoc", "docx", "docbook", "epub", "html", "html5",
    "json", "latex", "man", "odt", "opml", "org", "pdf", "plain", "pptx", "rst", "rtf",
    "texinfo", "textile",
];

/// Targets offered on the image tab.
pub const IMAGE_FORMATS: &[&str] = &["jpg", "png", "webp", "gif", "bmp"];

impl Default for FormatCatalog {
    /// Fallback used until the server catalog is fetched.
    fn default() -> Self {
        Self {
            input_formats: BUILTIN_INPUT.iter().map(|s| s.to_string()).collect(),
            output_formats: BUILTIN_OUTPUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}
