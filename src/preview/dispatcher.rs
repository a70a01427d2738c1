use std::fmt;

/// How a file is shown in the preview pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewCategory {
    Image,
    Pdf,
    Text,
    Unsupported,
}

impl PreviewCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Unsupported => "unsupported",
        }
    }

    /// Categories a stored download reference can be embedded as.
    pub fn is_embeddable(&self) -> bool {
        matches!(self, Self::Image | Self::Pdf)
    }
}

impl fmt::Display for PreviewCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "html", "htm", "csv", "xml", "json"];

/// Pick a preview strategy from a file name and optional MIME type.
///
/// MIME is consulted first. An unrecognised MIME falls back to the file
/// extension, and a name without an extension is [`PreviewCategory::Unsupported`].
///
/// # Examples
///
/// ```
/// use convert_desk::preview::{PreviewCategory, classify};
///
/// assert_eq!(classify("report.pdf", None), PreviewCategory::Pdf);
/// assert_eq!(classify("notes", None), PreviewCategory::Unsupported);
/// assert_eq!(classify("upload.bin", Some("image/png")), PreviewCategory::Image);
/// ```
pub fn classify(name: &str, mime: Option<&str>) -> PreviewCategory {
    if let Some(category) = mime.and_then(classify_mime) {
        return category;
    }
    extension_of(name).map(|ext| classify_extension(&ext)).unwrap_or(PreviewCategory::Unsupported)
}

/// Lowercased extension of the last path segment, ignoring query strings
/// and fragments so download URLs classify like file names.
pub fn extension_of(name: &str) -> Option<String> {
    let without_suffix = name.split(['?', '#']).next().unwrap_or(name);
    let file_name = without_suffix.rsplit(['/', '\\']).next().unwrap_or(without_suffix);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn classify_extension(ext: &str) -> PreviewCategory {
    if IMAGE_EXTENSIONS.contains(&ext) {
        PreviewCategory::Image
    } else if ext == "pdf" {
        PreviewCategory::Pdf
    } else if TEXT_EXTENSIONS.contains(&ext) {
        PreviewCategory::Text
    } else {
        PreviewCategory::Unsupported
    }
}

fn classify_mime(mime: &str) -> Option<PreviewCategory> {
    // Drop parameters such as "; charset=utf-8"
    let essence = mime.split(';').next()?.trim().to_ascii_lowercase();
    let (kind, subtype) = essence.split_once('/')?;

    match (kind, subtype) {
        ("image", "jpeg" | "jpg" | "png" | "gif" | "bmp" | "svg+xml" | "webp") => {
            Some(PreviewCategory::Image)
        }
        ("application", "pdf") => Some(PreviewCategory::Pdf),
        ("text", "plain" | "markdown" | "x-markdown" | "html" | "csv" | "xml")
        | ("application", "json" | "xml") => Some(PreviewCategory::Text),
        _ => None,
    }
}

/// MIME type sent with an uploaded part, derived from the extension.
pub fn mime_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("json") => "application/json",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("odt") => "application/vnd.oasis.opendocument.text",
        Some("epub") => "application/epub+zip",
        _ => "application/octet-stream",
    }
}
