//! Per-tab form state and conversion into outgoing requests.

use std::path::PathBuf;

use crate::error::ConvertError;
use crate::history::RecentFormats;
use crate::models::{
    ConversionKind, FormatCatalog, IMAGE_FORMATS, ImageSettings, OptionTags,
    PendingConversionRequest,
};
use crate::utils::format_file_size;

/// Input characters accepted per single-line field
const MAX_LINE_INPUT: usize = 4096;
/// Text/base64 payload typed or pasted into the form
const MAX_BODY_INPUT: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    File,
    Text,
    Base64,
    Image,
    History,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::File, Tab::Text, Tab::Base64, Tab::Image, Tab::History];

    pub fn title(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Text => "Text",
            Self::Base64 => "Base64",
            Self::Image => "Image",
            Self::History => "History",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Conversion produced by this tab's form; `None` for History.
    pub fn kind(&self) -> Option<ConversionKind> {
        match self {
            Self::File => Some(ConversionKind::File),
            Self::Text => Some(ConversionKind::Text),
            Self::Base64 => Some(ConversionKind::Base64),
            Self::Image => Some(ConversionKind::Image),
            Self::History => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// File path, text body or base64 body depending on the tab
    Input,
    From,
    To,
    Options,
    Quality,
    Resize,
}

impl Field {
    pub fn is_picker(&self) -> bool {
        matches!(self, Self::From | Self::To)
    }
}

/// Cycles through format choices: recent ones first, then the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPicker {
    choices: Vec<String>,
    selected: usize,
}

impl FormatPicker {
    pub fn new(recent: &[String], catalog: &[String], preferred: &str) -> Self {
        let mut picker = Self { choices: merge_choices(recent, catalog), selected: 0 };
        if recent.is_empty() {
            picker.select(preferred);
        }
        picker
    }

    pub fn value(&self) -> &str {
        self.choices.get(self.selected).map(String::as_str).unwrap_or("")
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn cycle(&mut self, delta: isize) {
        if self.choices.is_empty() {
            return;
        }
        let len = self.choices.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }

    /// Select `value` when it is one of the choices.
    pub fn select(&mut self, value: &str) -> bool {
        match self.choices.iter().position(|c| c == value) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Rebuild the choice list, keeping the current value selected.
    pub fn refresh(&mut self, recent: &[String], catalog: &[String]) {
        let current = self.value().to_string();
        self.choices = merge_choices(recent, catalog);
        if !self.select(&current) {
            self.selected = 0;
        }
    }
}

fn merge_choices(recent: &[String], catalog: &[String]) -> Vec<String> {
    let mut choices: Vec<String> = Vec::with_capacity(recent.len() + catalog.len());
    for format in recent.iter().chain(catalog) {
        if !format.is_empty() && !choices.contains(format) {
            choices.push(format.clone());
        }
    }
    choices
}

/// Editable state of one conversion tab.
#[derive(Debug, Clone)]
pub struct ConversionForm {
    pub kind: ConversionKind,
    pub input: String,
    pub from: FormatPicker,
    pub to: FormatPicker,
    pub options: OptionTags,
    pub option_input: String,
    pub quality: String,
    pub resize: String,
    focus: usize,
}

const PATH_FIELDS: &[Field] = &[Field::Input, Field::From, Field::To, Field::Options];
const BODY_FIELDS: &[Field] = &[Field::Input, Field::From, Field::To, Field::Options];
const IMAGE_FIELDS: &[Field] = &[Field::Input, Field::To, Field::Quality, Field::Resize];

impl ConversionForm {
    pub fn new(kind: ConversionKind, catalog: &FormatCatalog, recent: &RecentFormats) -> Self {
        let (from, to) = match kind {
            ConversionKind::Image => {
                let images: Vec<String> = IMAGE_FORMATS.iter().map(|s| s.to_string()).collect();
                (FormatPicker::new(&[], &[], ""), FormatPicker::new(&[], &images, "png"))
            }
            _ => {
                let (from_default, to_default) = default_pair(kind);
                (
                    FormatPicker::new(&recent.from, &catalog.input_formats, from_default),
                    FormatPicker::new(&recent.to, &catalog.output_formats, to_default),
                )
            }
        };

        Self {
            kind,
            input: String::new(),
            from,
            to,
            options: OptionTags::new(),
            option_input: String::new(),
            quality: String::new(),
            resize: String::new(),
            focus: 0,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.kind {
            ConversionKind::File => PATH_FIELDS,
            ConversionKind::Text | ConversionKind::Base64 => BODY_FIELDS,
            ConversionKind::Image => IMAGE_FIELDS,
        }
    }

    pub fn focused(&self) -> Field {
        self.fields()[self.focus.min(self.fields().len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    /// Whether the main input takes multiple lines.
    pub fn has_body_input(&self) -> bool {
        matches!(self.kind, ConversionKind::Text | ConversionKind::Base64)
    }

    pub fn input_label(&self) -> &'static str {
        match self.kind {
            ConversionKind::File => "File path",
            ConversionKind::Image => "Image path",
            ConversionKind::Text => "Text",
            ConversionKind::Base64 => "Base64 content",
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let (buffer, limit) = match self.focused() {
            Field::Input if self.has_body_input() => (&mut self.input, MAX_BODY_INPUT),
            Field::Input => (&mut self.input, MAX_LINE_INPUT),
            Field::Options => (&mut self.option_input, MAX_LINE_INPUT),
            Field::Quality if c.is_ascii_digit() => (&mut self.quality, 3),
            Field::Resize => (&mut self.resize, 32),
            _ => return,
        };
        if buffer.len() < limit {
            buffer.push(c);
        }
    }

    pub fn newline(&mut self) {
        if self.focused() == Field::Input && self.has_body_input() {
            self.insert_char('\n');
        }
    }

    /// Delete one character. In the options field with nothing typed this
    /// drops the last tag instead.
    pub fn backspace(&mut self) {
        match self.focused() {
            Field::Input => {
                self.input.pop();
            }
            Field::Options => {
                if self.option_input.pop().is_none() {
                    self.options.pop();
                }
            }
            Field::Quality => {
                self.quality.pop();
            }
            Field::Resize => {
                self.resize.pop();
            }
            Field::From | Field::To => {}
        }
    }

    /// Turn the typed option into a tag. `Ok(false)` for a duplicate.
    pub fn commit_option(&mut self) -> Result<bool, ConvertError> {
        let added = self.options.add(&self.option_input)?;
        self.option_input.clear();
        Ok(added)
    }

    pub fn cycle_format(&mut self, delta: isize) {
        match self.focused() {
            Field::From => self.from.cycle(delta),
            Field::To => self.to.cycle(delta),
            _ => {}
        }
    }

    pub fn apply_catalog(&mut self, catalog: &FormatCatalog, recent: &RecentFormats) {
        if self.kind == ConversionKind::Image {
            return;
        }
        self.from.refresh(&recent.from, &catalog.input_formats);
        self.to.refresh(&recent.to, &catalog.output_formats);
    }

    pub fn input_path(&self) -> PathBuf {
        expand_home(self.input.trim())
    }

    /// `name (size)` for the chosen file when it exists.
    pub fn file_info(&self) -> Option<String> {
        if self.has_body_input() || self.input.trim().is_empty() {
            return None;
        }
        let path = self.input_path();
        let metadata = std::fs::metadata(&path).ok().filter(|m| m.is_file())?;
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(format!("{} ({})", name, format_file_size(metadata.len())))
    }

    /// Snapshot the form into a request. Validation of the request itself
    /// happens in the gateway.
    pub fn build_request(&self) -> Result<PendingConversionRequest, ConvertError> {
        let (from, to) = (self.from.value(), self.to.value());
        let request = match self.kind {
            ConversionKind::File => PendingConversionRequest::file(self.input_path(), from, to),
            ConversionKind::Text => PendingConversionRequest::text(&self.input, from, to),
            ConversionKind::Base64 => PendingConversionRequest::base64(&self.input, from, to),
            ConversionKind::Image => {
                let quality = match self.quality.trim() {
                    "" => None,
                    raw => Some(raw.parse::<u8>().map_err(|_| {
                        ConvertError::validation("Quality must be between 1 and 100")
                    })?),
                };
                let resize = Some(self.resize.trim().to_string()).filter(|r| !r.is_empty());
                return Ok(PendingConversionRequest::image(self.input_path(), to)
                    .with_options(self.options.clone())
                    .with_image_settings(ImageSettings { quality, resize }));
            }
        };
        Ok(request.with_options(self.options.clone()))
    }
}

fn default_pair(kind: ConversionKind) -> (&'static str, &'static str) {
    match kind {
        ConversionKind::File => ("docx", "pdf"),
        ConversionKind::Text => ("markdown", "html"),
        ConversionKind::Base64 => ("docx", "markdown"),
        ConversionKind::Image => ("", "png"),
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
