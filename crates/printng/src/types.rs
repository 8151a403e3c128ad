use crate::constants;
use crate::http::HttpResponse;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrintError {
    #[error("Failed to load print templates: {0}")]
    TemplateLoad(String),
    #[error("Print request failed: {message}")]
    PrintTransport {
        message: String,
        response: Option<HttpResponse>,
    },
    #[error("Print service response has no `getURL` field: {body}")]
    MalformedResponse { status: u16, body: String },
    #[error("No print template selected")]
    NoActiveTemplate,
    #[error("Unknown paper size: {0}")]
    UnknownPaperSize(String),
    #[error("Snapshot failed: {0}")]
    Snapshot(String),
    #[error("No printed document to deliver")]
    NoDocument,
    #[error("Document delivery failed: {0}")]
    Delivery(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrintError>;

/// Length units accepted for page dimensions and margins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Mm,
    Cm,
    In,
    Pt,
    Pc,
    Px,
}

impl Units {
    pub const ALL: [Units; 6] = [
        Units::Mm,
        Units::Cm,
        Units::In,
        Units::Pt,
        Units::Pc,
        Units::Px,
    ];

    /// CSS suffix for this unit
    pub fn suffix(self) -> &'static str {
        match self {
            Units::Mm => "mm",
            Units::Cm => "cm",
            Units::In => "in",
            Units::Pt => "pt",
            Units::Pc => "pc",
            Units::Px => "px",
        }
    }

    pub fn inches_per_unit(self) -> f64 {
        constants::inches_per_unit(self)
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|units| units.suffix().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

impl Orientation {
    /// Orient a `[width, height]` pair given in portrait order
    pub fn apply(self, size: [f64; 2]) -> [f64; 2] {
        match self {
            Orientation::Portrait => size,
            Orientation::Landscape => [size[1], size[0]],
        }
    }
}

/// Page size: either a CSS named size (`A4`, `letter`, `auto`, ...) or a
/// `[width, height]` pair measured in the page units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageSize {
    Named(String),
    Dimensions([f64; 2]),
}

impl PageSize {
    pub fn named(name: impl Into<String>) -> Self {
        PageSize::Named(name.into())
    }

    pub fn dimensions(width: f64, height: f64) -> Self {
        PageSize::Dimensions([width, height])
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Named(constants::DEFAULT_PAGE_SIZE.to_string())
    }
}

/// A single margin value: a number in page units or a verbatim CSS token
/// that already carries its unit (`3mm`, `auto`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Margin {
    Length(f64),
    Keyword(String),
}

impl From<f64> for Margin {
    fn from(value: f64) -> Self {
        Margin::Length(value)
    }
}

impl From<&str> for Margin {
    fn from(value: &str) -> Self {
        Margin::Keyword(value.to_string())
    }
}

/// Page margins as a list of values or a verbatim margin string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageMargins {
    List(Vec<Margin>),
    Text(String),
}

impl PageMargins {
    pub fn list<I, M>(values: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Margin>,
    {
        PageMargins::List(values.into_iter().map(Into::into).collect())
    }
}

/// Template identifier. The template service may send ids as JSON strings
/// or numbers; both are kept as their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for TemplateId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => TemplateId(text),
            RawId::Integer(number) => TemplateId(number.to_string()),
            RawId::Float(number) => TemplateId(number.to_string()),
        })
    }
}

/// A print template as published by the template service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub contents: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Named paper size with its natural (portrait) dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperPreset {
    pub name: String,
    pub size: [f64; 2],
    #[serde(default)]
    pub units: Units,
}

impl PaperPreset {
    pub fn new(name: impl Into<String>, size: [f64; 2], units: Units) -> Self {
        Self {
            name: name.into(),
            size,
            units,
        }
    }

    /// The built-in paper sizes
    pub fn defaults() -> Vec<PaperPreset> {
        constants::PAPER_SIZES
            .iter()
            .map(|&(name, size, units)| Self::new(name, size, units))
            .collect()
    }

    /// Find a preset in `presets` by name, ignoring case
    pub fn find<'a>(presets: &'a [PaperPreset], name: &str) -> Option<&'a PaperPreset> {
        presets
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(name))
    }

    /// Dimensions with orientation applied
    pub fn dimensions_with_orientation(&self, orientation: Orientation) -> [f64; 2] {
        orientation.apply(self.size)
    }
}
