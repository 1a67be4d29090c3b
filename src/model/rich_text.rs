//! Annotated text spans as delivered by the content API.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Semantic color name attached to spans and blocks.
///
/// Unknown names collapse to [`Color::Default`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
    GrayBackground,
    BrownBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
    RedBackground,
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

impl Color {
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            Color::GrayBackground
                | Color::BrownBackground
                | Color::OrangeBackground
                | Color::YellowBackground
                | Color::GreenBackground
                | Color::BlueBackground
                | Color::PurpleBackground
                | Color::PinkBackground
                | Color::RedBackground
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

/// One run of text with independent annotations and an optional link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRichText")]
pub struct RichText {
    pub plain_text: String,
    pub annotations: Annotations,
    pub href: Option<String>,
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_link(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Concatenate the plain text of a span sequence.
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(|span| span.plain_text.as_str()).collect()
}

#[derive(Deserialize)]
struct RawRichText {
    #[serde(default)]
    plain_text: Option<String>,
    #[serde(default)]
    annotations: Annotations,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    text: Option<RawTextContent>,
    #[serde(default)]
    equation: Option<RawEquation>,
}

#[derive(Deserialize)]
struct RawTextContent {
    #[serde(default)]
    content: String,
    #[serde(default)]
    link: Option<RawLink>,
}

#[derive(Deserialize)]
struct RawLink {
    url: String,
}

#[derive(Deserialize)]
struct RawEquation {
    expression: String,
}

impl From<RawRichText> for RichText {
    fn from(raw: RawRichText) -> Self {
        let link = raw
            .text
            .as_ref()
            .and_then(|t| t.link.as_ref())
            .map(|l| l.url.clone());
        let plain_text = raw
            .plain_text
            .or_else(|| raw.text.map(|t| t.content))
            .or_else(|| raw.equation.map(|e| e.expression))
            .unwrap_or_default();
        let href = raw.href.or(link).filter(|h| !h.is_empty());

        Self {
            plain_text,
            annotations: raw.annotations,
            href,
        }
    }
}
