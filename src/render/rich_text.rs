//! Rich-text fragment formatter.
//!
//! Produces exactly one [`Inline`] per input span, in order. Code spans
//! become monospace fragments; linked spans are wrapped in a link fragment
//! around whatever the span would otherwise have produced.

use crate::model::{Color, RichText};

/// Style attributes carried over from a span's annotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text { text: String, style: InlineStyle },
    Code { text: String, style: InlineStyle },
    Link { href: String, inner: Box<Inline> },
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Text { text, .. } | Inline::Code { text, .. } => text,
            Inline::Link { inner, .. } => inner.text(),
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Inline::Link { href, .. } => Some(href),
            _ => None,
        }
    }
}

pub fn format_rich_text(spans: &[RichText]) -> Vec<Inline> {
    spans.iter().map(format_span).collect()
}

fn format_span(span: &RichText) -> Inline {
    let annotations = &span.annotations;
    let style = InlineStyle {
        bold: annotations.bold,
        italic: annotations.italic,
        underline: annotations.underline,
        strikethrough: annotations.strikethrough,
        color: annotations.color,
    };

    let fragment = if annotations.code {
        Inline::Code {
            text: span.plain_text.clone(),
            style,
        }
    } else {
        Inline::Text {
            text: span.plain_text.clone(),
            style,
        }
    };

    match &span.href {
        Some(href) => Inline::Link {
            href: href.clone(),
            inner: Box::new(fragment),
        },
        None => fragment,
    }
}

/// Text of a formatted sequence, ignoring styling.
pub fn inline_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Annotations;

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(format_rich_text(&[]).is_empty());
    }

    #[test]
    fn test_order_and_length_preserved() {
        let spans = vec![
            RichText::plain("one "),
            RichText::plain("two ").with_link("https://two.example"),
            RichText::plain("three"),
        ];
        let inlines = format_rich_text(&spans);
        assert_eq!(inlines.len(), 3);
        assert_eq!(inline_text(&inlines), "one two three");
        assert_eq!(inlines[1].href(), Some("https://two.example"));
        assert_eq!(inlines[0].href(), None);
    }

    #[test]
    fn test_bold_code_link_combine() {
        let span = RichText::plain("cargo")
            .with_annotations(Annotations {
                bold: true,
                code: true,
                color: Color::Blue,
                ..Default::default()
            })
            .with_link("https://doc.rust-lang.org/cargo");

        let inlines = format_rich_text(&[span]);
        match &inlines[0] {
            Inline::Link { href, inner } => {
                assert_eq!(href, "https://doc.rust-lang.org/cargo");
                match inner.as_ref() {
                    Inline::Code { text, style } => {
                        assert_eq!(text, "cargo");
                        assert!(style.bold);
                        assert_eq!(style.color, Color::Blue);
                    }
                    other => panic!("expected code fragment, got {:?}", other),
                }
            }
            other => panic!("expected link, got {:?}", other),
        }
    }

    #[test]
    fn test_annotations_map_to_style() {
        let span = RichText::plain("gone").with_annotations(Annotations {
            italic: true,
            strikethrough: true,
            underline: true,
            ..Default::default()
        });
        let Inline::Text { style, .. } = &format_rich_text(&[span])[0] else {
            panic!("expected text fragment");
        };
        assert!(style.italic && style.strikethrough && style.underline);
        assert!(!style.bold);
    }
}
