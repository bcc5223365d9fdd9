//! Display model for stored entries.
//!
//! [`EntryStore::render`](crate::EntryStore::render) turns every entry into an
//! [`EntryView`]; a [`DisplaySurface`] receives the complete list each time and
//! drops whatever it showed before.

use std::fmt::Write as _;

use crate::{Entry, EntryId, Money};

/// Width, in pixels, of receipt thumbnails.
pub const THUMBNAIL_WIDTH: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thumbnail {
    /// `data:` URI of the receipt.
    pub src: String,
    pub width: u32,
}

/// One rendered entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryView {
    pub id: EntryId,
    pub client: String,
    pub date: String,
    pub earned: Money,
    pub total: Money,
    pub image: Option<Thumbnail>,
}

impl EntryView {
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            client: entry.client.clone(),
            date: entry.date.clone(),
            earned: entry.earned(),
            total: entry.total,
            image: entry.image.as_ref().map(|src| Thumbnail {
                src: src.clone(),
                width: THUMBNAIL_WIDTH,
            }),
        }
    }

    /// `Paid: $<earned> / $<total>`
    pub fn paid_label(&self) -> String {
        format!("Paid: {} / {}", self.earned, self.total)
    }
}

/// Where rendered entries end up.
pub trait DisplaySurface {
    /// Replaces everything previously shown with `views`.
    fn replace(&mut self, views: &[EntryView]);
}

/// Renders entries as an HTML fragment.
#[derive(Debug, Clone, Default)]
pub struct HtmlSurface {
    html: String,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }
}

impl DisplaySurface for HtmlSurface {
    fn replace(&mut self, views: &[EntryView]) {
        let mut html = String::new();
        for view in views {
            let _ = write!(
                html,
                "<div class=\"entry\"><strong>{}</strong> ({})<br>{}",
                escape_html(&view.client),
                escape_html(&view.date),
                view.paid_label()
            );
            if let Some(image) = &view.image {
                let _ = write!(
                    html,
                    "<br><img src=\"{}\" width=\"{}\">",
                    escape_html(&image.src),
                    image.width
                );
            }
            html.push_str("</div>\n");
        }
        self.html = html;
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
