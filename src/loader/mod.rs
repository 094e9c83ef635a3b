//! turning heterogeneous input into a page list
//!
//! sources are typed at the boundary ([`Source`]); [`Source::infer`] exists
//! for callers that only have a string or a list and want the old
//! extension-sniffing behaviour.

pub mod fetch;
pub mod html;
pub mod images;
pub mod pdf;

use {
    crate::{FlipbookError, Result, types::ContentType},
    std::path::PathBuf,
};

/// where a pdf comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfSource {
    /// remote document
    Url(String),
    /// local file
    Path(PathBuf),
    /// `data:application/pdf;base64,...`
    DataUri(String),
    /// bytes already in memory
    Bytes(Vec<u8>),
}

/// where markup comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlSource {
    /// the markup itself
    Markup(String),
    /// remote document
    Url(String),
    /// local file
    Path(PathBuf),
}

/// an ordered list of image locations, one per page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageArraySource {
    /// urls or paths
    pub urls: Vec<String>,
}

/// validated content handed to the viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// a pdf document
    Pdf(PdfSource),
    /// markup split into pages
    Html(HtmlSource),
    /// one image per page
    Images(ImageArraySource),
}

/// untyped input as a host would pass it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSource {
    /// url, path, data uri or inline markup
    Text(String),
    /// list of image urls
    List(Vec<String>),
}

impl Source {
    /// the content type this source loads as
    pub const fn content_type(&self) -> ContentType {
        match self {
            Self::Pdf(_) => ContentType::Pdf,
            Self::Html(_) => ContentType::Html,
            Self::Images(_) => ContentType::Images,
        }
    }

    /// builds a typed source, detecting the type when none is given
    ///
    /// # Errors
    ///
    /// an empty source, a non-list for images, or a list for pdf/html
    pub fn infer(raw: RawSource, content_type: Option<ContentType>) -> Result<Self> {
        if is_empty(&raw) {
            return Err(FlipbookError::MissingSource);
        }

        let content_type = content_type.unwrap_or_else(|| detect_type(&raw));

        match (content_type, raw) {
            (ContentType::Images, RawSource::List(urls)) => {
                Ok(Self::Images(ImageArraySource { urls }))
            }
            (ContentType::Images, RawSource::Text(_)) => {
                log::error!("type=images needs a list of image urls");
                Err(FlipbookError::ImagesRequireList)
            }
            (ContentType::Pdf, RawSource::Text(text)) => Ok(Self::Pdf(pdf_source(text))),
            (ContentType::Html, RawSource::Text(text)) => Ok(Self::Html(html_source(text))),
            (other, RawSource::List(_)) => Err(FlipbookError::UnsupportedSource(other.to_string())),
        }
    }
}

fn is_empty(raw: &RawSource) -> bool {
    match raw {
        RawSource::Text(text) => text.trim().is_empty(),
        RawSource::List(list) => list.is_empty(),
    }
}

fn is_remote(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

fn pdf_source(text: String) -> PdfSource {
    if text.starts_with("data:") {
        PdfSource::DataUri(text)
    } else if is_remote(&text) {
        PdfSource::Url(text)
    } else {
        PdfSource::Path(PathBuf::from(text))
    }
}

fn html_source(text: String) -> HtmlSource {
    if text.trim_start().starts_with('<') {
        HtmlSource::Markup(text)
    } else if is_remote(&text) {
        HtmlSource::Url(text)
    } else {
        HtmlSource::Path(PathBuf::from(text))
    }
}

/// guesses the content type from the shape of the source
///
/// `.pdf` or an embedded pdf data uri means pdf, markup or `.html` means
/// html, a list means images, anything else is treated as pdf
pub fn detect_type(raw: &RawSource) -> ContentType {
    match raw {
        RawSource::List(_) => ContentType::Images,
        RawSource::Text(text) => {
            let lower = text.to_ascii_lowercase();
            if lower.ends_with(".pdf") || lower.contains("data:application/pdf") {
                ContentType::Pdf
            } else if lower.ends_with(".html") || text.starts_with('<') {
                ContentType::Html
            } else {
                ContentType::Pdf
            }
        }
    }
}
