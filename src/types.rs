//! pages and the small value types shared by engine and viewer

use {
    serde::{Deserialize, Serialize},
    std::{fmt, sync::Arc},
};

/// rgba pixels of a page that was rasterised ahead of time
///
/// produced by a [`crate::loader::pdf::PdfBackend`], shared cheaply between
/// the page list and the render cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    /// width in pixels
    pub width: u32,
    /// height in pixels
    pub height: u32,
    /// `width * height * 4` bytes of rgba data
    pub pixels: Arc<[u8]>,
}

impl Canvas {
    /// wraps raw rgba bytes
    pub fn new(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// number of bytes held by the pixel buffer
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// decorative text shown on cover and placeholder pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoration {
    /// main line
    pub title: Option<String>,
    /// secondary line
    pub subtitle: Option<String>,
    /// byline
    pub author: Option<String>,
}

/// one normalized unit of displayable content
///
/// pages never change once built; the engine only ever swaps the whole list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// a remote or local image
    Image {
        /// url or path of the image
        src: String,
        /// accessible label
        alt: String,
    },
    /// a pre-rendered surface, used for pdf pages
    Canvas {
        /// the rendered pixels
        canvas: Canvas,
    },
    /// a raw markup fragment
    Html {
        /// the markup
        html: String,
    },
    /// front cover
    Cover(Decoration),
    /// stand-in for content that could not be produced
    Placeholder(Decoration),
}

impl Page {
    /// short name of the variant, matches the original `type` tag
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Canvas { .. } => "canvas",
            Self::Html { .. } => "html",
            Self::Cover(_) => "cover",
            Self::Placeholder(_) => "placeholder",
        }
    }

    /// placeholder used when a single page fails to render
    pub fn placeholder(page_num: usize) -> Self {
        Self::Placeholder(Decoration {
            title: Some(format!("Page {page_num}")),
            subtitle: None,
            author: None,
        })
    }
}

/// the kind of content handed to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// a pdf document
    Pdf,
    /// markup split into pages
    Html,
    /// an ordered list of image urls
    Images,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Images => "images",
        })
    }
}

/// progress information attached to every page change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageChange {
    /// 1-based page number
    pub current_page: usize,
    /// number of pages in the book
    pub total_pages: usize,
    /// `current / total` as a percentage, zero for an empty book
    pub progress: f64,
}

impl PageChange {
    /// builds the progress info for a 1-based page
    #[allow(clippy::cast_precision_loss)]
    pub fn new(current_page: usize, total_pages: usize) -> Self {
        let progress = if total_pages == 0 {
            0.0
        } else {
            (current_page as f64 / total_pages as f64) * 100.0
        };

        Self {
            current_page,
            total_pages,
            progress,
        }
    }

    /// true when there is nothing before this page
    pub const fn is_first(&self) -> bool {
        self.current_page <= 1
    }

    /// true when there is nothing after this page
    pub const fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

/// how the page stack is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// two-sided foldable pages stacked on top of each other
    Spread,
    /// exactly one visible page, used on narrow viewports
    Single,
}

impl LayoutMode {
    /// picks the layout for a viewport width
    pub const fn for_width(width: u32, breakpoint: u32) -> Self {
        if width <= breakpoint {
            Self::Single
        } else {
            Self::Spread
        }
    }
}

/// which way a page turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// forward, the page folds to the left
    Left,
    /// backward, a turned page folds back to the right
    Right,
}
