//! what the viewer tells its embedding host

use {
    crate::{Result, chrome::ElementId, types::PageChange},
    serde::{Deserialize, Serialize},
    std::{cell::RefCell, io::Write},
};

/// `type` of the message posted to the embedding page
pub const PAGE_CHANGE_MESSAGE: &str = "elevare-ebook-page-change";

/// page change notification for an embedding page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChangeMessage {
    /// always [`PAGE_CHANGE_MESSAGE`]
    #[serde(rename = "type")]
    pub kind: String,
    /// 1-based page
    pub current_page: usize,
    /// pages in the book
    pub total_pages: usize,
    /// percentage read
    pub progress: f64,
}

impl From<&PageChange> for PageChangeMessage {
    fn from(change: &PageChange) -> Self {
        Self {
            kind: PAGE_CHANGE_MESSAGE.to_string(),
            current_page: change.current_page,
            total_pages: change.total_pages,
            progress: change.progress,
        }
    }
}

/// the embedding page, present only when the viewer runs inside another one
pub trait MessageSink {
    /// delivers a serialized message to `target_origin`
    fn post_message(&self, message: &str, target_origin: &str) -> Result<()>;
}

/// writes each message as one json line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: RefCell<W>,
}

impl<W: Write> JsonLinesSink<W> {
    /// wraps a writer, one message per line
    pub const fn new(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
        }
    }

    /// gives the writer back
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> MessageSink for JsonLinesSink<W> {
    fn post_message(&self, message: &str, _target_origin: &str) -> Result<()> {
        let mut writer = self.writer.borrow_mut();
        writeln!(writer, "{message}")?;
        writer.flush()?;
        Ok(())
    }
}

/// native fullscreen of the host
///
/// entering or leaving is asynchronous; the host reports the outcome through
/// [`crate::viewer::EbookViewer::on_fullscreen_change`]
pub trait Fullscreen {
    /// asks for `element` to go fullscreen
    fn request(&mut self, element: ElementId) -> Result<()>;

    /// asks to leave fullscreen
    fn exit(&mut self) -> Result<()>;

    /// whether something is fullscreen right now
    fn is_active(&self) -> bool;
}
