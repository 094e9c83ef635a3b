use {
    arboard::{Clipboard, ImageData},
    flipbook::{
        FlipbookError, Result,
        loader::{
            fetch::{Fetcher, HttpFetcher},
            pdf::{ExportFormat, decode_data_uri, encode_canvas},
        },
        types::{Canvas, Decoration, Page},
    },
    hashbrown::HashMap,
    image::{DynamicImage, RgbaImage},
    indicatif::{ProgressBar, ProgressStyle},
    rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    scraper::Html,
    std::{
        fs,
        path::{Path, PathBuf},
        sync::Arc,
    },
};

/// a page turned into something a terminal can show
#[derive(Debug, Clone)]
pub enum PageView {
    /// drawn through ratatui-image
    Picture(DynamicImage),
    /// drawn as a paragraph
    Text(String),
}

/// decodes pages on demand and keeps the results
pub struct PageRenderer {
    fetcher: HttpFetcher,
    cache: HashMap<usize, Arc<PageView>>,
}

impl PageRenderer {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            cache: HashMap::new(),
        }
    }

    /// the view for the zero-based page `index`, decoded once
    pub fn view(&mut self, index: usize, page: &Page) -> Arc<PageView> {
        let fetcher = &self.fetcher;
        self.cache
            .entry(index)
            .or_insert_with(|| Arc::new(decode_or_explain(index, page, fetcher)))
            .clone()
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// decodes every page up front, in parallel
    pub fn prerender(&mut self, pages: &[Page]) -> Result<()> {
        let pb = ProgressBar::new(pages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
                .map_err(|e| FlipbookError::Other(e.to_string()))?
                .progress_chars("#>-"),
        );
        pb.set_message("Decoding pages...");

        let fetcher = &self.fetcher;
        let pb_clone = pb.clone();
        let views: Vec<(usize, PageView)> = pages
            .par_iter()
            .enumerate()
            .map(|(index, page)| {
                let view = decode_or_explain(index, page, fetcher);
                pb_clone.inc(1);
                (index, view)
            })
            .collect();

        pb.finish_with_message("Pages decoded");

        self.cache
            .extend(views.into_iter().map(|(index, view)| (index, Arc::new(view))));

        Ok(())
    }
}

fn decode_or_explain(index: usize, page: &Page, fetcher: &HttpFetcher) -> PageView {
    decode(page, fetcher).unwrap_or_else(|e| {
        log::warn!("could not decode page {}: {e}", index.saturating_add(1));
        PageView::Text(format!(
            "Page {} could not be displayed.\n\n{e}",
            index.saturating_add(1)
        ))
    })
}

/// turns one page into a terminal view
pub fn decode(page: &Page, fetcher: &dyn Fetcher) -> Result<PageView> {
    match page {
        Page::Image { src, .. } => {
            let bytes = read_image_bytes(src, fetcher)?;
            let img = image::load_from_memory(&bytes)
                .map_err(|e| FlipbookError::Other(format!("failed to decode {src}: {e}")))?;
            Ok(PageView::Picture(img))
        }
        Page::Canvas { canvas } => canvas_image(canvas).map(PageView::Picture),
        Page::Html { html } => Ok(PageView::Text(html_text(html))),
        Page::Cover(deco) | Page::Placeholder(deco) => Ok(PageView::Text(decoration_text(deco))),
    }
}

fn read_image_bytes(src: &str, fetcher: &dyn Fetcher) -> Result<Vec<u8>> {
    if src.starts_with("data:") {
        decode_data_uri(src)
    } else if src.starts_with("http://") || src.starts_with("https://") {
        fetcher.fetch_bytes(src)
    } else {
        Ok(fs::read(src)?)
    }
}

fn canvas_image(canvas: &Canvas) -> Result<DynamicImage> {
    RgbaImage::from_raw(canvas.width, canvas.height, canvas.pixels.to_vec())
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| {
            FlipbookError::Other(format!(
                "canvas of {}x{} has {} bytes",
                canvas.width,
                canvas.height,
                canvas.byte_len()
            ))
        })
}

/// visible text of a markup fragment, one text run per line
pub fn html_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    fragment
        .root_element()
        .text()
        .map(|run| run.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decoration_text(deco: &Decoration) -> String {
    [&deco.title, &deco.subtitle, &deco.author]
        .into_iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// puts the page on the system clipboard, pictures as images and the rest as
/// text
pub fn copy_to_clipboard(view: &PageView) -> Result<()> {
    let mut clipboard = Clipboard::new().map_err(|e| FlipbookError::Other(e.to_string()))?;

    let copied = match view {
        PageView::Picture(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let img_data = ImageData {
                width: width as usize,
                height: height as usize,
                bytes: rgba.into_raw().into(),
            };
            clipboard.set_image(img_data)
        }
        PageView::Text(text) => clipboard.set_text(text.clone()),
    };

    copied.map_err(|e| FlipbookError::Other(format!("failed to copy page: {e}")))
}

/// file name, without extension, for page `page_num` of `title`
pub fn export_stem(title: &str, page_num: usize) -> String {
    let slug = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        format!("page-{page_num}")
    } else {
        format!("{slug}-page-{page_num}")
    }
}

/// writes the page into `dir`, pictures as png and everything else as text
pub fn export_view(view: &PageView, dir: &Path, stem: &str) -> Result<PathBuf> {
    match view {
        PageView::Picture(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let canvas = Canvas::new(width, height, rgba.into_raw());
            let format = ExportFormat::Png;
            let path = dir.join(format!("{stem}.{}", format.extension()));
            fs::write(&path, encode_canvas(&canvas, format)?)?;
            Ok(path)
        }
        PageView::Text(text) => {
            let path = dir.join(format!("{stem}.txt"));
            fs::write(&path, text)?;
            Ok(path)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {
        super::*,
        assert2::check as assert,
        flipbook::loader::fetch::OfflineFetcher,
    };

    #[test]
    fn test_html_text_keeps_runs_and_drops_markup() {
        let text = html_text("<h1>Intro</h1>\n<p>first   line</p><p>second</p>");
        assert!(text == "Intro\nfirst line\nsecond");
    }

    #[test]
    fn test_canvas_becomes_picture() {
        let canvas = Canvas::new(2, 1, vec![255u8; 8]);
        let view = decode(&Page::Canvas { canvas }, &OfflineFetcher).unwrap();
        match view {
            PageView::Picture(img) => {
                assert!(img.width() == 2 && img.height() == 1);
            }
            PageView::Text(_) => unreachable!(),
        }
    }

    #[test]
    fn test_short_canvas_is_rejected() {
        let canvas = Canvas::new(4, 4, vec![0u8; 3]);
        assert!(decode(&Page::Canvas { canvas }, &OfflineFetcher).is_err());
    }

    #[test]
    fn test_placeholder_shows_its_label() {
        let view = decode(&Page::placeholder(3), &OfflineFetcher).unwrap();
        match view {
            PageView::Text(text) => {
                assert!(text == "Page 3");
            }
            PageView::Picture(_) => unreachable!(),
        }
    }

    #[test]
    fn test_image_file_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let page = Page::Image {
            src: path.to_string_lossy().into_owned(),
            alt: "Page 1".to_string(),
        };
        match decode(&page, &OfflineFetcher).unwrap() {
            PageView::Picture(img) => {
                assert!(img.width() == 3);
            }
            PageView::Text(_) => unreachable!(),
        }
    }

    #[test]
    fn test_remote_image_goes_through_fetcher() {
        let page = Page::Image {
            src: "https://example.com/p1.png".to_string(),
            alt: "Page 1".to_string(),
        };
        let err = decode(&page, &OfflineFetcher).unwrap_err();
        assert!(matches!(err, FlipbookError::Fetch(_)));
    }

    #[test]
    fn test_export_stem_slugs_title() {
        assert!(export_stem("My Guide: Vol. 2", 3) == "my-guide-vol-2-page-3");
        assert!(export_stem("  ", 1) == "page-1");
    }

    #[test]
    fn test_export_view_writes_png_or_text() {
        let dir = tempfile::tempdir().unwrap();

        let picture = PageView::Picture(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            3,
            image::Rgba([1, 2, 3, 255]),
        )));
        let path = export_view(&picture, dir.path(), "guide-page-1").unwrap();
        assert!(path.extension().and_then(|e| e.to_str()) == Some("png"));
        let saved = image::open(&path).unwrap();
        assert!(saved.width() == 2 && saved.height() == 3);

        let text = PageView::Text("Intro".to_string());
        let path = export_view(&text, dir.path(), "guide-page-2").unwrap();
        assert!(fs::read_to_string(path).unwrap() == "Intro");
    }

    #[test]
    fn test_failed_page_is_explained_and_cached() {
        let mut renderer = PageRenderer::new(HttpFetcher::new().unwrap());
        let page = Page::Image {
            src: "/definitely/not/here.png".to_string(),
            alt: "Page 1".to_string(),
        };
        let view = renderer.view(0, &page);
        assert!(matches!(view.as_ref(), PageView::Text(t) if t.starts_with("Page 1 could not")));
        renderer.view(0, &page);
        assert!(renderer.cached() == 1);
    }
}
