//! pdf pipeline on top of a pluggable rasteriser
//!
//! the crate does not ship a pdf engine. a [`PdfBackend`] turns bytes into
//! pixels; [`PdfRenderer`] owns the scale fitting, the page cache and the
//! per-page fallback so every backend behaves the same.

use {
    super::{PdfSource, fetch::Fetcher},
    crate::{
        FlipbookError, Result,
        config::PdfConfig,
        types::{Canvas, Page},
    },
    base64::{Engine as _, engine::general_purpose::STANDARD},
    hashbrown::HashMap,
    image::{DynamicImage, ImageFormat, RgbaImage, codecs::jpeg::JpegEncoder},
    serde::{Deserialize, Serialize},
    std::{fs, io::Cursor},
};

/// what a backend reports after opening a document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentInfo {
    /// number of pages
    pub page_count: usize,
    /// stable identifier of the document, when the backend knows one
    pub fingerprint: Option<String>,
}

/// document information dictionary
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfMetadata {
    /// `Title`
    pub title: Option<String>,
    /// `Author`
    pub author: Option<String>,
    /// `Subject`
    pub subject: Option<String>,
    /// `Creator`
    pub creator: Option<String>,
    /// `Producer`
    pub producer: Option<String>,
    /// `CreationDate`, as written in the file
    pub creation_date: Option<String>,
    /// `ModDate`, as written in the file
    pub modification_date: Option<String>,
}

/// one entry of the document outline
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutlineEntry {
    /// label shown in the table of contents
    pub title: String,
    /// 1-based destination page, when it resolves to one
    pub page: Option<usize>,
    /// nested entries
    pub children: Vec<OutlineEntry>,
}

/// a pdf rasteriser
pub trait PdfBackend {
    /// opens a document, reporting download/parse progress as a percentage
    fn load(&mut self, data: Vec<u8>, progress: &mut dyn FnMut(f32)) -> Result<DocumentInfo>;

    /// page size in points at scale 1, `page_num` is 1-based
    fn page_size(&self, page_num: usize) -> Result<(f32, f32)>;

    /// rasterises one page at the given scale
    fn render_page(&mut self, page_num: usize, scale: f32) -> Result<Canvas>;

    /// the information dictionary
    fn metadata(&self) -> Result<PdfMetadata>;

    /// table of contents, empty when the document has none
    fn outline(&self) -> Result<Vec<OutlineEntry>> {
        Ok(Vec::new())
    }

    /// releases the document
    fn close(&mut self);
}

/// reported after each page of a full render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProgress {
    /// 1-based page that just finished
    pub page_num: usize,
    /// pages in the document
    pub total_pages: usize,
    /// `page_num / total_pages` as a percentage
    pub progress: f32,
}

/// the scale that keeps a page within `max_width`
pub fn fit_scale(page_width: f32, scale: f32, max_width: f32) -> f32 {
    if page_width > 0.0 && page_width * scale > max_width {
        max_width / page_width
    } else {
        scale
    }
}

/// encodings a rendered page can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// lossless, keeps transparency
    #[default]
    Png,
    /// lossy, `quality` from 1 to 100, alpha is dropped
    Jpeg {
        /// encoder quality
        quality: u8,
    },
}

impl ExportFormat {
    /// jpeg at the quality browsers use for `toDataURL`
    pub const JPEG: Self = Self::Jpeg { quality: 92 };

    /// mime type of the encoded bytes
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }

    /// usual file extension, without the dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// encodes a canvas as an image file
pub fn encode_canvas(canvas: &Canvas, format: ExportFormat) -> Result<Vec<u8>> {
    let image = RgbaImage::from_raw(canvas.width, canvas.height, canvas.pixels.to_vec())
        .ok_or_else(|| {
            FlipbookError::Image(format!(
                "canvas of {}x{} has {} bytes",
                canvas.width,
                canvas.height,
                canvas.byte_len()
            ))
        })?;

    let mut out = Cursor::new(Vec::new());
    match format {
        ExportFormat::Png => image.write_to(&mut out, ImageFormat::Png)?,
        ExportFormat::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode_image(&rgb)?;
        }
    }

    Ok(out.into_inner())
}

/// decodes a `data:...;base64,` uri
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, payload) = uri
        .split_once(',')
        .ok_or_else(|| FlipbookError::InvalidDataUri("missing `,` separator".to_string()))?;

    Ok(STANDARD.decode(payload.trim())?)
}

/// loads the raw bytes a pdf source points at
pub fn resolve_bytes(source: &PdfSource, fetcher: &dyn Fetcher) -> Result<Vec<u8>> {
    match source {
        PdfSource::Url(url) => fetcher.fetch_bytes(url),
        PdfSource::Path(path) => Ok(fs::read(path)?),
        PdfSource::DataUri(uri) => decode_data_uri(uri),
        PdfSource::Bytes(bytes) => Ok(bytes.clone()),
    }
}

/// backend plus cache and scale policy
pub struct PdfRenderer {
    backend: Box<dyn PdfBackend>,
    config: PdfConfig,
    cache: HashMap<usize, Canvas>,
    info: Option<DocumentInfo>,
}

impl std::fmt::Debug for PdfRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfRenderer")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl PdfRenderer {
    /// wraps a backend, nothing is loaded yet
    pub fn new(backend: Box<dyn PdfBackend>, config: PdfConfig) -> Self {
        Self {
            backend,
            config,
            cache: HashMap::new(),
            info: None,
        }
    }

    /// replaces the render settings, cached pages are dropped
    pub fn set_config(&mut self, config: PdfConfig) {
        self.config = config;
        self.clear_cache();
    }

    /// opens a document, dropping anything rendered for the previous one
    pub fn load(
        &mut self,
        data: Vec<u8>,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<DocumentInfo> {
        self.clear_cache();
        if self.info.take().is_some() {
            self.backend.close();
        }

        let info = self.backend.load(data, on_progress).inspect_err(|e| {
            log::error!("failed to load pdf: {e}");
        })?;

        log::debug!("pdf loaded with {} pages", info.page_count);
        self.info = Some(info.clone());
        Ok(info)
    }

    /// number of pages of the open document, zero when none is open
    pub fn page_count(&self) -> usize {
        self.info.as_ref().map_or(0, |info| info.page_count)
    }

    /// renders one page, serving it from the cache when possible
    pub fn render_page(&mut self, page_num: usize) -> Result<Canvas> {
        let page_count = self.page_count();
        if self.info.is_none() {
            return Err(FlipbookError::Pdf("no document loaded".to_string()));
        }
        if page_num == 0 || page_num > page_count {
            return Err(FlipbookError::Pdf(format!(
                "page {page_num} is outside 1..={page_count}"
            )));
        }

        if self.config.cache_enabled
            && let Some(canvas) = self.cache.get(&page_num)
        {
            return Ok(canvas.clone());
        }

        let (width, _) = self.backend.page_size(page_num)?;
        let scale = fit_scale(width, self.config.scale, self.config.max_width);
        let canvas = self.backend.render_page(page_num, scale)?;

        if self.config.cache_enabled {
            self.cache.insert(page_num, canvas.clone());
        }

        Ok(canvas)
    }

    /// renders one page through the cache and encodes it
    pub fn export_page(&mut self, page_num: usize, format: ExportFormat) -> Result<Vec<u8>> {
        let canvas = self.render_page(page_num)?;
        encode_canvas(&canvas, format).inspect_err(|e| {
            log::error!("failed to export pdf page {page_num}: {e}");
        })
    }

    /// [`Self::export_page`] as a `data:` uri
    pub fn export_page_data_uri(&mut self, page_num: usize, format: ExportFormat) -> Result<String> {
        let bytes = self.export_page(page_num, format)?;
        Ok(format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes)))
    }

    /// renders every page in order
    ///
    /// a page that fails becomes a placeholder, only a missing document is an
    /// error
    pub fn render_all(
        &mut self,
        mut on_page: impl FnMut(RenderProgress),
    ) -> Result<Vec<Page>> {
        if self.info.is_none() {
            return Err(FlipbookError::Pdf("no document loaded".to_string()));
        }

        let total_pages = self.page_count();
        let mut pages = Vec::with_capacity(total_pages);

        for page_num in 1..=total_pages {
            match self.render_page(page_num) {
                Ok(canvas) => {
                    pages.push(Page::Canvas { canvas });
                    #[allow(clippy::cast_precision_loss)]
                    let progress = (page_num as f32 / total_pages as f32) * 100.0;
                    on_page(RenderProgress {
                        page_num,
                        total_pages,
                        progress,
                    });
                }
                Err(e) => {
                    log::error!("failed to render pdf page {page_num}: {e}");
                    pages.push(Page::placeholder(page_num));
                }
            }
        }

        Ok(pages)
    }

    /// warms the cache for `range` pages either side of `current`
    pub fn preload(&mut self, current: usize, range: usize) {
        let total = self.page_count();
        if total == 0 {
            return;
        }

        let first = current.saturating_sub(range).max(1);
        let last = current.saturating_add(range).min(total);

        for page_num in first..=last {
            if self.cache.contains_key(&page_num) {
                continue;
            }
            if let Err(e) = self.render_page(page_num) {
                log::warn!("failed to preload pdf page {page_num}: {e}");
            }
        }
    }

    /// the document information, empty on backend failure
    pub fn metadata(&self) -> Result<PdfMetadata> {
        if self.info.is_none() {
            return Err(FlipbookError::Pdf("no document loaded".to_string()));
        }

        Ok(self.backend.metadata().unwrap_or_else(|e| {
            log::warn!("could not read pdf metadata: {e}");
            PdfMetadata::default()
        }))
    }

    /// the outline, empty on backend failure
    pub fn outline(&self) -> Result<Vec<OutlineEntry>> {
        if self.info.is_none() {
            return Err(FlipbookError::Pdf("no document loaded".to_string()));
        }

        Ok(self.backend.outline().unwrap_or_else(|e| {
            log::warn!("could not read pdf outline: {e}");
            Vec::new()
        }))
    }

    /// number of pages currently cached
    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    /// forgets every rendered page
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// drops the cache and closes the document
    pub fn destroy(&mut self) {
        self.clear_cache();
        if self.info.take().is_some() {
            self.backend.close();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {
        super::*,
        crate::loader::fetch::OfflineFetcher,
        assert2::check as assert,
        std::{cell::RefCell, rc::Rc},
    };

    /// backend producing 1x1 canvases, optionally failing on some pages
    #[derive(Default, Clone)]
    pub(crate) struct FakeBackend {
        pub pages: usize,
        pub width: f32,
        pub failing: Vec<usize>,
        pub title: Option<String>,
        pub renders: Rc<RefCell<Vec<(usize, f32)>>>,
        pub closed: Rc<RefCell<usize>>,
    }

    impl FakeBackend {
        pub(crate) fn with_pages(pages: usize) -> Self {
            Self {
                pages,
                width: 600.0,
                ..Self::default()
            }
        }
    }

    impl PdfBackend for FakeBackend {
        fn load(&mut self, data: Vec<u8>, progress: &mut dyn FnMut(f32)) -> Result<DocumentInfo> {
            if !data.starts_with(b"%PDF") {
                return Err(FlipbookError::Pdf("not a pdf".to_string()));
            }
            progress(50.0);
            progress(100.0);
            Ok(DocumentInfo {
                page_count: self.pages,
                fingerprint: Some("fake".to_string()),
            })
        }

        fn page_size(&self, _page_num: usize) -> Result<(f32, f32)> {
            Ok((self.width, self.width * 1.4))
        }

        fn render_page(&mut self, page_num: usize, scale: f32) -> Result<Canvas> {
            self.renders.borrow_mut().push((page_num, scale));
            if self.failing.contains(&page_num) {
                return Err(FlipbookError::Pdf(format!("page {page_num} is broken")));
            }
            Ok(Canvas::new(1, 1, vec![0u8, 0, 0, 255]))
        }

        fn metadata(&self) -> Result<PdfMetadata> {
            Ok(PdfMetadata {
                title: self.title.clone(),
                ..PdfMetadata::default()
            })
        }

        fn close(&mut self) {
            *self.closed.borrow_mut() += 1;
        }
    }

    fn renderer(backend: FakeBackend) -> PdfRenderer {
        PdfRenderer::new(Box::new(backend), PdfConfig::default())
    }

    #[test]
    fn test_fit_scale_caps_width() {
        assert!(fit_scale(400.0, 1.5, 800.0) == 1.5);
        assert!(fit_scale(1000.0, 1.5, 800.0) == 0.8);
        assert!(fit_scale(0.0, 1.5, 800.0) == 1.5);
    }

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_data_uri("data:application/pdf;base64,JVBERg==").unwrap();
        assert!(bytes == b"%PDF");
        assert!(decode_data_uri("no separator").is_err());
        assert!(decode_data_uri("data:application/pdf;base64,@@@").is_err());
    }

    #[test]
    fn test_resolve_bytes_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), b"%PDF-1.7").unwrap();
        let bytes =
            resolve_bytes(&PdfSource::Path(file.path().to_path_buf()), &OfflineFetcher).unwrap();
        assert!(bytes == b"%PDF-1.7");
    }

    #[test]
    fn test_render_all_uses_fitted_scale_and_cache() {
        let backend = FakeBackend {
            width: 1000.0,
            ..FakeBackend::with_pages(3)
        };
        let renders = backend.renders.clone();
        let mut renderer = renderer(backend);
        renderer.load(b"%PDF".to_vec(), &mut |_| {}).unwrap();

        let mut seen = Vec::new();
        let pages = renderer.render_all(|p| seen.push(p.page_num)).unwrap();
        assert!(pages.len() == 3);
        assert!(seen == vec![1, 2, 3]);
        assert!(renders.borrow().iter().all(|(_, scale)| *scale == 0.8));

        renderer.render_page(2).unwrap();
        assert!(renders.borrow().len() == 3);
        assert!(renderer.cached_pages() == 3);
    }

    #[test]
    fn test_failed_page_becomes_placeholder() {
        let backend = FakeBackend {
            failing: vec![2],
            ..FakeBackend::with_pages(3)
        };
        let mut renderer = renderer(backend);
        renderer.load(b"%PDF".to_vec(), &mut |_| {}).unwrap();

        let pages = renderer.render_all(|_| {}).unwrap();
        assert!(pages.len() == 3);
        assert!(pages[1] == Page::placeholder(2));
        assert!(pages[0].kind() == "canvas");
    }

    #[test]
    fn test_render_without_document_fails() {
        let mut renderer = renderer(FakeBackend::with_pages(2));
        assert!(renderer.render_all(|_| {}).is_err());
        assert!(renderer.metadata().is_err());
    }

    #[test]
    fn test_load_reports_progress_and_resets_cache() {
        let mut renderer = renderer(FakeBackend::with_pages(2));
        let mut progress = Vec::new();
        renderer.load(b"%PDF".to_vec(), &mut |p| progress.push(p)).unwrap();
        assert!(progress == vec![50.0, 100.0]);

        renderer.render_page(1).unwrap();
        assert!(renderer.cached_pages() == 1);
        renderer.load(b"%PDF".to_vec(), &mut |_| {}).unwrap();
        assert!(renderer.cached_pages() == 0);
    }

    #[test]
    fn test_preload_stays_in_range() {
        let backend = FakeBackend::with_pages(10);
        let renders = backend.renders.clone();
        let mut renderer = renderer(backend);
        renderer.load(b"%PDF".to_vec(), &mut |_| {}).unwrap();

        renderer.preload(1, 2);
        let pages: Vec<usize> = renders.borrow().iter().map(|(n, _)| *n).collect();
        assert!(pages == vec![1, 2, 3]);
    }

    #[test]
    fn test_export_page_encodes_cached_render() {
        let backend = FakeBackend::with_pages(2);
        let renders = backend.renders.clone();
        let mut renderer = renderer(backend);
        renderer.load(b"%PDF".to_vec(), &mut |_| {}).unwrap();
        renderer.render_page(2).unwrap();

        let png = renderer.export_page(2, ExportFormat::Png).unwrap();
        assert!(png.starts_with(b"\x89PNG"));
        assert!(renders.borrow().len() == 1);

        let decoded = image::load_from_memory(&png).unwrap();
        assert!(decoded.width() == 1 && decoded.height() == 1);

        let jpeg = renderer.export_page(1, ExportFormat::JPEG).unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn test_export_page_data_uri_and_bounds() {
        let mut renderer = renderer(FakeBackend::with_pages(1));
        assert!(renderer.export_page(1, ExportFormat::Png).is_err());

        renderer.load(b"%PDF".to_vec(), &mut |_| {}).unwrap();
        let uri = renderer.export_page_data_uri(1, ExportFormat::Png).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(decode_data_uri(&uri).unwrap().starts_with(b"\x89PNG"));
        assert!(renderer.export_page(2, ExportFormat::Png).is_err());
    }

    #[test]
    fn test_encode_canvas_rejects_short_buffer() {
        let canvas = Canvas::new(4, 4, vec![0u8; 3]);
        assert!(matches!(
            encode_canvas(&canvas, ExportFormat::Png),
            Err(FlipbookError::Image(_))
        ));
    }

    #[test]
    fn test_destroy_closes_backend_once() {
        let backend = FakeBackend::with_pages(1);
        let closed = backend.closed.clone();
        let mut renderer = renderer(backend);
        renderer.load(b"%PDF".to_vec(), &mut |_| {}).unwrap();
        renderer.destroy();
        renderer.destroy();
        assert!(*closed.borrow() == 1);
        assert!(renderer.page_count() == 0);
    }
}
