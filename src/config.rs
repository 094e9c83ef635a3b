//! viewer, engine and pdf settings, optionally read from `config.toml`

use {
    crate::Result,
    serde::{Deserialize, Serialize},
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

/// timings and thresholds used by the flip engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// viewports at or below this width use single-page mode
    pub single_page_breakpoint: u32,
    /// length of a page flip in milliseconds
    pub flip_duration_ms: u64,
    /// how long navigation stays locked after a single-page turn
    pub single_page_lock_ms: u64,
    /// minimum horizontal drag, in pixels, that counts as a swipe
    pub swipe_threshold: f32,
    /// share of the container width on each side that reacts to clicks
    pub click_zone: f32,
    /// quiet period before a resize is applied
    pub resize_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            single_page_breakpoint: 600,
            flip_duration_ms: 600,
            single_page_lock_ms: 300,
            swipe_threshold: 50.0,
            click_zone: 0.3,
            resize_debounce_ms: 250,
        }
    }
}

/// pdf rasterisation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// preferred render scale
    pub scale: f32,
    /// pages wider than this after scaling are scaled down to fit
    pub max_width: f32,
    /// keep rendered pages around for re-use
    pub cache_enabled: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            scale: 1.5,
            max_width: 800.0,
            cache_enabled: true,
        }
    }
}

/// everything the viewer needs to know that is not content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// id of the element the engine renders into
    pub container: String,
    /// title used when none is supplied and none can be extracted
    pub default_title: String,
    /// storage key holding every book's bookmarks
    pub bookmarks_key: String,
    /// how long the bookmark button must be held to open the panel
    pub long_press_ms: u64,
    /// viewports at or below this width get the swipe hint
    pub swipe_hint_breakpoint: u32,
    /// how long the swipe hint stays up
    pub swipe_hint_ms: u64,
    /// flip engine tuning
    pub engine: EngineConfig,
    /// pdf tuning
    pub pdf: PdfConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            container: "flipbook".to_string(),
            default_title: "E-book".to_string(),
            bookmarks_key: "elevare-ebook-bookmarks".to_string(),
            long_press_ms: 500,
            swipe_hint_breakpoint: 768,
            swipe_hint_ms: 3_000,
            engine: EngineConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// reads a config file, missing keys fall back to defaults
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// parses toml text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// loads `config.toml` from the user config directory, or defaults when
    /// there is none
    pub fn load_or_default() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.container.trim().is_empty() {
            return Err(crate::FlipbookError::Config(
                "container must not be empty".to_string(),
            ));
        }

        if !(0.0..=0.5).contains(&self.engine.click_zone) {
            return Err(crate::FlipbookError::Config(format!(
                "click_zone must be between 0 and 0.5, got {}",
                self.engine.click_zone
            )));
        }

        Ok(())
    }
}

/// where `load_or_default` looks for the config file
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flipbook").join("config.toml"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {super::*, assert2::check as assert, std::io::Write};

    #[test]
    fn test_defaults_match_widget_constants() {
        let config = ViewerConfig::default();
        assert!(config.container == "flipbook");
        assert!(config.bookmarks_key == "elevare-ebook-bookmarks");
        assert!(config.engine.single_page_breakpoint == 600);
        assert!(config.engine.flip_duration_ms == 600);
        assert!(config.engine.single_page_lock_ms == 300);
        assert!(config.engine.swipe_threshold == 50.0);
        assert!(config.engine.resize_debounce_ms == 250);
        assert!(config.long_press_ms == 500);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ViewerConfig::from_toml(
            "default_title = \"Guia\"\n\n[engine]\nflip_duration_ms = 300\n",
        )
        .unwrap();
        assert!(config.default_title == "Guia");
        assert!(config.engine.flip_duration_ms == 300);
        assert!(config.engine.swipe_threshold == 50.0);
        assert!(config.pdf.max_width == 800.0);
    }

    #[test]
    fn test_rejects_empty_container() {
        let result = ViewerConfig::from_toml("container = \"  \"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_oversized_click_zone() {
        let result = ViewerConfig::from_toml("[engine]\nclick_zone = 0.8\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "long_press_ms = 800").unwrap();
        let config = ViewerConfig::from_path(file.path()).unwrap();
        assert!(config.long_press_ms == 800);
    }
}
