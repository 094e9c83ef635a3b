//! one page per image

use {super::ImageArraySource, crate::types::Page};

/// one image page per url, labelled `Page N`
pub fn load(source: &ImageArraySource) -> Vec<Page> {
    source
        .urls
        .iter()
        .enumerate()
        .map(|(index, src)| Page::Image {
            src: src.clone(),
            alt: format!("Page {}", index + 1),
        })
        .collect()
}
