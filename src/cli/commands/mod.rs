pub mod bookmarks;
pub mod complete;
pub mod info;
pub mod read;

use {
    flipbook::{
        FlipbookError, Platform, RawSource, Result, Source,
        bookmarks::FileStorage,
        clock::SystemClock,
        loader::fetch::HttpFetcher,
        types::ContentType,
    },
    std::{
        fs,
        path::{Path, PathBuf},
        sync::Arc,
    },
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff", "avif"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// every image directly inside `dir`, in natural order
pub fn images_in_dir(dir: &Path) -> Result<Vec<String>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_image(path))
        .collect();

    alphanumeric_sort::sort_path_slice(&mut files);

    Ok(files
        .into_iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect())
}

/// turns command line inputs into a typed source
///
/// a single directory expands to its images, a lone image file or several
/// inputs are an image list
pub fn resolve_source(inputs: &[String], content_type: Option<ContentType>) -> Result<Source> {
    let raw = match inputs {
        [] => return Err(FlipbookError::MissingSource),
        [single] if Path::new(single).is_dir() => {
            let images = images_in_dir(Path::new(single))?;
            if images.is_empty() {
                return Err(FlipbookError::UnsupportedSource(format!(
                    "no images found in {single}"
                )));
            }
            RawSource::List(images)
        }
        [single] if content_type.is_none() && is_image(Path::new(single)) => {
            RawSource::List(vec![single.clone()])
        }
        [single] if content_type != Some(ContentType::Images) => RawSource::Text(single.clone()),
        many => RawSource::List(many.to_vec()),
    };

    Source::infer(raw, content_type)
}

/// the services a terminal session runs with
pub fn terminal_platform() -> Result<Platform> {
    Ok(Platform::new(
        Arc::new(SystemClock::new()),
        FileStorage::in_data_dir()?,
        HttpFetcher::new()?,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {super::*, assert2::check as assert};

    #[test]
    fn test_directory_expands_in_natural_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page10.png", "page2.png", "page1.png", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let images = images_in_dir(dir.path()).unwrap();
        let names: Vec<String> = images
            .iter()
            .map(|p| Path::new(p).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names == vec!["page1.png", "page2.png", "page10.png"]);

        let source = resolve_source(&[dir.path().to_string_lossy().into_owned()], None).unwrap();
        assert!(source.content_type() == ContentType::Images);
    }

    #[test]
    fn test_single_file_is_detected() {
        let source = resolve_source(&["book.pdf".to_string()], None).unwrap();
        assert!(source.content_type() == ContentType::Pdf);

        let source = resolve_source(&["a.png".to_string()], Some(ContentType::Images)).unwrap();
        assert!(source.content_type() == ContentType::Images);
    }

    #[test]
    fn test_lone_image_without_type_is_an_image_list() {
        let source = resolve_source(&["cover.PNG".to_string()], None).unwrap();
        assert!(source.content_type() == ContentType::Images);
        assert!(
            matches!(source, Source::Images(images) if images.urls == vec!["cover.PNG".to_string()])
        );

        let source = resolve_source(&["cover.png".to_string()], Some(ContentType::Pdf)).unwrap();
        assert!(source.content_type() == ContentType::Pdf);
    }

    #[test]
    fn test_several_inputs_are_images() {
        let source = resolve_source(&["a.png".to_string(), "b.png".to_string()], None).unwrap();
        assert!(source.content_type() == ContentType::Images);
    }
}
