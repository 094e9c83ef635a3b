//! splitting markup into pages

use {
    super::{HtmlSource, fetch::Fetcher},
    crate::{Result, types::Page},
    scraper::{ElementRef, Html, Selector},
    std::{fs, sync::LazyLock},
};

static SECTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("section, .page, article").expect("section selector is valid css")
});

static HEADER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2").expect("header selector is valid css"));

/// reads the markup behind a source and splits it into pages
pub fn load(source: &HtmlSource, fetcher: &dyn Fetcher) -> Result<Vec<Page>> {
    let markup = match source {
        HtmlSource::Markup(markup) => markup.clone(),
        HtmlSource::Url(url) => fetcher.fetch_text(url)?,
        HtmlSource::Path(path) => fs::read_to_string(path)?,
    };

    Ok(split_pages(&markup))
}

/// splits markup into pages
///
/// 1. every `section`, `.page` or `article` becomes a page (its inner markup)
/// 2. otherwise, if there are `h1`/`h2` headers, a new page starts at each
///    top-level header
/// 3. otherwise the whole input is one page
///
/// always yields at least one page
pub fn split_pages(markup: &str) -> Vec<Page> {
    let fragment = Html::parse_fragment(markup);

    let sections: Vec<Page> = fragment
        .select(&SECTION_SELECTOR)
        .map(|section| Page::Html {
            html: section.inner_html(),
        })
        .collect();

    if !sections.is_empty() {
        return sections;
    }

    if fragment.select(&HEADER_SELECTOR).next().is_some() {
        let pages = split_at_headers(&fragment);
        if !pages.is_empty() {
            return pages;
        }
    }

    vec![Page::Html {
        html: markup.to_string(),
    }]
}

fn split_at_headers(fragment: &Html) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = String::new();

    for child in fragment.root_element().children().filter_map(ElementRef::wrap) {
        if matches!(child.value().name(), "h1" | "h2") {
            if !current.is_empty() {
                pages.push(Page::Html {
                    html: std::mem::take(&mut current),
                });
            }
            current = child.html();
        } else {
            current.push_str(&child.html());
        }
    }

    if !current.is_empty() {
        pages.push(Page::Html { html: current });
    }

    pages
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {super::*, crate::loader::fetch::OfflineFetcher, assert2::check as assert, std::io::Write};

    fn html_of(page: &Page) -> &str {
        match page {
            Page::Html { html } => html,
            other => panic!("expected html page, got {}", other.kind()),
        }
    }

    #[test]
    fn test_unstructured_markup_is_a_single_page() {
        let markup = "<p>Hello</p><div><b>world</b></div> trailing text";
        let pages = split_pages(markup);
        assert!(pages.len() == 1);
        assert!(html_of(&pages[0]) == markup);
    }

    #[test]
    fn test_empty_markup_still_yields_a_page() {
        let pages = split_pages("");
        assert!(pages.len() == 1);
        assert!(html_of(&pages[0]).is_empty());
    }

    #[test]
    fn test_three_headers_make_three_pages() {
        let markup = "<h2>One</h2><p>a</p><h2>Two</h2><p>b</p><p>c</p><h2>Three</h2><p>d</p>";
        let pages = split_pages(markup);
        assert!(pages.len() == 3);
        assert!(html_of(&pages[0]) == "<h2>One</h2><p>a</p>");
        assert!(html_of(&pages[1]) == "<h2>Two</h2><p>b</p><p>c</p>");
        assert!(html_of(&pages[2]) == "<h2>Three</h2><p>d</p>");
    }

    #[test]
    fn test_content_before_first_header_is_its_own_page() {
        let pages = split_pages("<p>intro</p><h1>Chapter</h1><p>body</p>");
        assert!(pages.len() == 2);
        assert!(html_of(&pages[0]) == "<p>intro</p>");
        assert!(html_of(&pages[1]).starts_with("<h1>Chapter</h1>"));
    }

    #[test]
    fn test_sections_take_priority_over_headers() {
        let markup = "<h1>Title</h1><section><p>one</p></section><div class=\"page\">two</div><article>three</article>";
        let pages = split_pages(markup);
        let bodies: Vec<&str> = pages.iter().map(html_of).collect();
        assert!(bodies == vec!["<p>one</p>", "two", "three"]);
    }

    #[test]
    fn test_load_reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<section>a</section><section>b</section>").unwrap();
        let pages = load(&HtmlSource::Path(file.path().to_path_buf()), &OfflineFetcher).unwrap();
        assert!(pages.len() == 2);
    }

    #[test]
    fn test_load_surfaces_fetch_errors() {
        let result = load(&HtmlSource::Url("https://x.test/a.html".into()), &OfflineFetcher);
        assert!(result.is_err());
    }
}
