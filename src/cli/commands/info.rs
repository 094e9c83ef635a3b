use {
    super::{read::TerminalStage, resolve_source, terminal_platform},
    clap::Args,
    flipbook::{EbookViewer, Result, ViewerOptions, config::ViewerConfig, types::ContentType},
    indicatif::ProgressBar,
    std::{collections::BTreeMap, time::Duration},
};

/// viewport reported by the headless viewer
const INFO_VIEWPORT_WIDTH: u32 = 1024;

#[derive(Args)]
pub struct InfoArgs {
    /// PDF or HTML file, URL, image files, or a directory of images
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Content type, detected from the input when omitted
    #[arg(long = "type", value_enum)]
    content_type: Option<ContentType>,

    /// Book title, used to look up bookmarks
    #[arg(long)]
    title: Option<String>,
}

#[allow(clippy::arithmetic_side_effects)]
pub fn execute(args: InfoArgs, config: ViewerConfig) -> Result<()> {
    let source = resolve_source(&args.inputs, args.content_type)?;
    let mut options = ViewerOptions::new(source);
    if let Some(title) = args.title {
        options = options.with_title(title);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Loading e-book...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let mut stage = TerminalStage::new(INFO_VIEWPORT_WIDTH);
    let mut viewer = EbookViewer::new(terminal_platform()?, config);
    let loaded = viewer.init(options, &mut stage);
    spinner.finish_and_clear();
    loaded?;

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    if let Some(engine) = viewer.engine() {
        for page in engine.pages() {
            *kinds.entry(page.kind()).or_default() += 1;
        }
    }

    println!("--- Title: {}", viewer.title());
    if let Some(content_type) = viewer.content_type() {
        println!("--- Content: {content_type}");
    }
    println!("--- Pages: {}", viewer.total_pages());

    if !kinds.is_empty() {
        println!();
        let last = kinds.len().saturating_sub(1);
        for (i, (kind, count)) in kinds.iter().enumerate() {
            let prefix = if i == last { "└" } else { "├" };
            println!("  {prefix} {kind:<12} {count}");
        }
    }

    let bookmarks = viewer.bookmarks();
    if !bookmarks.is_empty() {
        println!();
        println!("--- Bookmarks:");
        let last = bookmarks.len().saturating_sub(1);
        for (i, page) in bookmarks.iter().enumerate() {
            let prefix = if i == last { "└" } else { "├" };
            println!("  {prefix} Page {page}");
        }
    }

    println!("---");

    viewer.destroy();

    Ok(())
}
