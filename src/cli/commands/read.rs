mod render;
mod surface;
mod tui;

use {
    super::{resolve_source, terminal_platform},
    clap::Args,
    crossterm::terminal,
    flipbook::{
        EbookViewer, Result, ViewerOptions, config::ViewerConfig, host::JsonLinesSink,
        loader::fetch::HttpFetcher, types::ContentType,
    },
    indicatif::ProgressBar,
    ratatui_image::picker::Picker,
    render::PageRenderer,
    std::{fs::File, io::BufWriter, path::PathBuf, time::Duration},
    surface::TerminalFullscreen,
    tui::TuiApp,
};

pub use surface::TerminalStage;

#[derive(Args)]
pub struct ReadArgs {
    /// PDF or HTML file, URL, image files, or a directory of images
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Content type, detected from the input when omitted
    #[arg(long = "type", value_enum)]
    content_type: Option<ContentType>,

    /// Book title, used for bookmarks and the window title
    #[arg(long)]
    title: Option<String>,

    /// Viewport width in pixels; follows the terminal width when omitted
    #[arg(long)]
    width: Option<u32>,

    /// Append page change messages to this file as JSON lines
    #[arg(long)]
    message_log: Option<PathBuf>,

    /// Decode every page before reading (uses more memory but smoother navigation)
    #[arg(long)]
    prerender: bool,

    /// Width of the page sidebar in columns
    #[arg(long, default_value_t = 24)]
    sidebar_width: u16,
}

pub fn execute(args: ReadArgs, config: ViewerConfig) -> Result<()> {
    let source = resolve_source(&args.inputs, args.content_type)?;

    let fullscreen = TerminalFullscreen::default();
    let mut platform = terminal_platform()?.with_fullscreen(fullscreen.clone());
    if let Some(path) = &args.message_log {
        let file = File::options().create(true).append(true).open(path)?;
        platform = platform.with_parent(JsonLinesSink::new(BufWriter::new(file)));
    }

    let mut stage = match args.width {
        Some(width) => TerminalStage::new(width),
        None => TerminalStage::for_columns(terminal::size()?.0),
    };

    let mut options = ViewerOptions::new(source);
    if let Some(title) = args.title {
        options = options.with_title(title);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Loading e-book...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let mut viewer = EbookViewer::new(platform, config);
    let loaded = viewer.init(options, &mut stage);
    spinner.finish_and_clear();
    loaded?;

    log::info!(
        "opened \"{}\" with {} pages",
        viewer.title(),
        viewer.total_pages()
    );

    let mut renderer = PageRenderer::new(HttpFetcher::new()?);
    if args.prerender
        && let Some(engine) = viewer.engine()
    {
        renderer.prerender(engine.pages())?;
    }

    let picker = Picker::from_query_stdio().unwrap_or_else(|e| {
        log::debug!("terminal graphics query failed, using half blocks: {e}");
        Picker::halfblocks()
    });

    let mut app = TuiApp::new(
        viewer,
        fullscreen,
        renderer,
        picker,
        args.sidebar_width,
        args.width.is_none(),
    );

    app.run()
}
