#![allow(clippy::arithmetic_side_effects)]
use {
    super::{
        render::{self, PageRenderer, PageView},
        surface::{CELL_HEIGHT_PX, CELL_WIDTH_PX, PlanSurface, TerminalFullscreen},
    },
    crossterm::{
        cursor,
        event::{
            self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
            KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
        },
        execute,
        terminal::{self},
    },
    flipbook::{
        EbookViewer, Result,
        chrome::{Chrome, NO_BOOKMARKS, Overlay},
        engine::{
            input::{Key, Point, PointerEvent},
            layout::RenderPlan,
        },
        types::LayoutMode,
    },
    hashbrown::HashMap,
    ratatui::{
        Frame, Terminal,
        backend::CrosstermBackend,
        layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    },
    ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol},
    std::{
        io, panic,
        sync::Arc,
        time::{Duration, Instant},
    },
    tui_tree_widget::{Tree, TreeItem, TreeState},
};

const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(3);
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const SWIPE_HINT: &str = "Swipe or click the page edges to turn pages";

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        );
        let _ = terminal::disable_raw_mode();
    }
}

enum AppMode {
    Normal,
    GoToPage { input: String },
}

/// the pages on screen for a plan: the current one, plus its facing page in
/// spread mode
fn displayed_pages(plan: &RenderPlan) -> Vec<usize> {
    match plan.mode {
        LayoutMode::Single => plan.visible().map(|slot| slot.index).collect(),
        LayoutMode::Spread => plan
            .current_slot()
            .map(|slot| std::iter::once(slot.index).chain(slot.back).collect())
            .unwrap_or_default(),
    }
}

fn popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

pub struct TuiApp {
    viewer: EbookViewer<PlanSurface>,
    fullscreen: TerminalFullscreen,
    renderer: PageRenderer,
    picker: Picker,
    /// image protocol state per zero-based page index
    pictures: HashMap<usize, StatefulProtocol>,
    seen_mounts: usize,
    tree_state: TreeState<usize>,
    followed_page: usize,
    sidebar_width: u16,
    show_sidebar: bool,
    notification: Option<String>,
    notification_time: Option<Instant>,
    show_help: bool,
    show_info: bool,
    mode: AppMode,
    panel_selected: usize,
    follow_terminal: bool,
    content_area: Rect,
    sidebar_area: Rect,
    bookmark_button: Rect,
    pressing_bookmark: bool,
    pointer_down: bool,
}

impl TuiApp {
    pub fn new(
        viewer: EbookViewer<PlanSurface>,
        fullscreen: TerminalFullscreen,
        renderer: PageRenderer,
        picker: Picker,
        sidebar_width: u16,
        follow_terminal: bool,
    ) -> Self {
        let mut tree_state = TreeState::default();
        tree_state.select(vec![viewer.current_page()]);

        Self {
            followed_page: viewer.current_page(),
            viewer,
            fullscreen,
            renderer,
            picker,
            pictures: HashMap::new(),
            seen_mounts: 0,
            tree_state,
            sidebar_width,
            show_sidebar: true,
            notification: None,
            notification_time: None,
            show_help: false,
            show_info: false,
            mode: AppMode::Normal,
            panel_selected: 0,
            follow_terminal,
            content_area: Rect::default(),
            sidebar_area: Rect::default(),
            bookmark_button: Rect::default(),
            pressing_bookmark: false,
            pointer_down: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = execute!(
                io::stdout(),
                DisableMouseCapture,
                terminal::LeaveAlternateScreen,
                cursor::Show
            );
            let _ = terminal::disable_raw_mode();
            original_hook(info);
        }));

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            terminal::SetTitle(self.viewer.chrome().window_title())
        )?;

        let guard = TerminalGuard;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        self.viewer.destroy();

        drop(guard);
        let _ = panic::take_hook();

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            if let Some(t) = self.notification_time
                && t.elapsed() >= NOTIFICATION_TIMEOUT
            {
                self.notification = None;
                self.notification_time = None;
            }

            self.viewer.tick();
            if let Some(active) = self.fullscreen.take_change() {
                self.viewer.on_fullscreen_change(active);
            }
            self.sync_with_viewer();

            terminal.draw(|f| self.render_ui(f))?;

            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if !self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Mouse(mouse_event) => {
                        self.handle_mouse(mouse_event);
                    }
                    Event::Resize(cols, _) if self.follow_terminal => {
                        self.viewer
                            .resize(u32::from(cols).saturating_mul(CELL_WIDTH_PX));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// drops stale pictures after a re-render and keeps the sidebar on the
    /// current page
    fn sync_with_viewer(&mut self) {
        let mounts = self
            .viewer
            .engine()
            .and_then(|engine| engine.surface())
            .map_or(0, PlanSurface::mounts);
        if mounts != self.seen_mounts {
            self.seen_mounts = mounts;
            self.pictures.clear();
        }

        let current = self.viewer.current_page();
        if current != self.followed_page {
            self.followed_page = current;
            self.tree_state.select(vec![current]);
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(message.into());
        self.notification_time = Some(Instant::now());
    }

    fn current_plan(&self) -> Option<RenderPlan> {
        self.viewer
            .engine()
            .and_then(|engine| engine.surface())
            .and_then(PlanSurface::plan)
            .cloned()
    }

    fn render_ui(&mut self, frame: &mut Frame) {
        let chrome = self.viewer.chrome().clone();
        self.bookmark_button = Rect::default();
        self.sidebar_area = Rect::default();

        let body = if chrome.fullscreen {
            frame.area()
        } else {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(0),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            self.render_header(frame, rows[0], &chrome);
            self.render_progress(frame, rows[2], &chrome);
            self.render_status_bar(frame, rows[3], &chrome);
            rows[1]
        };

        let content = if self.show_sidebar && !chrome.fullscreen {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(self.sidebar_width), Constraint::Min(0)])
                .split(body);
            self.sidebar_area = cols[0];
            self.render_sidebar(frame, cols[0]);
            cols[1]
        } else {
            body
        };

        self.content_area = content;
        self.render_content(frame, content);

        match &chrome.overlay {
            Overlay::Hidden => {}
            Overlay::Loading(text) => self.render_message(frame, " Loading ", text, Color::Cyan),
            Overlay::Error(text) => self.render_message(frame, " Error ", text, Color::Red),
        }

        if chrome.swipe_hint {
            self.render_notification(frame, content, SWIPE_HINT);
        }

        if let Some(ref msg) = self.notification {
            self.render_notification(frame, content, msg);
        }

        if chrome.panel_open {
            self.render_bookmarks_panel(frame, &chrome);
        }

        if self.show_info {
            self.render_info_overlay(frame);
        }

        if self.show_help {
            self.render_help_overlay(frame);
        }

        if let AppMode::GoToPage { ref input } = self.mode {
            self.render_goto_page_dialog(frame, input, &chrome);
        }
    }

    fn render_header(&mut self, frame: &mut Frame, area: Rect, chrome: &Chrome) {
        let indicator_width = u16::try_from(chrome.indicator.len() + 2).unwrap_or(u16::MAX);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(indicator_width),
                Constraint::Length(5),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(Span::styled(
            format!(" {}", chrome.title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(title, cols[0]);

        frame.render_widget(
            Paragraph::new(chrome.indicator.as_str()).alignment(Alignment::Center),
            cols[1],
        );

        let (icon, color) = if chrome.bookmark_active {
            ("[\u{2605}]", Color::Yellow)
        } else {
            ("[\u{2606}]", Color::Gray)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(icon, Style::default().fg(color))),
            cols[2],
        );
        self.bookmark_button = cols[2];
    }

    fn render_progress(&self, frame: &mut Frame, area: Rect, chrome: &Chrome) {
        let ratio = (chrome.progress / 100.0).clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
            .ratio(ratio)
            .label(format!("{:.0}%", chrome.progress));
        frame.render_widget(gauge, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, chrome: &Chrome) {
        let arrow = |symbol: &'static str, disabled: bool| {
            let color = if disabled { Color::DarkGray } else { Color::White };
            Span::styled(symbol, Style::default().fg(color))
        };

        let turning = if self.viewer.engine().is_some_and(|e| e.is_animating()) {
            " turning... |"
        } else {
            ""
        };

        let status = Line::from(vec![
            Span::raw(" "),
            arrow("\u{25c0}", chrome.prev_disabled),
            Span::raw(" "),
            arrow("\u{25b6}", chrome.next_disabled),
            Span::styled(
                format!(
                    " | {} {}{turning} [:] GoTo | [b] Bookmark | [B] Bookmarks | [f] Fullscreen | [?] Help | [q] Quit",
                    chrome.page_input, chrome.page_total
                ),
                Style::default().fg(Color::Gray),
            ),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_sidebar(&mut self, frame: &mut Frame, area: Rect) {
        let items = self.build_tree_items();

        let Ok(tree_widget) = Tree::new(&items) else {
            return;
        };

        let tree_widget = tree_widget
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Pages ")
                    .style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(tree_widget, area, &mut self.tree_state);
    }

    fn build_tree_items(&self) -> Vec<TreeItem<'static, usize>> {
        let bookmarks = self.viewer.bookmarks();
        let current = self.viewer.current_page();

        (1..=self.viewer.total_pages())
            .map(|page| {
                let bookmark_marker = if bookmarks.contains(&page) { " *" } else { "" };
                let current_marker = if page == current { " <" } else { "" };
                TreeItem::new_leaf(
                    page,
                    format!("Page {page}{bookmark_marker}{current_marker}"),
                )
            })
            .collect()
    }

    fn render_content(&mut self, frame: &mut Frame, area: Rect) {
        let Some(plan) = self.current_plan() else {
            return;
        };

        let indices = displayed_pages(&plan);
        if indices.is_empty() {
            let empty = Paragraph::new("This book has no pages")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        }

        let count = u32::try_from(indices.len()).unwrap_or(1);
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, count); indices.len()])
            .split(area);

        for (&index, &page_area) in indices.iter().zip(areas.iter()) {
            self.render_page(frame, page_area, index);
        }
    }

    fn render_page(&mut self, frame: &mut Frame, area: Rect, index: usize) {
        let Some(page) = self
            .viewer
            .engine()
            .and_then(|engine| engine.pages().get(index))
            .cloned()
        else {
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", index + 1))
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let view = self.renderer.view(index, &page);
        match view.as_ref() {
            PageView::Picture(img) => {
                let picker = &self.picker;
                let protocol = self
                    .pictures
                    .entry(index)
                    .or_insert_with(|| picker.new_resize_protocol(img.clone()));
                frame.render_stateful_widget(StatefulImage::default(), inner, protocol);
            }
            PageView::Text(text) => {
                let paragraph = Paragraph::new(text.as_str())
                    .style(Style::default().fg(Color::White))
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, inner);
            }
        }
    }

    fn render_message(&self, frame: &mut Frame, title: &str, text: &str, color: Color) {
        let area = popup(frame.area(), 60, 5);
        frame.render_widget(Clear, area);

        let message = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(color)),
            )
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(message, area);
    }

    fn render_notification(&self, frame: &mut Frame, area: Rect, message: &str) {
        let notification_area = Rect {
            x: area.x + area.width / 4,
            y: area.y + area.height.saturating_sub(4),
            width: area.width / 2,
            height: 3.min(area.height),
        };

        frame.render_widget(Clear, notification_area);

        let notification = Paragraph::new(message)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Notification")
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(notification, notification_area);
    }

    fn render_goto_page_dialog(&self, frame: &mut Frame, input: &str, chrome: &Chrome) {
        let popup_area = popup(frame.area(), 40, 5);
        frame.render_widget(Clear, popup_area);

        let display_text = format!(
            "Page (1-{}): {input}_ {}",
            chrome.page_input_max, chrome.page_total
        );

        let dialog = Paragraph::new(display_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Go to Page ")
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Cyan)),
            )
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false });

        frame.render_widget(dialog, popup_area);
    }

    fn render_bookmarks_panel(&self, frame: &mut Frame, chrome: &Chrome) {
        let entries = &chrome.bookmark_entries;
        let height = u16::try_from(entries.len() + 6).unwrap_or(u16::MAX).max(7);
        let popup_area = popup(frame.area(), 52, height);

        frame.render_widget(Clear, popup_area);

        let mut lines: Vec<Line<'static>> = Vec::new();

        if entries.is_empty() {
            lines.push(Line::from(format!("  {NO_BOOKMARKS}")));
        } else {
            for (slot, entry) in entries.iter().enumerate() {
                let keybind = if slot < 9 {
                    format!("[{}] ", slot + 1)
                } else {
                    "    ".to_string()
                };
                let here = if entry.page == self.viewer.current_page() {
                    " <-- here"
                } else {
                    ""
                };
                let style = if slot == self.panel_selected {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!("  {keybind}{}{here}", entry.label),
                    style,
                )));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(
            "  [Enter]/[1]-[9] jump, [d] remove, [B]/[Esc] close",
        ));

        let panel = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Bookmarks ")
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false });

        frame.render_widget(panel, popup_area);
    }

    fn render_info_overlay(&self, frame: &mut Frame) {
        let popup_area = popup(frame.area(), 60, 14);
        frame.render_widget(Clear, popup_area);

        let field = |key: &str, value: String| {
            Line::from(vec![
                Span::styled(
                    format!("  {key}: "),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(value),
            ])
        };

        let content_type = self
            .viewer
            .content_type()
            .map_or_else(|| "unknown".to_string(), |t| t.to_string());
        let mode = self
            .viewer
            .engine()
            .map_or_else(|| "none".to_string(), |e| format!("{:?}", e.mode()));
        let width = self
            .viewer
            .engine()
            .map_or(0, |e| e.viewport_width());

        let lines = vec![
            field("Title", self.viewer.title().to_string()),
            field("Content", content_type),
            field("Pages", self.viewer.total_pages().to_string()),
            field("Bookmarks", self.viewer.bookmarks().len().to_string()),
            field("Layout", mode),
            field("Viewport", format!("{width}px")),
            field("Decoded", self.renderer.cached().to_string()),
            Line::from(""),
            Line::from("  Press [i] or [Esc] to close"),
        ];

        let panel = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Book Info ")
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Magenta)),
            )
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false });

        frame.render_widget(panel, popup_area);
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let AppMode::GoToPage { ref mut input } = self.mode {
            match key.code {
                KeyCode::Esc => {
                    self.mode = AppMode::Normal;
                }
                KeyCode::Enter => {
                    let text = std::mem::take(input);
                    self.mode = AppMode::Normal;
                    if !self.viewer.submit_page_input(&text) {
                        self.notify(format!(
                            "Page must be between 1 and {}",
                            self.viewer.total_pages()
                        ));
                    }
                }
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    input.push(c);
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                _ => {}
            }
            return true;
        }

        if self.show_help {
            self.show_help = false;
            return true;
        }

        if self.show_info {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('i')) {
                self.show_info = false;
            }
            return true;
        }

        if self.viewer.chrome().panel_open {
            self.handle_panel_key(key);
            return true;
        }

        match key.code {
            KeyCode::Esc if self.viewer.is_fullscreen() => {
                self.viewer.toggle_fullscreen();
            }
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return false;
            }

            KeyCode::Tab => {
                self.show_sidebar = !self.show_sidebar;
            }

            KeyCode::Up if self.show_sidebar => {
                self.tree_state.key_up();
            }

            KeyCode::Down if self.show_sidebar => {
                self.tree_state.key_down();
            }

            KeyCode::Enter if self.show_sidebar => {
                if let Some(&page) = self.tree_state.selected().last() {
                    self.viewer.go_to_page(page);
                }
            }

            KeyCode::Right | KeyCode::Char('l') => {
                self.viewer.handle_key(Key::ArrowRight);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.viewer.handle_key(Key::ArrowLeft);
            }
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.viewer.handle_key(Key::PageDown);
            }
            KeyCode::PageUp => {
                self.viewer.handle_key(Key::PageUp);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.viewer.handle_key(Key::Home);
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.viewer.handle_key(Key::End);
            }

            KeyCode::Char('b') => {
                self.viewer.press_bookmark_button();
                self.viewer.release_bookmark_button();
                let page = self.viewer.current_page();
                if self.viewer.chrome().bookmark_active {
                    self.notify(format!("Bookmarked page {page}"));
                } else {
                    self.notify(format!("Bookmark removed (page {page})"));
                }
            }

            KeyCode::Char('B') => {
                self.panel_selected = 0;
                self.viewer.open_bookmarks_panel();
            }

            KeyCode::Char(c @ '1'..='9') if !self.show_sidebar => {
                let slot = usize::from(c as u8 - b'1');
                if let Some(&page) = self.viewer.bookmarks().get(slot) {
                    self.viewer.go_to_page(page);
                    self.notify(format!("Jumped to bookmark {} (page {page})", slot + 1));
                }
            }

            KeyCode::Char(':') => {
                self.mode = AppMode::GoToPage {
                    input: String::new(),
                };
            }

            KeyCode::Char('f') => {
                self.viewer.toggle_fullscreen();
            }

            KeyCode::Char('y') => self.copy_current_page(),

            KeyCode::Char('s') => self.save_current_page(),

            KeyCode::Char('i') => {
                self.show_info = true;
            }

            KeyCode::Char('?') => {
                self.show_help = true;
            }

            _ => {}
        }

        true
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        let entries: Vec<usize> = self
            .viewer
            .chrome()
            .bookmark_entries
            .iter()
            .map(|entry| entry.page)
            .collect();

        match key.code {
            KeyCode::Esc | KeyCode::Char('B' | 'q') => {
                self.viewer.close_bookmarks_panel();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.panel_selected = self.panel_selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.panel_selected + 1 < entries.len() {
                    self.panel_selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(&page) = entries.get(self.panel_selected) {
                    self.viewer.select_bookmark(page);
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let slot = usize::from(c as u8 - b'1');
                if let Some(&page) = entries.get(slot) {
                    self.viewer.select_bookmark(page);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(&page) = entries.get(self.panel_selected) {
                    self.viewer.remove_bookmark(page);
                    self.panel_selected = self
                        .panel_selected
                        .min(entries.len().saturating_sub(2));
                }
            }
            _ => {}
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn pointer_at(&self, at: Position) -> Point {
        let x = u32::from(at.x.saturating_sub(self.content_area.x)) * CELL_WIDTH_PX;
        let y = u32::from(at.y.saturating_sub(self.content_area.y)) * CELL_HEIGHT_PX;
        Point::new(x as f32, y as f32)
    }

    #[allow(clippy::cast_precision_loss)]
    fn content_width(&self) -> f32 {
        (u32::from(self.content_area.width) * CELL_WIDTH_PX) as f32
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let at = Position::new(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.viewer.next_page();
            }
            MouseEventKind::ScrollUp => {
                self.viewer.prev_page();
            }

            MouseEventKind::Down(MouseButton::Left) if self.bookmark_button.contains(at) => {
                self.pressing_bookmark = true;
                self.viewer.press_bookmark_button();
            }
            MouseEventKind::Drag(MouseButton::Left)
                if self.pressing_bookmark && !self.bookmark_button.contains(at) =>
            {
                self.pressing_bookmark = false;
                self.viewer.cancel_bookmark_press();
            }
            MouseEventKind::Up(MouseButton::Left) if self.pressing_bookmark => {
                self.pressing_bookmark = false;
                if self.bookmark_button.contains(at) {
                    self.viewer.release_bookmark_button();
                } else {
                    self.viewer.cancel_bookmark_press();
                }
            }

            MouseEventKind::Down(MouseButton::Left) if self.sidebar_area.contains(at) => {
                self.tree_state.click_at(at);
                if let Some(&page) = self.tree_state.selected().last() {
                    self.viewer.go_to_page(page);
                }
            }

            MouseEventKind::Down(MouseButton::Left) if self.content_area.contains(at) => {
                self.pointer_down = true;
                self.viewer
                    .handle_pointer(PointerEvent::MouseDown(self.pointer_at(at)));
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pointer_down => {
                self.viewer
                    .handle_pointer(PointerEvent::MouseMove(self.pointer_at(at)));
            }
            MouseEventKind::Up(MouseButton::Left) if self.pointer_down => {
                self.pointer_down = false;
                let point = self.pointer_at(at);
                self.viewer.handle_pointer(PointerEvent::MouseUp(point));
                if self.content_area.contains(at) {
                    self.viewer.handle_pointer(PointerEvent::Click {
                        x: point.x,
                        width: self.content_width(),
                    });
                }
            }
            _ => {}
        }
    }

    fn current_view(&mut self) -> Option<Arc<PageView>> {
        let index = self.viewer.current_page().saturating_sub(1);
        let page = self
            .viewer
            .engine()
            .and_then(|engine| engine.pages().get(index))
            .cloned()?;

        Some(self.renderer.view(index, &page))
    }

    fn copy_current_page(&mut self) {
        let Some(view) = self.current_view() else {
            return;
        };

        match render::copy_to_clipboard(&view) {
            Ok(()) => self.notify("Page copied to clipboard"),
            Err(e) => self.notify(format!("Failed to copy: {e}")),
        }
    }

    fn save_current_page(&mut self) {
        let Some(view) = self.current_view() else {
            return;
        };

        let stem = render::export_stem(self.viewer.title(), self.viewer.current_page());
        let saved = std::env::current_dir()
            .map_err(flipbook::FlipbookError::from)
            .and_then(|dir| render::export_view(&view, &dir, &stem));

        match saved {
            Ok(path) => {
                log::info!("exported page to {}", path.display());
                self.notify(format!("Saved {}", path.display()));
            }
            Err(e) => self.notify(format!("Failed to save: {e}")),
        }
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let popup_area = popup(frame.area(), 64, 35);
        frame.render_widget(Clear, popup_area);

        let heading = |text: &'static str, color: Color| {
            Line::from(Span::styled(
                text,
                Style::default().add_modifier(Modifier::BOLD).fg(color),
            ))
        };

        let lines = vec![
            heading("Navigation", Color::Cyan),
            Line::from("  l, Right, Space   Next page"),
            Line::from("  h, Left           Previous page"),
            Line::from("  PgDn / PgUp       Next / previous page"),
            Line::from("  g, Home           First page"),
            Line::from("  G, End            Last page"),
            Line::from("  :                 Go to page (type number)"),
            Line::from("  Click edges       Previous / next page"),
            Line::from("  Drag sideways     Swipe to turn"),
            Line::from("  Scroll wheel      Previous / next page"),
            Line::from(""),
            heading("Sidebar", Color::Green),
            Line::from("  Tab               Toggle sidebar"),
            Line::from("  Up/Down           Move through pages"),
            Line::from("  Enter             Jump to selected page"),
            Line::from(""),
            heading("Bookmarks", Color::Yellow),
            Line::from("  b, click [*]      Toggle bookmark on current page"),
            Line::from("  B, hold [*]       Show bookmark list"),
            Line::from("  1-9               Jump to bookmark (sidebar hidden)"),
            Line::from(""),
            heading("Other", Color::Gray),
            Line::from("  f                 Toggle fullscreen"),
            Line::from("  i                 Show book info"),
            Line::from("  y                 Copy page to clipboard"),
            Line::from("  s                 Save page to current directory"),
            Line::from("  ?                 Show this help"),
            Line::from("  q, Esc, Ctrl-c    Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "  Bookmarks are saved automatically.",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let help = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Controls ")
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Cyan)),
            )
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false });

        frame.render_widget(help, popup_area);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {super::*, assert2::check as assert};

    #[test]
    fn test_single_mode_displays_one_page() {
        let plan = RenderPlan::compute(5, 2, LayoutMode::Single, None);
        assert!(displayed_pages(&plan) == vec![2]);
    }

    #[test]
    fn test_spread_displays_facing_pages() {
        let plan = RenderPlan::compute(5, 2, LayoutMode::Spread, None);
        assert!(displayed_pages(&plan) == vec![2, 3]);

        let last = RenderPlan::compute(5, 4, LayoutMode::Spread, None);
        assert!(displayed_pages(&last) == vec![4]);
    }

    #[test]
    fn test_empty_plan_displays_nothing() {
        let plan = RenderPlan::compute(0, 0, LayoutMode::Spread, None);
        assert!(displayed_pages(&plan).is_empty());
    }

    #[test]
    fn test_popup_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = popup(area, 40, 5);
        assert!(rect == Rect::new(30, 17, 40, 5));

        let small = popup(Rect::new(0, 0, 20, 4), 40, 10);
        assert!(small.width == 16 && small.height == 2);
    }
}
