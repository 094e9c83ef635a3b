use {
    clap::{Args, Subcommand},
    flipbook::{
        FlipbookError, Result,
        bookmarks::{self, Bookmarks, FileStorage, Storage},
        config::ViewerConfig,
    },
    std::io::{self, Write},
};

#[derive(Args)]
pub struct BookmarksArgs {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// List bookmarked pages, for one book or for all of them
    List {
        /// Only this book
        #[arg(long)]
        title: Option<String>,
    },

    /// Bookmark a page, or remove the bookmark if it is already set
    Toggle {
        #[arg(long)]
        title: String,

        /// 1-based page number
        #[arg(long)]
        page: usize,
    },

    /// Remove every bookmark of a book
    Clear {
        #[arg(long)]
        title: String,
    },

    /// Print where bookmarks are stored
    Path,
}

pub fn execute(args: BookmarksArgs, config: ViewerConfig) -> Result<()> {
    let storage = FileStorage::in_data_dir()?;

    if let Action::Path = args.action {
        println!("{}", storage.dir().display());
        return Ok(());
    }

    let mut out = io::stdout().lock();
    run(args.action, &storage, &config.bookmarks_key, &mut out)
}

fn run(action: Action, storage: &dyn Storage, key: &str, out: &mut dyn Write) -> Result<()> {
    match action {
        Action::List { title: Some(title) } => {
            let marks = Bookmarks::load(storage, key, &title);
            print_book(out, &title, marks.pages())?;
        }
        Action::List { title: None } => {
            let all = bookmarks::load_all(storage, key)?;
            if all.values().all(Vec::is_empty) {
                writeln!(out, "No bookmarks yet.")?;
            }
            for (title, pages) in all.iter().filter(|(_, pages)| !pages.is_empty()) {
                print_book(out, title, pages)?;
            }
        }
        Action::Toggle { title, page } => {
            if page == 0 {
                return Err(FlipbookError::Other("pages start at 1".to_string()));
            }
            let mut marks = Bookmarks::load(storage, key, &title);
            if marks.toggle(page, storage) {
                writeln!(out, "Bookmarked page {page} of {title}")?;
            } else {
                writeln!(out, "Bookmark removed (page {page} of {title})")?;
            }
        }
        Action::Clear { title } => {
            let mut marks = Bookmarks::load(storage, key, &title);
            let count = marks.pages().len();
            marks.clear(storage);
            writeln!(out, "Removed {count} bookmark(s) from {title}")?;
        }
        Action::Path => {}
    }

    Ok(())
}

fn print_book(out: &mut dyn Write, title: &str, pages: &[usize]) -> Result<()> {
    writeln!(out, "--- {title}")?;
    if pages.is_empty() {
        writeln!(out, "  (none)")?;
    }
    let last = pages.len().saturating_sub(1);
    for (i, page) in pages.iter().enumerate() {
        let prefix = if i == last { "└" } else { "├" };
        writeln!(out, "  {prefix} Page {page}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {super::*, assert2::check as assert, flipbook::bookmarks::MemoryStorage};

    const KEY: &str = "elevare-ebook-bookmarks";

    fn output(action: Action, storage: &MemoryStorage) -> String {
        let mut out = Vec::new();
        run(action, storage, KEY, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let storage = MemoryStorage::default();
        let toggle = || Action::Toggle {
            title: "Guide".to_string(),
            page: 4,
        };

        assert!(output(toggle(), &storage).starts_with("Bookmarked page 4"));
        assert!(Bookmarks::load(&storage, KEY, "Guide").pages() == [4]);

        assert!(output(toggle(), &storage).starts_with("Bookmark removed"));
        assert!(Bookmarks::load(&storage, KEY, "Guide").pages().is_empty());
    }

    #[test]
    fn test_page_zero_is_rejected() {
        let storage = MemoryStorage::default();
        let mut out = Vec::new();
        let action = Action::Toggle {
            title: "Guide".to_string(),
            page: 0,
        };
        assert!(run(action, &storage, KEY, &mut out).is_err());
    }

    #[test]
    fn test_list_all_skips_empty_books() {
        let storage = MemoryStorage::default();
        storage
            .set_item(KEY, r#"{"A":[3,1],"B":[],"C":[9]}"#)
            .unwrap();

        let listed = output(Action::List { title: None }, &storage);
        assert!(listed.contains("--- A"));
        assert!(!listed.contains("--- B"));
        assert!(listed.contains("└ Page 9"));
    }

    #[test]
    fn test_clear_only_touches_one_book() {
        let storage = MemoryStorage::default();
        storage.set_item(KEY, r#"{"A":[1,2],"B":[5]}"#).unwrap();

        let cleared = output(
            Action::Clear {
                title: "A".to_string(),
            },
            &storage,
        );
        assert!(cleared.starts_with("Removed 2 bookmark(s)"));

        let all = bookmarks::load_all(&storage, KEY).unwrap();
        assert!(all.get("A").is_some_and(Vec::is_empty));
        assert!(all.get("B") == Some(&vec![5]));
    }

    #[test]
    fn test_empty_store_says_so() {
        let storage = MemoryStorage::default();
        assert!(output(Action::List { title: None }, &storage) == "No bookmarks yet.\n");
    }
}
