//! CLI command handlers.

mod books;
mod config;
mod loans;
mod watch;

pub use books::{run_add_book_command, run_book_command, run_books_command, run_update_book_command};
pub use config::run_config_show_command;
pub use loans::{run_borrow_command, run_borrowed_command, run_return_command};
pub use watch::run_watch_command;

use std::path::PathBuf;

use anyhow::{Result, bail};
use bookshelf_core::catalog::Catalog;
use bookshelf_core::loans::LoanCoordinator;
use bookshelf_core::session::{Borrower, EnvTokenProvider};
use bookshelf_core::store::HttpStore;

use crate::config::Settings;

/// Everything a command needs: resolved settings plus shared clients.
pub struct Context {
    pub settings: Settings,
    pub config_path: Option<PathBuf>,
    store: HttpStore,
    tokens: EnvTokenProvider,
}

impl Context {
    pub fn new(settings: Settings, config_path: Option<PathBuf>) -> Result<Self> {
        let store = HttpStore::with_timeouts(
            &settings.api_url,
            settings.connect_timeout_secs,
            settings.read_timeout_secs,
        )?;
        let tokens = EnvTokenProvider::new(settings.token_env.clone());
        Ok(Self {
            settings,
            config_path,
            store,
            tokens,
        })
    }

    pub fn catalog(&self) -> Catalog<HttpStore, EnvTokenProvider> {
        Catalog::new(self.store.clone(), self.tokens.clone())
    }

    pub fn loans(&self) -> LoanCoordinator<HttpStore, EnvTokenProvider> {
        LoanCoordinator::new(self.store.clone(), self.tokens.clone())
    }

    /// Identity from flags or config; `None` when no email is known.
    pub fn borrower(&self) -> Option<Borrower> {
        let email = self.settings.email.clone()?;
        Some(Borrower::new(email, self.settings.name.clone().unwrap_or_default()))
    }

    /// Like [`borrower`](Self::borrower), for commands that cannot run
    /// signed out.
    pub fn require_borrower(&self) -> Result<Borrower> {
        match self.borrower() {
            Some(borrower) => Ok(borrower),
            None => bail!("No account email configured. Pass --email or set `email` in the config file."),
        }
    }
}
