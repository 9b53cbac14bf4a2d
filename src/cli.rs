//! CLI argument definitions using clap derive macros.

use bookshelf_core::catalog::{BookFilter, BookForm};
use bookshelf_core::dates::parse_flexible_date;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Browse the library catalog and manage your borrowed books.
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Catalog API root (overrides `api_url` in the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Account email used for borrow records
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Display name recorded on new borrows
    #[arg(long, global = true)]
    pub name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List catalog books
    Books(BooksArgs),
    /// Show one book
    Book {
        /// Book identifier
        id: String,
    },
    /// Add a book to the catalog
    AddBook(BookFields),
    /// Change fields of an existing book
    UpdateBook {
        /// Book identifier
        id: String,
        #[command(flatten)]
        fields: BookFields,
    },
    /// List your active borrows with time left
    Borrowed,
    /// Borrow a book
    Borrow(BorrowArgs),
    /// Return a borrowed book
    Return {
        /// Borrow record identifier (see `borrowed`)
        record_id: String,
    },
    /// Show live countdowns until Ctrl-C
    Watch,
    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BooksArgs {
    /// Match name or author (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only books with copies left
    #[arg(short, long)]
    pub available: bool,

    /// Only books in this category
    #[arg(short, long)]
    pub category: Option<String>,
}

impl BooksArgs {
    pub fn to_filter(&self) -> BookFilter {
        BookFilter {
            search: self.search.clone(),
            available_only: self.available,
            category: self.category.clone(),
        }
    }
}

/// Book fields; unset fields keep the value they are applied over.
#[derive(Args, Debug, Clone, Default)]
pub struct BookFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// One of: Novel, History, Drama, Sci-Fi, Science, CSE, Pharmacy, EEE
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub quantity: Option<i64>,

    /// 1.0 to 5.0
    #[arg(long)]
    pub rating: Option<f64>,

    /// Cover image URL
    #[arg(long)]
    pub image: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

impl BookFields {
    pub fn apply(self, mut form: BookForm) -> BookForm {
        if let Some(title) = self.title {
            form.name = title;
        }
        if let Some(author) = self.author {
            form.author = author;
        }
        if let Some(category) = self.category {
            form.category = category;
        }
        if let Some(quantity) = self.quantity {
            form.quantity = quantity;
        }
        if let Some(rating) = self.rating {
            form.rating = rating;
        }
        if let Some(image) = self.image {
            form.image = image;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        form
    }
}

#[derive(Args, Debug, Clone)]
pub struct BorrowArgs {
    /// Book identifier
    pub book_id: String,

    /// Return date (YYYY-MM-DD or MM/DD/YYYY); defaults to today + loan_days
    #[arg(long, value_parser = parse_date_arg, conflicts_with = "days")]
    pub due: Option<NaiveDate>,

    /// Loan length in days (1-365)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=365))]
    pub days: Option<u32>,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_flexible_date(raw).ok_or_else(|| format!("unrecognized date '{raw}'"))
}
