//! Borrow, return, and borrowed-list command handlers.

use anyhow::{Context as _, Result, anyhow};
use bookshelf_core::catalog::BookId;
use bookshelf_core::loans::{BorrowRecord, Countdown, RecordId};
use chrono::{Days, Local, NaiveDate, Utc};
use tracing::debug;

use super::Context;
use crate::cli::BorrowArgs;

pub async fn run_borrowed_command(ctx: &Context) -> Result<()> {
    let borrower = ctx.require_borrower()?;
    let loans = ctx.loans();
    loans.load_session(&borrower).await?;

    let records = loans.active_records();
    if records.is_empty() {
        println!("No books borrowed.");
        return Ok(());
    }
    let countdowns = loans.countdowns(Utc::now());
    for record in &records {
        let left = countdowns
            .get(&record.record_id)
            .copied()
            .unwrap_or(Countdown::Expired);
        println!("{}", render_record_row(record, left));
    }
    Ok(())
}

pub async fn run_borrow_command(ctx: &Context, args: &BorrowArgs) -> Result<()> {
    let borrower = ctx.borrower();
    let loans = ctx.loans();
    if let Some(borrower) = &borrower {
        loans.load_session(borrower).await?;
    }

    let book_id = BookId::new(args.book_id.as_str());
    let book = ctx.catalog().get_book(&book_id).await?;
    loans.remember_book(&book);

    let today = Local::now().date_naive();
    let due = match args.due {
        Some(due) => due,
        None => default_due_date(today, args.days.unwrap_or(ctx.settings.loan_days))?,
    };
    debug!(book_id = %book_id, %today, %due, "borrowing");

    let record = loans
        .borrow(&book, borrower.as_ref(), today, Some(due))
        .await?;
    println!(
        "Borrowed \"{}\" until {} (record {})",
        record.title, record.due_at, record.record_id
    );
    Ok(())
}

pub async fn run_return_command(ctx: &Context, record_id: &str) -> Result<()> {
    let borrower = ctx.require_borrower()?;
    let loans = ctx.loans();
    loans.load_session(&borrower).await?;

    let record_id = RecordId::new(record_id);
    let title = loans
        .record(&record_id)
        .map(|record| record.title)
        .unwrap_or_default();
    loans
        .return_book(&record_id)
        .await
        .with_context(|| format!("Failed to return record {record_id}"))?;
    println!("Returned \"{title}\" (record {record_id})");
    Ok(())
}

pub(crate) fn default_due_date(today: NaiveDate, loan_days: u32) -> Result<NaiveDate> {
    today
        .checked_add_days(Days::new(u64::from(loan_days)))
        .ok_or_else(|| anyhow!("Due date out of range: {today} + {loan_days} days"))
}

pub(crate) fn render_record_row(record: &BorrowRecord, left: Countdown) -> String {
    format!(
        "{}  {} [{}] borrowed {} due {} ({left})",
        record.record_id, record.title, record.category, record.borrowed_at, record.due_at
    )
}
