//! Watch command: live countdowns for every active borrow.

use std::sync::Arc;

use anyhow::Result;
use bookshelf_core::loans::{CountdownBoard, CountdownTicker};
use tracing::{debug, info};

use super::Context;

pub async fn run_watch_command(ctx: &Context) -> Result<()> {
    let borrower = ctx.require_borrower()?;
    let loans = Arc::new(ctx.loans());
    loans.load_session(&borrower).await?;

    let titles: Vec<(String, String)> = loans
        .active_records()
        .into_iter()
        .map(|record| (record.record_id.to_string(), record.title))
        .collect();
    if titles.is_empty() {
        println!("No books borrowed.");
        return Ok(());
    }

    info!(records = titles.len(), "watching due dates (Ctrl-C to stop)");
    let mut ticker = CountdownTicker::start(Arc::clone(&loans), ctx.settings.tick);
    loop {
        tokio::select! {
            board = ticker.next() => match board {
                Some(board) => println!("{}", render_board(&board, &titles)),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupt received");
                break;
            }
        }
    }
    ticker.stop();
    Ok(())
}

fn render_board(board: &CountdownBoard, titles: &[(String, String)]) -> String {
    board
        .iter()
        .map(|(record_id, left)| {
            let title = titles
                .iter()
                .find(|(id, _)| id == record_id.as_str())
                .map_or("", |(_, title)| title.as_str());
            format!("{record_id}  {title}: {left}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
