//! Catalog command handlers: list, show, add, update.

use anyhow::Result;
use bookshelf_core::catalog::{Book, BookForm, BookId};

use super::Context;
use crate::cli::{BookFields, BooksArgs};

pub async fn run_books_command(ctx: &Context, args: &BooksArgs) -> Result<()> {
    let books = ctx.catalog().list_books(&args.to_filter()).await?;
    if books.is_empty() {
        println!("No books matched the current filters.");
        return Ok(());
    }
    for book in &books {
        println!("{}", render_book_row(book));
    }
    Ok(())
}

pub async fn run_book_command(ctx: &Context, id: &str) -> Result<()> {
    let book = ctx.catalog().get_book(&BookId::new(id)).await?;
    println!("{}", render_book_detail(&book));
    Ok(())
}

pub async fn run_add_book_command(ctx: &Context, fields: BookFields) -> Result<()> {
    let form = fields.apply(BookForm::default());
    let id = ctx.catalog().add_book(form).await?;
    println!("Added book {id}");
    Ok(())
}

pub async fn run_update_book_command(ctx: &Context, id: &str, fields: BookFields) -> Result<()> {
    let catalog = ctx.catalog();
    let id = BookId::new(id);
    let existing = catalog.get_book(&id).await?;
    catalog
        .update_book(&id, fields.apply(BookForm::from_book(&existing)))
        .await?;
    println!("Updated book {id}");
    Ok(())
}

pub(crate) fn render_book_row(book: &Book) -> String {
    let stock = if book.is_available() {
        format!("{} left", book.quantity)
    } else {
        "out of stock".to_string()
    };
    format!(
        "{}  {} by {} [{}] {:.1}/5, {stock}",
        book.id, book.name, book.author, book.category, book.rating
    )
}

fn render_book_detail(book: &Book) -> String {
    format!(
        "id          = {}\nname        = {}\nauthor      = {}\ncategory    = {}\nquantity    = {}\nrating      = {:.1}\nimage       = {}\ndescription = {}",
        book.id,
        book.name,
        book.author,
        book.category,
        book.quantity,
        book.rating,
        book.image,
        book.description
    )
}
