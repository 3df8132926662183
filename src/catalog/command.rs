pub mod add_book_cmd;
pub mod find_book_by_title_cmd;
pub mod get_book_cmd;
pub mod list_books_cmd;
pub mod remove_book_cmd;
pub mod update_book_cmd;

#[cfg(test)]
mod fixtures;
