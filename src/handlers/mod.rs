/// HTTP request handlers and their request/response DTOs
pub mod auth;
pub mod books;
pub mod reviews;
pub mod tags;

pub use auth::{login, logout, me, refresh_token, signup};
pub use books::{create_book, delete_book, get_book, list_books, my_books, update_book};
pub use reviews::{add_review, delete_review, update_review};
pub use tags::{add_tags_to_book, books_by_tag, get_tag, list_tags, remove_tag_from_book};
