/// Business logic layer
///
/// Service structs own a `PgPool` clone and run the SQL; ownership checks
/// happen here, before any write. Handlers stay thin.
pub mod books;
pub mod reviews;
pub mod tags;
pub mod users;

pub use books::{BookPatch, BookService, NewBook};
pub use reviews::{NewReview, ReviewPatch, ReviewService};
pub use tags::TagService;
pub use users::UserService;
