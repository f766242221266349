pub mod collection;
pub mod library;
pub mod movie;

pub use collection::CollectionSummary;
pub use library::{LibrarySection, ServerIdentity};
pub use movie::MovieItem;
