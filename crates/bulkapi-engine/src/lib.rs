pub mod bulk;
pub mod divide;
pub mod error;
pub mod resolver;

pub use bulk::{BulkApi, BulkConfig};
pub use divide::divide;
pub use error::BulkError;
pub use resolver::Resolver;
