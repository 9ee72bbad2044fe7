mod models;
mod schema;

pub use models::{Note, Section, BUILTIN_SECTIONS};
pub use schema::Database;
