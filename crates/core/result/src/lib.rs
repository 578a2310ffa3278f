mod error_type;
mod models;

pub use error_type::*;
pub use models::*;
