pub mod add_to_cache;
pub mod get_from_cache;
pub mod health_check;

pub use add_to_cache::*;
pub use get_from_cache::*;
pub use health_check::*;
