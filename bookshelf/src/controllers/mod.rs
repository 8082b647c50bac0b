pub mod books;
pub mod health_check;
pub mod oauth;
pub mod pages;
pub mod profile;

pub use books::*;
pub use health_check::*;
pub use oauth::*;
pub use profile::*;
