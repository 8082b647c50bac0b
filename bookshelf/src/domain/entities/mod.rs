pub mod book;
pub mod client_secrets;
pub mod credentials;
pub mod image_file_name;
pub mod language;
pub mod profile;
pub mod user_info;
