pub mod external_url;
pub mod image_uploader;
pub mod translator;
pub mod user_session;
