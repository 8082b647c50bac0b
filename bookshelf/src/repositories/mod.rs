pub mod access_token_google_repository;
pub mod book_postgres_repository;
pub mod identity_google_repository;
pub mod image_s3_repository;
pub mod profile_postgres_repository;
pub mod secret_configuration_repository;
pub mod secret_manager_repository;
pub mod translation_google_repository;
