pub mod access_token_provider;
pub mod book_repository;
pub mod identity_provider;
pub mod image_repository;
pub mod profile_repository;
pub mod secret_repository;
pub mod translation_service;
