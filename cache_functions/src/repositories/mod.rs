pub mod cache_redis_repository;
