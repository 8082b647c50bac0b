mod add_to_cache;
mod get_from_cache;
mod helpers;
