pub mod cached_entry;
pub mod pubsub_event;
