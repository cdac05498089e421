pub mod app_storage;
pub mod collection;
pub mod seed;
pub mod users;
