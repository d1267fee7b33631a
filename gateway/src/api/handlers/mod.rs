pub mod health;
pub mod resetcodes;
pub mod sessions;
pub mod summary;
pub mod users;
