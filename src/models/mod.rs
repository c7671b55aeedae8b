pub mod channel;
pub mod member;
pub mod message;
pub mod profile;
pub mod server;
