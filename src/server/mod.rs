pub mod notice;
pub mod server;
