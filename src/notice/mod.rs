pub mod dispatcher;
pub mod request;
pub mod template;
