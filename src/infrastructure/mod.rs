pub mod codec;
pub mod http;
pub mod observability;
