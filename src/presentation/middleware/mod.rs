mod credentials;
mod session_guard;

pub use credentials::credentials_from_headers;
pub use session_guard::{GuardState, session_guard_middleware};
