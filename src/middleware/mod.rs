pub mod session_guard;

pub use session_guard::{CurrentSession, session_guard_middleware};
