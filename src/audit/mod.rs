// Security event logging for the session layer
// Structured events are separate from diagnostic tracing: they are the
// durable audit trail for timeout, hijack, and fail-closed decisions

#![allow(dead_code)]

pub mod logger;
pub mod storage;
pub mod types;

pub use logger::EventLogger;
pub use storage::{EventStorage, MemoryEventStorage};
pub use types::{SecurityEvent, SecurityEventKind, SecurityEventLevel, SecurityEventQuery};
