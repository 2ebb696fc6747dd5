//! Notification fan-out: recipient resolution, platform payload shaping,
//! and per-endpoint publish with aggregate reporting.

pub mod dispatcher;
pub mod payload;
pub mod resolver;

pub use dispatcher::NotificationDispatcher;
pub use resolver::EndpointResolver;
