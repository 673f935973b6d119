//! Asynchronous delivery of verification emails and SMS

pub mod queue;
pub mod transport;


pub use queue::{DeliveryJob, JobQueueNotifier, QueueConfig, RetryPolicy};
pub use transport::{EmailTransport, LoggingEmailTransport, LoggingSmsTransport, SmsTransport};
