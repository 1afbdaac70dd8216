//! Streaming bulk ingestion of Category records.
//!
//! Models each long-lived duplex exchange as two queues (inbound
//! requests, outbound results) serviced by one task per session. Two
//! variants exist: collect-then-acknowledge, which answers once with the
//! whole aggregate, and interleaved, which answers each request before
//! accepting the next.

pub mod session;

pub use session::{CollectSession, IngestPipeline, InterleavedSession};
