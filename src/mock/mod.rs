//! In-process test doubles
//!
//! - [`RecordingHost`]: scripted answers, records every message and prompt
//! - [`MockLoader`]: scripted configuration sources keyed by location,
//!   counting loads and queries so callers can assert on them after the
//!   handles have been moved into a resolver

mod host;
mod loader;

pub use host::RecordingHost;
pub use loader::{MockLoader, MockSource};
