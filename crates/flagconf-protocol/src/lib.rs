//! flagconf protocol types
//!
//! Defines the line-delimited JSON envelope spoken between the resolver and
//! a configuration source running as a child process. One request per line
//! on the child's stdin, one response per line on its stdout.

pub mod error;
pub mod ops;
pub mod request;
pub mod response;

pub use error::{ConfError, ErrorCode, ProtocolError};
pub use ops::{FlagsForFileRequest, FlagsResult, LoadRequest, LoadResponse};
pub use request::ConfRequest;
pub use response::ConfResponse;

/// Protocol version spoken by this implementation.
pub const PROTOCOL_VERSION: i32 = 1;
