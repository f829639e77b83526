//! Deny-list sanitizer for compiler flags.
//!
//! Flags produced by a configuration source are passed through here before
//! they reach the native front end. Architecture selection flags are dropped
//! because the front end is known to crash on them.

mod result;

pub use result::{DroppedFlag, SanitizeResult};

/// Explicitly denied flag markers.
///
/// A token equal to a marker is dropped together with the token that
/// follows it (the marker's argument). A token that merely starts with a
/// marker is dropped on its own.
pub const DENIED_FLAGS: &[&str] = &["-arch"];

/// Sanitize a flag sequence, keeping a record of everything that was dropped.
///
/// Single left-to-right pass. Per token, in order of precedence:
/// 1. exact marker: drop it and arm the argument skip
/// 2. marker prefix: drop it alone, skip state untouched
/// 3. armed skip: drop the token as the marker's argument
/// 4. anything else is kept
pub fn sanitize<S: AsRef<str>>(flags: &[S]) -> SanitizeResult {
    let mut kept: Vec<String> = Vec::with_capacity(flags.len());
    let mut dropped: Vec<DroppedFlag> = Vec::new();

    // Marker waiting for its argument.
    let mut pending: Option<&str> = None;

    for flag in flags.iter().map(|f| f.as_ref()) {
        if let Some(marker) = DENIED_FLAGS.iter().find(|m| **m == flag) {
            if let Some(previous) = pending.replace(*marker) {
                dropped.push(DroppedFlag::DeniedFlag {
                    flag: previous.to_string(),
                    argument: None,
                });
            }
            continue;
        }

        if DENIED_FLAGS.iter().any(|m| flag.starts_with(m)) {
            dropped.push(DroppedFlag::DeniedPrefix(flag.to_string()));
            continue;
        }

        if let Some(marker) = pending.take() {
            dropped.push(DroppedFlag::DeniedFlag {
                flag: marker.to_string(),
                argument: Some(flag.to_string()),
            });
            continue;
        }

        kept.push(flag.to_string());
    }

    // Trailing marker with nothing left to consume.
    if let Some(marker) = pending {
        dropped.push(DroppedFlag::DeniedFlag {
            flag: marker.to_string(),
            argument: None,
        });
    }

    if !dropped.is_empty() {
        tracing::debug!(
            dropped = ?dropped.iter().map(DroppedFlag::to_code).collect::<Vec<_>>(),
            "dropped unsafe flags"
        );
    }

    SanitizeResult {
        flags: kept,
        dropped,
    }
}

/// Sanitize a flag sequence and return only the kept flags.
pub fn sanitize_flags<S: AsRef<str>>(flags: &[S]) -> Vec<String> {
    sanitize(flags).flags
}
