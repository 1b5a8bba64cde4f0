//! Resource limits for the recursive conversions.
//!
//! Value trees are strict trees, but both directions still walk them
//! recursively, so nesting is bounded to keep pathological input from
//! exhausting the stack.

/// Default maximum nesting depth for marshal, unmarshal and deserialize.
///
/// The root value sits at depth 0; every mapping entry, sequence element
/// and artefact content entry is one level deeper than its parent.
pub const MAX_DEPTH: usize = 128;

/// Hard ceiling accepted by [`CodecOptions::with_max_depth`](crate::codec::CodecOptions::with_max_depth).
///
/// Every conversion must complete at this depth on a 2 MiB thread stack,
/// the default for spawned threads, in unoptimized builds.
pub const MAX_DEPTH_CEILING: usize = 256;
