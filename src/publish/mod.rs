//! Outbound publishing of the rendered report.
//!
//! Publishing never affects the computed result: callers log a failure and
//! carry on.

pub mod github;

pub use github::{post_comment, CommentTarget};
