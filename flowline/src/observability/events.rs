//! Canonical structured event names used across `flowline`.

// Destroy-coordinator lifecycle events.
pub const DESTROY_START: &str = "destroy_start";
pub const DESTROY_ALREADY_DESTROYED: &str = "destroy_already_destroyed";
pub const TEARDOWN_OK: &str = "teardown_ok";
pub const TEARDOWN_FAILED: &str = "teardown_failed";
pub const UNDESTROY: &str = "undestroy";

// Notifier events.
pub const ERROR_EMIT: &str = "error_emit";
pub const ERROR_UNOBSERVED: &str = "error_unobserved";
pub const CLOSE_EMIT: &str = "close_emit";

// Pipe-bridge events.
pub const PIPE_ATTACH: &str = "pipe_attach";
pub const PIPE_DETACH: &str = "pipe_detach";
pub const PIPE_PAUSE: &str = "pipe_pause";
pub const PIPE_RESUME: &str = "pipe_resume";
pub const PIPE_END_DESTINATION: &str = "pipe_end_destination";
pub const PIPE_WRITE_FAILED: &str = "pipe_write_failed";

// Facade flow-operation events for key low-log paths.
pub const WRITE_AFTER_DESTROY: &str = "write_after_destroy";

// Dispatch events.
pub const DISPATCH_REENTRY_SKIPPED: &str = "dispatch_reentry_skipped";
