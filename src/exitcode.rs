//! Standard exit codes (BSD sysexits.h compatible)

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (malformed or missing guided value)
pub const DATAERR: i32 = 65;

/// Cannot open input
pub const NOINPUT: i32 = 66;

/// Guided program could not be started
pub const OSERR: i32 = 71;

/// Input/output error
pub const IOERR: i32 = 74;

/// Guided program broke the protocol
pub const PROTOCOL: i32 = 76;

/// Configuration error
pub const CONFIG: i32 = 78;
