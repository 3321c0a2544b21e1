//! Small helpers shared by the binaries and tests

pub mod logging;
pub mod scan;
pub mod testing;
