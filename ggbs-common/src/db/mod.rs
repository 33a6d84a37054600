//! Local database initialization

pub mod init;

pub use init::*;
