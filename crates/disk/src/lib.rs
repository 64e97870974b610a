//! Disk content-port store and dispatch, split out of the binary so
//! integration tests can drive it directly without a socket.

pub mod cli;
pub mod dispatch;
pub mod store;
