//! Manager registries and dispatch, split out of the binary so integration
//! tests can drive the state machine directly without a socket.

pub mod cli;
pub mod dispatch;
pub mod state;
