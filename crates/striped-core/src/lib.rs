//! Layout math, wire protocol, and error types shared by the manager, disk, and user roles.

pub mod checksum;
pub mod error;
pub mod layout;
pub mod limits;
pub mod protocol;
pub mod wire;
