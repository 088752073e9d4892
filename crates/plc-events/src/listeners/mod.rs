//! Standard listeners wired at startup.

pub mod audit;
pub mod notification;
