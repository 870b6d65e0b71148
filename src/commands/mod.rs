//! Command runners for the CLI

pub mod copy;
pub mod verify;
