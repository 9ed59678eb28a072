//! Artifact mover: sort loose archive files into per-package directories.

pub mod alias;
pub mod mover;
pub mod pattern;
