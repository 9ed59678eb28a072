//! Activity logging: append-only JSONL with rotation and stderr fallback.

pub mod activity;
pub mod jsonl;
