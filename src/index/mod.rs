//! Directory index generation: listings, checksums, READMEs and HTML pages.

pub mod checksum;
pub mod generator;
pub mod icons;
pub mod links;
pub mod listing;
pub mod markdown;
pub mod page;
