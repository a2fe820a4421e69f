//! Data models for radarboard

pub mod draft;
pub mod meta;
pub mod newsletter;
pub mod radar;

pub use draft::{Draft, DraftStatus, DraftType, Priority};
pub use meta::{Meta, MetaValue};
pub use newsletter::NewsletterArticle;
pub use radar::{RadarDay, RadarItem, RadarSection};
