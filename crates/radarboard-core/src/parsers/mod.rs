//! Parsers for the markdown archive
//!
//! All parsers are pure and tolerant: they never fail, unparsable lines are
//! skipped and records missing required fields are dropped (see
//! [`diagnostics`]).

pub mod diagnostics;
pub mod drafts;
pub mod format;
pub mod frontmatter;
pub mod lanes;
pub mod newsletter;
pub mod radar;

pub use diagnostics::{Diagnostic, DropReason, ParseReport};
pub use drafts::DraftsParser;
pub use format::RadarFormat;
pub use frontmatter::{Frontmatter, FrontmatterBlock};
pub use lanes::{LaneRule, LaneTable};
pub use newsletter::NewsletterParser;
pub use radar::{RadarParser, RawSection, SectionSplit, SourceLine};
