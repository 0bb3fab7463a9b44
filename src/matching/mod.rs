//! Filename identity, keyword planning, matching and subtitle scoring.

pub mod guess;
pub mod identity;
pub mod keywords;
pub mod matcher;
pub mod scorer;
pub mod similarity;

pub use guess::ReleaseNameGuesser;
pub use identity::IdentityExtractor;

pub type DefaultExtractor = IdentityExtractor<ReleaseNameGuesser>;
