use std::borrow::Cow;

use super::guess::MetadataGuesser;
use super::identity::IdentityExtractor;
use crate::domain::models::IdentityRecord;

/// Either side of a match: an already extracted identity or a raw file name.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Identity(&'a IdentityRecord),
    Name(&'a str),
}

impl<'a> From<&'a IdentityRecord> for Subject<'a> {
    fn from(identity: &'a IdentityRecord) -> Self {
        Subject::Identity(identity)
    }
}

impl<'a> From<&'a str> for Subject<'a> {
    fn from(name: &'a str) -> Self {
        Subject::Name(name)
    }
}

impl<'a> From<&'a String> for Subject<'a> {
    fn from(name: &'a String) -> Self {
        Subject::Name(name)
    }
}

/// Exact equality on title, source, season and episode. A field present on one
/// side and absent on the other is a mismatch.
pub fn identities_match(a: &IdentityRecord, b: &IdentityRecord) -> bool {
    a.title == b.title && a.source == b.source && a.season == b.season && a.episode == b.episode
}

impl<G: MetadataGuesser> IdentityExtractor<G> {
    pub fn matches<'a, 'b>(&self, a: impl Into<Subject<'a>>, b: impl Into<Subject<'b>>) -> bool {
        let a = self.resolve(a.into());
        let b = self.resolve(b.into());
        identities_match(&a, &b)
    }

    fn resolve<'s>(&self, subject: Subject<'s>) -> Cow<'s, IdentityRecord> {
        match subject {
            Subject::Identity(identity) => Cow::Borrowed(identity),
            Subject::Name(name) => Cow::Owned(self.extract(name)),
        }
    }
}
