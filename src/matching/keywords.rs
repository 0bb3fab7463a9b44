use crate::domain::models::IdentityRecord;

/// Streaming service display names (lowercase) to the short tags release
/// groups and subtitle sites use.
const SERVICE_SHORT_NAMES: &[(&str, &str)] = &[
    ("amazon prime", "AMZN"),
    ("netflix", "NF"),
    ("disney+", "DSNP"),
    ("hbo max", "HMAX"),
    ("hbo", "HBO"),
    ("apple tv+", "ATVP"),
    ("hulu", "HULU"),
    ("peacock", "PCOK"),
    ("paramount+", "PMTP"),
    ("itunes", "iT"),
];

pub fn service_short_name(service: &str) -> Option<&'static str> {
    let key = service.to_lowercase();
    SERVICE_SHORT_NAMES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, short)| *short)
}

/// Search keywords, most specific first. Callers broaden a search by dropping
/// entries from the tail; the first entry is always the title.
pub fn plan(identity: &IdentityRecord) -> Vec<String> {
    let mut base = identity.title.clone();
    if let Some(season) = identity.season {
        base.push_str(&format!(" s{season:02}"));
    }
    let mut keywords = vec![base];

    if let Some(episode) = identity.episode {
        keywords.push(format!(" e{episode:02}"));
    }
    if let Some(format) = &identity.format {
        keywords.push(format.clone());
    }
    if let Some(group) = &identity.release_group {
        keywords.push(group.clone());
    }
    if let Some(short) = identity.source.as_deref().and_then(service_short_name) {
        keywords.push(short.to_string());
    }
    if let Some(size) = &identity.screen_size {
        keywords.push(size.clone());
    }
    keywords
}
