//! Hostname matching for platform sections.
//!
//! A section names a platform ("twitter", "reddit", ...) rather than a list of
//! hosts. Known platforms expand to a curated alias table; anything else
//! falls back to `{platform, platform.com, www.platform.com}`.
//!
//! Matching is substring containment, not domain-suffix matching, so regional
//! and mobile subdomains match without extra config. The flip side is that
//! coincidental hosts match too:
//!
//! ```
//! use pf_core::hostname::applies_to;
//!
//! assert!(applies_to("twitter", "mobile.x.com"));
//! assert!(applies_to("twitter", "nottwitter.example.com"));
//! assert!(!applies_to("twitter", "example.org"));
//! ```

use std::borrow::Cow;

// =============================================================================
// Alias Tables
// =============================================================================

/// Curated host aliases for platforms whose hosts don't follow `name.com`.
const PLATFORM_ALIASES: &[(&str, &[&str])] = &[
    ("twitter", &["twitter.com", "x.com", "www.twitter.com", "www.x.com"]),
    (
        "reddit",
        &["reddit.com", "www.reddit.com", "old.reddit.com", "new.reddit.com"],
    ),
    ("youtube", &["youtube.com", "www.youtube.com", "m.youtube.com"]),
    ("linkedin", &["linkedin.com", "www.linkedin.com"]),
    (
        "facebook",
        &["facebook.com", "www.facebook.com", "fb.com", "m.facebook.com"],
    ),
    ("instagram", &["instagram.com", "www.instagram.com"]),
    ("tiktok", &["tiktok.com", "www.tiktok.com"]),
    ("pinterest", &["pinterest.com", "www.pinterest.com"]),
];

/// Look up the curated aliases for a platform (case-insensitive).
pub fn known_aliases(platform: &str) -> Option<&'static [&'static str]> {
    PLATFORM_ALIASES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(platform))
        .map(|(_, aliases)| *aliases)
}

/// All host strings accepted for `platform`, lower-cased.
pub fn platform_variations(platform: &str) -> Vec<Cow<'static, str>> {
    if let Some(aliases) = known_aliases(platform) {
        return aliases.iter().map(|a| Cow::Borrowed(*a)).collect();
    }

    let platform = platform.to_ascii_lowercase();
    vec![
        Cow::Owned(format!("{platform}.com")),
        Cow::Owned(format!("www.{platform}.com")),
        Cow::Owned(platform),
    ]
}

// =============================================================================
// Matching
// =============================================================================

/// Does a section for `platform` apply on `hostname`?
///
/// An empty platform never applies.
pub fn applies_to(platform: &str, hostname: &str) -> bool {
    if platform.trim().is_empty() {
        return false;
    }

    let host = hostname.to_ascii_lowercase();
    platform_variations(platform)
        .iter()
        .any(|variation| host.contains(variation.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_alias_hosts() {
        assert!(applies_to("twitter", "x.com"));
        assert!(applies_to("twitter", "mobile.x.com"));
        assert!(applies_to("Twitter", "WWW.TWITTER.COM"));
        assert!(applies_to("reddit", "old.reddit.com"));
        assert!(applies_to("facebook", "fb.com"));
        assert!(applies_to("youtube", "m.youtube.com"));
    }

    #[test]
    fn test_substring_looseness() {
        // Containment, not suffix matching
        assert!(applies_to("twitter", "nottwitter.example.com"));
        assert!(applies_to("twitter", "box.com"));
    }

    #[test]
    fn test_known_platform_does_not_fall_back() {
        // "twitter" alone is not in the twitter alias table
        assert!(!applies_to("twitter", "twitter.local"));
    }

    #[test]
    fn test_fallback_variations() {
        assert!(applies_to("mastodon", "mastodon.social"));
        assert!(applies_to("Bsky", "bsky.app"));
        assert!(!applies_to("mastodon", "example.com"));

        let variations = platform_variations("Threads");
        assert!(variations.iter().any(|v| v == "threads.com"));
        assert!(variations.iter().any(|v| v == "www.threads.com"));
        assert!(variations.iter().any(|v| v == "threads"));
    }

    #[test]
    fn test_empty_platform_never_applies() {
        assert!(!applies_to("", "twitter.com"));
        assert!(!applies_to("   ", "twitter.com"));
    }

    #[test]
    fn test_known_aliases_lookup() {
        assert_eq!(known_aliases("TikTok"), Some(&["tiktok.com", "www.tiktok.com"][..]));
        assert_eq!(known_aliases("myspace"), None);
    }
}
