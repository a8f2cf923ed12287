//! Redirect decisions.
//!
//! Pure functions: the caller performs the navigation and makes sure each
//! navigation event is evaluated at most once.

use crate::section::Section;
use crate::types::RedirectDecision;
use crate::url::Location;

/// Pick the first enabled redirect section whose current path matches.
///
/// `sections` must already be filtered to enabled sections. Config order is
/// the tie-break, so the result is deterministic. The target keeps the
/// current search and hash.
pub fn decide<'s, I>(sections: I, location: &Location<'_>) -> RedirectDecision
where
    I: IntoIterator<Item = &'s Section>,
{
    let winner = sections
        .into_iter()
        .filter(|section| section.is_redirect_section() && section.applies_to(location.host))
        .find(|section| section.matches_path(location.path));

    match winner.and_then(|section| Some((section, section.new_path()?))) {
        Some((section, new_path)) => {
            let target = format!("{}{}{}{}", location.origin, new_path, location.search, location.hash);
            RedirectDecision::redirect_to(target, section.id())
        }
        None => RedirectDecision::stay(),
    }
}

/// Does any redirect section apply on `hostname`?
pub fn has_redirects_for_host<'s, I>(sections: I, hostname: &str) -> bool
where
    I: IntoIterator<Item = &'s Section>,
{
    sections
        .into_iter()
        .any(|section| section.is_redirect_section() && section.applies_to(hostname))
}
