use std::collections::HashSet;

use pf_core::section::Section;

pub struct OptimizeStats {
    pub before: usize,
    pub after: usize,
    pub deduped: usize,
}

/// Drop sections whose id was already seen. The first occurrence wins so
/// config order keeps deciding redirect tie-breaks.
pub fn optimize_sections(sections: &mut Vec<Section>) -> OptimizeStats {
    let before = sections.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut deduped = 0usize;
    sections.retain(|section| {
        if seen.insert(section.id().to_string()) {
            true
        } else {
            log::warn!("Duplicate section id '{}', keeping the first", section.id());
            deduped += 1;
            false
        }
    });

    OptimizeStats {
        before,
        after: sections.len(),
        deduped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let mut sections = vec![
            Section::new("ads", "Ads", "twitter"),
            Section::new("feed", "Feed", "twitter"),
            Section::new("ads", "Ads again", "reddit"),
        ];
        let stats = optimize_sections(&mut sections);

        assert_eq!(stats.before, 3);
        assert_eq!(stats.after, 2);
        assert_eq!(stats.deduped, 1);
        assert_eq!(sections[0].name(), "Ads");
        assert_eq!(sections[1].id(), "feed");
    }
}
