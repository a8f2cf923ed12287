//! Lookup over the configured sections.

use crate::section::Section;

/// The loaded section list, kept in config order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionCatalog {
    sections: Vec<Section>,
}

impl SectionCatalog {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    /// Section by id.
    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id() == id)
    }

    /// Distinct non-blank platform names, in the order they first appear.
    pub fn platforms(&self) -> Vec<&str> {
        let mut platforms: Vec<&str> = Vec::new();
        for section in &self.sections {
            if !section.platform().is_empty() && !platforms.contains(&section.platform()) {
                platforms.push(section.platform());
            }
        }
        platforms
    }

    /// Sections whose platform matches `hostname`.
    pub fn applicable(&self, hostname: &str) -> Vec<&Section> {
        self.sections
            .iter()
            .filter(|section| section.applies_to(hostname))
            .collect()
    }
}

impl From<Vec<Section>> for SectionCatalog {
    fn from(sections: Vec<Section>) -> Self {
        Self::new(sections)
    }
}
