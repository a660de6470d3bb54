use crate::TaggedLocation;

/// Records sharing a category, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Category name; the section header.
    pub category: String,
    /// Records in this category.
    pub records: Vec<TaggedLocation>,
}

/// Group records into sections ordered by category name, each sorted by
/// date.
#[must_use]
pub fn sections_by_category(records: &[TaggedLocation]) -> Vec<Section> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.category.cmp(&b.category).then(a.date.cmp(&b.date)));

    let mut sections: Vec<Section> = Vec::new();
    for record in sorted {
        match sections.last_mut() {
            Some(section) if section.category == record.category => section.records.push(record),
            _ => sections.push(Section {
                category: record.category.clone(),
                records: vec![record],
            }),
        }
    }
    sections
}
