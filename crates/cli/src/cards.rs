//! The static report-card catalog.

/// A predefined report the operator can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCard {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub file_type: &'static str,
}

pub const ALL_CARDS: &[ReportCard] = &[ReportCard {
    id: "1",
    name: "Service Request Report",
    description: "Get the list of fields and default details for the SR in an XLSX file.",
    tags: &["Service Request", "SR", "SR fields"],
    file_type: "XLSX",
}];

/// Case-insensitive substring filter over card name and description.
pub fn search_cards(query: &str) -> Vec<&'static ReportCard> {
    let query = query.to_lowercase();
    ALL_CARDS
        .iter()
        .filter(|card| {
            card.name.to_lowercase().contains(&query)
                || card.description.to_lowercase().contains(&query)
        })
        .collect()
}
