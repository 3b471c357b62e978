use serde::Serialize;
use std::collections::BTreeSet;

use crate::types::MatchedTrait;

/// Headline figures of a report
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub num_traits_found: usize,
    pub categories: Vec<String>,
}

/// The aggregate handed to renderers and to the language model.
///
/// Only [`build_report`] constructs one, so `num_traits_found` always equals
/// the number of traits and `categories` is exactly their distinct
/// categories, sorted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    summary: ReportSummary,
    traits: Vec<MatchedTrait>,
}

impl Report {
    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Matched traits in first-match order from the genotype file
    pub fn traits(&self) -> &[MatchedTrait] {
        &self.traits
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Traits grouped by category, groups in first-seen order and traits in
    /// their original order within each group.
    pub fn traits_by_category(&self) -> Vec<(&str, Vec<&MatchedTrait>)> {
        let mut groups: Vec<(&str, Vec<&MatchedTrait>)> = Vec::new();
        for t in &self.traits {
            match groups.iter_mut().find(|(category, _)| *category == t.category) {
                Some((_, members)) => members.push(t),
                None => groups.push((t.category.as_str(), vec![t])),
            }
        }
        groups
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Aggregate matched traits into a report. Total; an empty input gives an
/// empty report.
pub fn build_report(matched: Vec<MatchedTrait>) -> Report {
    let categories: BTreeSet<&str> = matched.iter().map(|t| t.category.as_str()).collect();
    let summary = ReportSummary {
        num_traits_found: matched.len(),
        categories: categories.into_iter().map(String::from).collect(),
    };

    Report {
        summary,
        traits: matched,
    }
}
