use crate::report::Report;

/// Render a report as a plain-text document.
///
/// Categories appear in first-seen order, not the sorted order of the
/// summary line.
pub fn render_text(report: &Report) -> String {
    let summary = report.summary();
    let mut lines: Vec<String> = Vec::new();

    lines.push("AI-READY GENETIC TRAIT SUMMARY".to_string());
    lines.push("=".repeat(40));
    lines.push(format!(
        "Number of traits interpreted: {}",
        summary.num_traits_found
    ));
    lines.push(format!("Categories: {}", summary.categories.join(", ")));
    lines.push(String::new());

    for (category, traits) in report.traits_by_category() {
        lines.push(format!("\n## {}", category));
        lines.push("-".repeat(4 + category.chars().count()));

        for t in traits {
            lines.push(format!("\nTrait: {}", t.trait_name));
            lines.push(format!(
                "Gene: {} ({}) — Genotype: {}",
                t.gene, t.rsid, t.user_genotype
            ));
            lines.push(format!("Effect: {}  [{}]", t.effect_label, t.effect_level));
            lines.push(format!("Explanation: {}", t.explanation));
            lines.push(format!("Evidence: {}", t.evidence_strength));
            lines.push(String::new());
        }
    }

    lines.join("\n")
}
