use tracing::debug;

use crate::catalog::TraitCatalog;
use crate::types::{MatchedTrait, VariantRecord};

/// Join variants against the catalog on the exact `(rsid, genotype)` key.
///
/// Output follows input order; variants without a catalog entry are dropped.
/// An empty result is a normal outcome.
pub fn match_traits(catalog: &TraitCatalog, variants: &[VariantRecord]) -> Vec<MatchedTrait> {
    let matched: Vec<MatchedTrait> = variants
        .iter()
        .filter_map(|variant| {
            catalog
                .get(&variant.key())
                .map(|definition| MatchedTrait::from_definition(definition, variant))
        })
        .collect();

    debug!(
        "Matched {} of {} variants against {} catalog entries",
        matched.len(),
        variants.len(),
        catalog.len()
    );
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSource;
    use crate::types::TraitDefinition;

    fn definition(rsid: &str, genotype: &str, name: &str) -> TraitDefinition {
        TraitDefinition {
            rsid: rsid.to_string(),
            genotype: genotype.to_string(),
            trait_id: format!("{rsid}_{genotype}"),
            trait_name: name.to_string(),
            category: "Nutrition".to_string(),
            gene: "GENE".to_string(),
            effect_label: "label".to_string(),
            effect_level: "HIGH".to_string(),
            explanation: "...".to_string(),
            evidence_strength: "Strong".to_string(),
        }
    }

    fn variant(rsid: &str, genotype: &str) -> VariantRecord {
        VariantRecord {
            rsid: rsid.to_string(),
            chromosome: "1".to_string(),
            position: "1".to_string(),
            genotype: genotype.to_string(),
        }
    }

    fn catalog() -> TraitCatalog {
        TraitCatalog::from_definitions(
            vec![
                definition("rs762551", "AA", "Caffeine Metabolism"),
                definition("rs4988235", "AG", "Lactose"),
            ],
            CatalogSource::Csv,
        )
    }

    #[test]
    fn test_matches_follow_input_order() {
        let variants = vec![
            variant("rs4988235", "AG"),
            variant("rs0000001", "AA"),
            variant("rs762551", "AA"),
        ];

        let matched = match_traits(&catalog(), &variants);
        let names: Vec<&str> = matched.iter().map(|t| t.trait_name.as_str()).collect();
        assert_eq!(names, vec!["Lactose", "Caffeine Metabolism"]);
        assert_eq!(matched, match_traits(&catalog(), &variants));
    }

    #[test]
    fn test_allele_order_is_not_canonicalized() {
        let matched = match_traits(&catalog(), &[variant("rs4988235", "GA")]);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_one_trait_per_matching_variant() {
        let variants = vec![variant("rs762551", "AA"), variant("rs762551", "AA")];
        let matched = match_traits(&catalog(), &variants);
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|t| t.user_genotype == "AA"));
    }

    #[test]
    fn test_empty_catalog_matches_nothing() {
        let matched = match_traits(&TraitCatalog::new(), &[variant("rs762551", "AA")]);
        assert!(matched.is_empty());
    }
}
