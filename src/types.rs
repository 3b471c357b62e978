use serde::{Deserialize, Serialize};

/// Lookup key of the trait catalog: an rsID plus an upper-cased genotype.
///
/// Allele order is significant, so `AG` and `GA` are distinct keys.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct CatalogKey {
    pub rsid: String,
    pub genotype: String,
}

impl CatalogKey {
    /// Build a key, trimming both parts and upper-casing the genotype.
    pub fn new(rsid: &str, genotype: &str) -> Self {
        Self {
            rsid: rsid.trim().to_string(),
            genotype: genotype.trim().to_uppercase(),
        }
    }
}

/// One interpretation row of the curated trait catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraitDefinition {
    pub rsid: String,
    pub genotype: String,
    pub trait_id: String,
    pub trait_name: String,
    pub category: String,
    pub gene: String,
    pub effect_label: String,
    pub effect_level: String,
    pub explanation: String,
    pub evidence_strength: String,
}

impl TraitDefinition {
    pub fn key(&self) -> CatalogKey {
        CatalogKey {
            rsid: self.rsid.clone(),
            genotype: self.genotype.clone(),
        }
    }
}

/// A single row of an uploaded genotype file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantRecord {
    pub rsid: String,
    pub chromosome: String,
    pub position: String,
    pub genotype: String,
}

impl VariantRecord {
    pub fn key(&self) -> CatalogKey {
        CatalogKey {
            rsid: self.rsid.clone(),
            genotype: self.genotype.clone(),
        }
    }
}

/// A catalog definition joined with the genotype observed in the user's file.
///
/// Serializes to the `traits[]` element of the report wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedTrait {
    pub trait_id: String,
    pub trait_name: String,
    pub category: String,
    pub rsid: String,
    pub gene: String,
    pub user_genotype: String,
    pub effect_label: String,
    pub effect_level: String,
    pub explanation: String,
    pub evidence_strength: String,
}

impl MatchedTrait {
    pub fn from_definition(definition: &TraitDefinition, variant: &VariantRecord) -> Self {
        Self {
            trait_id: definition.trait_id.clone(),
            trait_name: definition.trait_name.clone(),
            category: definition.category.clone(),
            rsid: definition.rsid.clone(),
            gene: definition.gene.clone(),
            user_genotype: variant.genotype.clone(),
            effect_label: definition.effect_label.clone(),
            effect_level: definition.effect_level.clone(),
            explanation: definition.explanation.clone(),
            evidence_strength: definition.evidence_strength.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_key_normalizes_genotype_only() {
        let key = CatalogKey::new(" rs762551 ", " ag ");
        assert_eq!(key.rsid, "rs762551");
        assert_eq!(key.genotype, "AG");
        assert_ne!(key, CatalogKey::new("rs762551", "GA"));
    }

    #[test]
    fn test_matched_trait_takes_genotype_from_variant() {
        let definition = TraitDefinition {
            rsid: "rs1".to_string(),
            genotype: "CT".to_string(),
            trait_id: "t1".to_string(),
            trait_name: "Name".to_string(),
            category: "Sleep".to_string(),
            gene: "GENE".to_string(),
            effect_label: "label".to_string(),
            effect_level: "TYPICAL".to_string(),
            explanation: "text".to_string(),
            evidence_strength: "Moderate".to_string(),
        };
        let variant = VariantRecord {
            rsid: "rs1".to_string(),
            chromosome: "2".to_string(),
            position: "100".to_string(),
            genotype: "CT".to_string(),
        };

        let matched = MatchedTrait::from_definition(&definition, &variant);
        assert_eq!(matched.user_genotype, "CT");
        assert_eq!(matched.category, "Sleep");
        assert_eq!(matched.trait_id, "t1");
    }
}
