//! Payload Classifier
//!
//! Maps an untyped `FieldBag` from one of the edit dialogs onto the client
//! record it belongs to, by looking for signature keys.
//!
//! Signature sets are checked in a fixed priority order:
//!
//! ```text
//! Dietary -> PersonalCare -> MedicalInfo -> PersonalInfo -> ClientProfile (fallback)
//! ```
//!
//! The first set with any key present in the bag wins. Presence is key
//! membership only: `false`, `""` and `[]` all count. A bag with no signature
//! key is a client-profile save (the personal-info dialog only carries
//! name/contact fields).
//!
//! Callers that know their target should tag the request instead
//! (see [`resolve_target`]); classification is the path for untagged bags.

use care_records_types::{EntityKind, FieldBag};

/// Signature keys per entity, in priority order.
///
/// Order matters: a bag carrying both a dietary and a personal-care key is a
/// dietary save.
pub const SIGNATURES: &[(EntityKind, &[&str])] = &[
    (
        EntityKind::Dietary,
        &[
            "dietary_restrictions",
            "food_allergies",
            "food_preferences",
            "meal_preferences",
            "texture_modification",
            "fluid_requirements",
        ],
    ),
    (
        EntityKind::PersonalCare,
        &[
            "personal_hygiene_needs",
            "bathing_preferences",
            "dressing_assistance_level",
            "grooming_preferences",
            "oral_care_needs",
            "continence_support",
        ],
    ),
    (
        EntityKind::MedicalInfo,
        &[
            "medical_conditions",
            "medications",
            "allergies",
            "gp_details",
            "nhs_number",
            "mobility_needs",
        ],
    ),
    (
        EntityKind::PersonalInfo,
        &[
            "cultural_preferences",
            "religious_beliefs",
            "preferred_language",
            "communication_needs",
            "life_history",
            "hobbies_interests",
            "important_people",
            "likes",
            "dislikes",
        ],
    ),
];

/// Why a bag landed where it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    /// Caller tagged the request explicitly
    Tagged,
    /// First signature key found, in priority order
    SignatureKey(&'static str),
    /// Nothing matched
    Fallback,
}

/// Outcome of routing an edit payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: EntityKind,
    pub evidence: Evidence,
}

/// Classify a bag by signature keys. Total and pure.
pub fn classify(bag: &FieldBag) -> EntityKind {
    classify_with_evidence(bag).kind
}

/// Classify and report the key that decided it
pub fn classify_with_evidence(bag: &FieldBag) -> Classification {
    SIGNATURES
        .iter()
        .find_map(|(kind, keys)| {
            keys.iter()
                .find(|key| bag.contains_key(key))
                .map(|key| Classification {
                    kind: *kind,
                    evidence: Evidence::SignatureKey(*key),
                })
        })
        .unwrap_or(Classification {
            kind: EntityKind::default(),
            evidence: Evidence::Fallback,
        })
}

/// Use the explicit tag when present, otherwise classify the bag
pub fn resolve_target(tag: Option<EntityKind>, bag: &FieldBag) -> Classification {
    match tag {
        Some(kind) => Classification {
            kind,
            evidence: Evidence::Tagged,
        },
        None => classify_with_evidence(bag),
    }
}

/// Signature keys for one entity (empty for the fallback)
pub fn signature_keys(kind: EntityKind) -> &'static [&'static str] {
    SIGNATURES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use care_records_types::FieldValue;

    #[test]
    fn test_food_allergies_is_dietary() {
        let bag = FieldBag::new().with("food_allergies", vec!["nuts"]);
        assert_eq!(classify(&bag), EntityKind::Dietary);
    }

    #[test]
    fn test_cultural_preferences_is_personal_info() {
        let bag = FieldBag::new().with("cultural_preferences", "halal");
        assert_eq!(classify(&bag), EntityKind::PersonalInfo);
    }

    #[test]
    fn test_name_only_falls_back_to_client_profile() {
        let bag = FieldBag::new().with("first_name", "Jane");
        let result = classify_with_evidence(&bag);
        assert_eq!(result.kind, EntityKind::ClientProfile);
        assert_eq!(result.evidence, Evidence::Fallback);
    }

    #[test]
    fn test_empty_bag_falls_back() {
        assert_eq!(classify(&FieldBag::new()), EntityKind::ClientProfile);
    }

    #[test]
    fn test_dietary_beats_personal_care() {
        let bag = FieldBag::new()
            .with("bathing_preferences", "evening shower")
            .with("food_preferences", "vegetarian");
        let result = classify_with_evidence(&bag);
        assert_eq!(result.kind, EntityKind::Dietary);
        assert_eq!(result.evidence, Evidence::SignatureKey("food_preferences"));
    }

    #[test]
    fn test_personal_care_beats_medical() {
        let bag = FieldBag::new()
            .with("medications", vec!["metformin"])
            .with("dressing_assistance_level", "partial");
        assert_eq!(classify(&bag), EntityKind::PersonalCare);
    }

    #[test]
    fn test_medical_beats_personal_info() {
        let bag = FieldBag::new()
            .with("likes", vec!["gardening"])
            .with("allergies", vec!["penicillin"]);
        assert_eq!(classify(&bag), EntityKind::MedicalInfo);
    }

    #[test]
    fn test_falsy_values_still_count() {
        let bag = FieldBag::new().with("personal_hygiene_needs", "");
        assert_eq!(classify(&bag), EntityKind::PersonalCare);

        let bag = FieldBag::new().with("dietary_restrictions", FieldValue::empty_list());
        assert_eq!(classify(&bag), EntityKind::Dietary);

        let bag = FieldBag::new().with("nhs_number", false);
        assert_eq!(classify(&bag), EntityKind::MedicalInfo);
    }

    #[test]
    fn test_tag_overrides_classification() {
        let bag = FieldBag::new().with("food_allergies", vec!["nuts"]);
        let result = resolve_target(Some(EntityKind::MedicalInfo), &bag);
        assert_eq!(result.kind, EntityKind::MedicalInfo);
        assert_eq!(result.evidence, Evidence::Tagged);

        assert_eq!(resolve_target(None, &bag).kind, EntityKind::Dietary);
    }

    #[test]
    fn test_signature_sets_are_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for (_, keys) in SIGNATURES {
            for key in *keys {
                assert!(seen.insert(*key), "duplicate signature key {key}");
            }
        }
        assert!(signature_keys(EntityKind::ClientProfile).is_empty());
        assert!(signature_keys(EntityKind::Dietary).contains(&"food_allergies"));
    }
}
