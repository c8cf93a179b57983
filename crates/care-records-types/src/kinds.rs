//! Record kinds
//!
//! `EntityKind` is the closed set of client records an edit dialog can land
//! in. `RecordKind` widens that with the records the "add" dialogs create, and
//! is the key the dispatcher looks ports up by.

use serde::{Deserialize, Serialize};

/// Client record an edit dialog's field bag is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    PersonalInfo,
    MedicalInfo,
    Dietary,
    PersonalCare,
    /// Core name/contact record; the fallback for unrecognised bags
    #[default]
    ClientProfile,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        Self::PersonalInfo,
        Self::MedicalInfo,
        Self::Dietary,
        Self::PersonalCare,
        Self::ClientProfile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalInfo => "personal_info",
            Self::MedicalInfo => "medical_info",
            Self::Dietary => "dietary",
            Self::PersonalCare => "personal_care",
            Self::ClientProfile => "client_profile",
        }
    }

    /// Human label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            Self::PersonalInfo => "Personal information",
            Self::MedicalInfo => "Medical information",
            Self::Dietary => "Dietary information",
            Self::PersonalCare => "Personal care",
            Self::ClientProfile => "Client profile",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every record type a save can be written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Note,
    Event,
    Goal,
    Activity,
    Assessment,
    Equipment,
    RiskAssessment,
    ServicePlan,
    ServiceAction,
    PersonalInfo,
    MedicalInfo,
    Dietary,
    PersonalCare,
    ClientProfile,
}

impl RecordKind {
    pub const ALL: [RecordKind; 14] = [
        Self::Note,
        Self::Event,
        Self::Goal,
        Self::Activity,
        Self::Assessment,
        Self::Equipment,
        Self::RiskAssessment,
        Self::ServicePlan,
        Self::ServiceAction,
        Self::PersonalInfo,
        Self::MedicalInfo,
        Self::Dietary,
        Self::PersonalCare,
        Self::ClientProfile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Event => "event",
            Self::Goal => "goal",
            Self::Activity => "activity",
            Self::Assessment => "assessment",
            Self::Equipment => "equipment",
            Self::RiskAssessment => "risk_assessment",
            Self::ServicePlan => "service_plan",
            Self::ServiceAction => "service_action",
            Self::PersonalInfo => "personal_info",
            Self::MedicalInfo => "medical_info",
            Self::Dietary => "dietary",
            Self::PersonalCare => "personal_care",
            Self::ClientProfile => "client_profile",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Event => "Event",
            Self::Goal => "Goal",
            Self::Activity => "Activity",
            Self::Assessment => "Assessment",
            Self::Equipment => "Equipment",
            Self::RiskAssessment => "Risk assessment",
            Self::ServicePlan => "Service plan",
            Self::ServiceAction => "Service action",
            Self::PersonalInfo => EntityKind::PersonalInfo.label(),
            Self::MedicalInfo => EntityKind::MedicalInfo.label(),
            Self::Dietary => EntityKind::Dietary.label(),
            Self::PersonalCare => EntityKind::PersonalCare.label(),
            Self::ClientProfile => EntityKind::ClientProfile.label(),
        }
    }

    /// The client entity behind this record, if it is one
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Self::PersonalInfo => Some(EntityKind::PersonalInfo),
            Self::MedicalInfo => Some(EntityKind::MedicalInfo),
            Self::Dietary => Some(EntityKind::Dietary),
            Self::PersonalCare => Some(EntityKind::PersonalCare),
            Self::ClientProfile => Some(EntityKind::ClientProfile),
            _ => None,
        }
    }
}

impl From<EntityKind> for RecordKind {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::PersonalInfo => Self::PersonalInfo,
            EntityKind::MedicalInfo => Self::MedicalInfo,
            EntityKind::Dietary => Self::Dietary,
            EntityKind::PersonalCare => Self::PersonalCare,
            EntityKind::ClientProfile => Self::ClientProfile,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entity_is_client_profile() {
        assert_eq!(EntityKind::default(), EntityKind::ClientProfile);
    }

    #[test]
    fn test_entity_record_mapping_is_lossless() {
        for kind in EntityKind::ALL {
            assert_eq!(RecordKind::from(kind).entity(), Some(kind));
            assert_eq!(RecordKind::from(kind).as_str(), kind.as_str());
        }
        assert_eq!(RecordKind::Note.entity(), None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&RecordKind::RiskAssessment).unwrap(),
            "\"risk_assessment\""
        );
        let kind: EntityKind = serde_json::from_str("\"personal_care\"").unwrap();
        assert_eq!(kind, EntityKind::PersonalCare);
    }
}
