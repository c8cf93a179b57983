//! Dialog and action kinds
//!
//! Every Save click names the action it came from. Actions map 1:1 onto the
//! dialog that raised them; the five edit actions share a single generic route
//! through the payload classifier, the rest go straight to a fixed record port.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::kinds::{EntityKind, RecordKind};

/// Unknown action or dialog name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {what} '{name}'")]
pub struct ParseKindError {
    pub what: &'static str,
    pub name: String,
}

/// The five edit dialogs that funnel through the generic save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditDialog {
    PersonalInfo,
    MedicalInfo,
    AboutMe,
    Dietary,
    PersonalCare,
}

impl EditDialog {
    pub const ALL: [EditDialog; 5] = [
        Self::PersonalInfo,
        Self::MedicalInfo,
        Self::AboutMe,
        Self::Dietary,
        Self::PersonalCare,
    ];

    /// Record a typed caller should tag this dialog's saves with.
    ///
    /// The personal-info dialog edits the core name/contact fields, which live
    /// on the client profile; the about-me dialog carries the personal
    /// preferences record.
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::PersonalInfo => EntityKind::ClientProfile,
            Self::MedicalInfo => EntityKind::MedicalInfo,
            Self::AboutMe => EntityKind::PersonalInfo,
            Self::Dietary => EntityKind::Dietary,
            Self::PersonalCare => EntityKind::PersonalCare,
        }
    }

    pub fn dialog(&self) -> DialogKind {
        match self {
            Self::PersonalInfo => DialogKind::EditPersonalInfo,
            Self::MedicalInfo => DialogKind::EditMedicalInfo,
            Self::AboutMe => DialogKind::EditAboutMe,
            Self::Dietary => DialogKind::EditDietary,
            Self::PersonalCare => DialogKind::EditPersonalCare,
        }
    }
}

/// Every modal dialog whose open/pending flags the session tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogKind {
    AddNote,
    AddEvent,
    AddGoal,
    AddActivity,
    AddAssessment,
    AddEquipment,
    AddRiskAssessment,
    AddServicePlan,
    AddServiceAction,
    EditPersonalInfo,
    EditMedicalInfo,
    EditAboutMe,
    EditDietary,
    EditPersonalCare,
}

impl DialogKind {
    pub const ALL: [DialogKind; 14] = [
        Self::AddNote,
        Self::AddEvent,
        Self::AddGoal,
        Self::AddActivity,
        Self::AddAssessment,
        Self::AddEquipment,
        Self::AddRiskAssessment,
        Self::AddServicePlan,
        Self::AddServiceAction,
        Self::EditPersonalInfo,
        Self::EditMedicalInfo,
        Self::EditAboutMe,
        Self::EditDietary,
        Self::EditPersonalCare,
    ];

    /// The edit dialogs closed together after a generic save
    pub const EDIT: [DialogKind; 5] = [
        Self::EditPersonalInfo,
        Self::EditMedicalInfo,
        Self::EditAboutMe,
        Self::EditDietary,
        Self::EditPersonalCare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddNote => "add-note",
            Self::AddEvent => "add-event",
            Self::AddGoal => "add-goal",
            Self::AddActivity => "add-activity",
            Self::AddAssessment => "add-assessment",
            Self::AddEquipment => "add-equipment",
            Self::AddRiskAssessment => "add-risk-assessment",
            Self::AddServicePlan => "add-service-plan",
            Self::AddServiceAction => "add-service-action",
            Self::EditPersonalInfo => "edit-personal-info",
            Self::EditMedicalInfo => "edit-medical-info",
            Self::EditAboutMe => "edit-about-me",
            Self::EditDietary => "edit-dietary",
            Self::EditPersonalCare => "edit-personal-care",
        }
    }

    pub fn is_edit(&self) -> bool {
        Self::EDIT.contains(self)
    }
}

impl std::fmt::Display for DialogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialogKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ParseKindError {
                what: "dialog",
                name: s.to_string(),
            })
    }
}

/// Where an action's payload goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRoute {
    /// Port fixed by the action itself
    Static(RecordKind),
    /// Port picked from the payload (or an explicit target tag)
    Classified,
}

/// A Save click, named by the dialog that raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionKind {
    AddNote,
    AddEvent,
    AddGoal,
    AddActivity,
    AddAssessment,
    AddEquipment,
    AddRiskAssessment,
    AddServicePlan,
    AddServiceAction,
    Edit(EditDialog),
}

impl ActionKind {
    pub fn dialog(&self) -> DialogKind {
        match self {
            Self::AddNote => DialogKind::AddNote,
            Self::AddEvent => DialogKind::AddEvent,
            Self::AddGoal => DialogKind::AddGoal,
            Self::AddActivity => DialogKind::AddActivity,
            Self::AddAssessment => DialogKind::AddAssessment,
            Self::AddEquipment => DialogKind::AddEquipment,
            Self::AddRiskAssessment => DialogKind::AddRiskAssessment,
            Self::AddServicePlan => DialogKind::AddServicePlan,
            Self::AddServiceAction => DialogKind::AddServiceAction,
            Self::Edit(edit) => edit.dialog(),
        }
    }

    pub fn route(&self) -> ActionRoute {
        match self {
            Self::AddNote => ActionRoute::Static(RecordKind::Note),
            Self::AddEvent => ActionRoute::Static(RecordKind::Event),
            Self::AddGoal => ActionRoute::Static(RecordKind::Goal),
            Self::AddActivity => ActionRoute::Static(RecordKind::Activity),
            Self::AddAssessment => ActionRoute::Static(RecordKind::Assessment),
            Self::AddEquipment => ActionRoute::Static(RecordKind::Equipment),
            Self::AddRiskAssessment => ActionRoute::Static(RecordKind::RiskAssessment),
            Self::AddServicePlan => ActionRoute::Static(RecordKind::ServicePlan),
            Self::AddServiceAction => ActionRoute::Static(RecordKind::ServiceAction),
            Self::Edit(_) => ActionRoute::Classified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.dialog().as_str()
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DialogKind> for ActionKind {
    fn from(dialog: DialogKind) -> Self {
        match dialog {
            DialogKind::AddNote => Self::AddNote,
            DialogKind::AddEvent => Self::AddEvent,
            DialogKind::AddGoal => Self::AddGoal,
            DialogKind::AddActivity => Self::AddActivity,
            DialogKind::AddAssessment => Self::AddAssessment,
            DialogKind::AddEquipment => Self::AddEquipment,
            DialogKind::AddRiskAssessment => Self::AddRiskAssessment,
            DialogKind::AddServicePlan => Self::AddServicePlan,
            DialogKind::AddServiceAction => Self::AddServiceAction,
            DialogKind::EditPersonalInfo => Self::Edit(EditDialog::PersonalInfo),
            DialogKind::EditMedicalInfo => Self::Edit(EditDialog::MedicalInfo),
            DialogKind::EditAboutMe => Self::Edit(EditDialog::AboutMe),
            DialogKind::EditDietary => Self::Edit(EditDialog::Dietary),
            DialogKind::EditPersonalCare => Self::Edit(EditDialog::PersonalCare),
        }
    }
}

impl FromStr for ActionKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<DialogKind>()
            .map(Self::from)
            .map_err(|_| ParseKindError {
                what: "action",
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for ActionKind {
    type Error = ParseKindError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ActionKind> for String {
    fn from(action: ActionKind) -> Self {
        action.as_str().to_string()
    }
}
