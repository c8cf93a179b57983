//! Payload preparation
//!
//! Before a bag reaches a port it gets the client id merged in, and "add"
//! records get their defaults: a `status` where the record has one, and empty
//! lists for list fields the dialog left out. Defaults only fill absent keys.

use care_records_types::{ClientId, FieldBag, FieldValue, RecordKind};

/// Key the client id is written under
pub const CLIENT_ID_FIELD: &str = "client_id";
pub const STATUS_FIELD: &str = "status";

/// Defaults applied to a newly created record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordDefaults {
    pub has_status: bool,
    pub list_fields: &'static [&'static str],
}

pub fn defaults_for(record: RecordKind) -> RecordDefaults {
    let (has_status, list_fields): (bool, &'static [&'static str]) = match record {
        RecordKind::Note => (false, &[]),
        RecordKind::Event => (false, &["attendees"]),
        RecordKind::Goal => (true, &["milestones"]),
        RecordKind::Activity => (true, &["participants"]),
        RecordKind::Assessment => (true, &["recommendations"]),
        RecordKind::Equipment => (true, &[]),
        RecordKind::RiskAssessment => (true, &["control_measures"]),
        RecordKind::ServicePlan => (true, &["goals"]),
        RecordKind::ServiceAction => (true, &["assigned_staff"]),
        // Entity updates are partial; never invent fields for them
        RecordKind::PersonalInfo
        | RecordKind::MedicalInfo
        | RecordKind::Dietary
        | RecordKind::PersonalCare
        | RecordKind::ClientProfile => (false, &[]),
    };
    RecordDefaults {
        has_status,
        list_fields,
    }
}

/// Write the dispatching client's id into the bag.
///
/// The dispatch argument wins over anything the dialog put there.
pub fn merge_client_id(fields: &mut FieldBag, client_id: &ClientId) {
    let previous = fields.insert(CLIENT_ID_FIELD, client_id.as_str());
    if let Some(previous) = previous {
        if previous.as_text() != Some(client_id.as_str()) {
            tracing::warn!(
                client_id = %client_id,
                submitted = ?previous,
                "Payload carried a different client_id; using the dispatch client"
            );
        }
    }
}

/// Full preparation for a statically routed "add" record
pub fn prepare_new_record(
    record: RecordKind,
    mut fields: FieldBag,
    client_id: &ClientId,
    default_status: &str,
) -> FieldBag {
    let defaults = defaults_for(record);
    if defaults.has_status {
        fields.insert_if_absent(STATUS_FIELD, default_status);
    }
    for field in defaults.list_fields {
        fields.insert_if_absent(*field, FieldValue::empty_list());
    }
    merge_client_id(&mut fields, client_id);
    fields
}
