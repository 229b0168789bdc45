//! Entity documents and request payloads for samples and tests.

use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A laboratory specimen document as stored in the `samples` collection.
///
/// `id` is unset until the database assigns one on insert. `sample_id` is
/// the business identifier, generated server-side at creation time; clients
/// never supply it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    /// Storage identifier assigned by the database.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Server-generated business identifier.
    pub sample_id: String,
    /// Name of the patient the specimen was taken from.
    pub patient_name: String,
    /// Lab metadata as free-form string pairs.
    pub lab_info: HashMap<String, String>,
    /// Optional free-text description, stored as null when absent.
    #[serde(default)]
    pub description: Option<String>,
}

/// A lab test result document as stored in the `tests` collection.
///
/// `sample_id` references a sample but is not validated against the
/// samples collection. Optional fields are omitted from storage entirely
/// when not provided, never stored as null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabTest {
    /// Storage identifier assigned by the database.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Business identifier of the associated sample.
    pub sample_id: String,
    /// Type of the test (e.g. "cbc").
    pub test_type: String,
    /// Result of the test, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Units of the test result, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// Payload for creating a sample.
///
/// Carries no identifier fields: `sample_id` is generated server-side and
/// any stray identifier keys in the request body are ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSample {
    /// Name of the patient.
    pub patient_name: String,
    /// Lab metadata as free-form string pairs.
    pub lab_info: HashMap<String, String>,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload for creating a test via the standalone `/tests/` route.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLabTest {
    /// Business identifier of the associated sample.
    pub sample_id: String,
    /// Type of the test.
    pub test_type: String,
    /// Result of the test.
    #[serde(default)]
    pub result: Option<String>,
    /// Units of the test result.
    #[serde(default)]
    pub units: Option<String>,
}

/// Payload for creating a test nested under a sample path.
///
/// The `sample_id` always comes from the path; a conflicting value in the
/// body is ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSampleTest {
    /// Type of the test.
    pub test_type: String,
    /// Result of the test.
    #[serde(default)]
    pub result: Option<String>,
    /// Units of the test result.
    #[serde(default)]
    pub units: Option<String>,
}

/// Partial update for a sample. Only fields present in the request are
/// merged into the stored record.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SampleUpdate {
    /// New patient name.
    #[serde(default)]
    pub patient_name: Option<String>,
    /// Replacement lab metadata map.
    #[serde(default)]
    pub lab_info: Option<HashMap<String, String>>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
}

impl SampleUpdate {
    /// Build the `$set` document containing exactly the fields present.
    pub fn set_document(&self) -> Document {
        let mut set = Document::new();

        if let Some(patient_name) = &self.patient_name {
            set.insert("patient_name", patient_name.clone());
        }
        if let Some(lab_info) = &self.lab_info {
            set.insert("lab_info", map_to_document(lab_info));
        }
        if let Some(description) = &self.description {
            set.insert("description", description.clone());
        }

        set
    }
}

/// Partial update for a test. The compound key (`sample_id`, `test_type`)
/// selects the record; any field present here, including the key fields
/// themselves, is merged in.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LabTestUpdate {
    /// Re-point the test at a different sample.
    #[serde(default)]
    pub sample_id: Option<String>,
    /// Rename the test type.
    #[serde(default)]
    pub test_type: Option<String>,
    /// New result value.
    #[serde(default)]
    pub result: Option<String>,
    /// New units value.
    #[serde(default)]
    pub units: Option<String>,
}

impl LabTestUpdate {
    /// Build the `$set` document containing exactly the fields present.
    pub fn set_document(&self) -> Document {
        let mut set = Document::new();

        if let Some(sample_id) = &self.sample_id {
            set.insert("sample_id", sample_id.clone());
        }
        if let Some(test_type) = &self.test_type {
            set.insert("test_type", test_type.clone());
        }
        if let Some(result) = &self.result {
            set.insert("result", result.clone());
        }
        if let Some(units) = &self.units {
            set.insert("units", units.clone());
        }

        set
    }
}

fn map_to_document(map: &HashMap<String, String>) -> Document {
    map.iter()
        .map(|(k, v)| (k.clone(), Bson::String(v.clone())))
        .collect()
}

/// Generate a fresh business identifier for a sample.
pub fn new_sample_id() -> String {
    ObjectId::new().to_hex()
}
