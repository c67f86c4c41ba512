//! Documents published to the reads collection and replicated to devices.

use super::client::ClientRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in `syncTs`.
pub const SYNC_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientGroupRef {
    pub id: u64,
    pub name: String,
    pub leader: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Default)]
#[serde(default)]
pub struct Location {
    pub longitude: f32,
    pub latitude: f32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub primary_phone_number: String,
    pub secondary_phone_number: Option<String>,
    pub email: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub account_no: String,
    pub active: bool,
    pub activation_date: Vec<String>,
    pub firstname: String,
    pub lastname: String,
    pub display_name: String,
    pub office_id: u32,
    pub dob: String,
    pub gender: String,
    pub national_id_number: String,
    pub location: Location,
    pub contacts: Contact,
    pub group: ClientGroupRef,
    pub channels: Vec<String>,
    pub sync_ts: String,
    pub r#type: String,
}

impl ClientDocument {
    pub fn document_id(account_no: &str) -> String {
        format!("clients_{}", account_no)
    }

    /// Converts a core banking client into the document devices sync.
    pub fn from_record(record: &ClientRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::document_id(&record.account_no),
            account_no: record.account_no.clone(),
            active: record.active,
            activation_date: record
                .activation_date
                .iter()
                .map(|part| part.to_string())
                .collect(),
            firstname: record.firstname.clone(),
            lastname: record.lastname.clone(),
            display_name: record.display_name.clone(),
            office_id: record.office_id,
            dob: record
                .birth_date()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            gender: record.gender.name.clone(),
            national_id_number: record.external_id.clone(),
            location: Location::default(),
            contacts: Contact {
                primary_phone_number: record.mobile_no.clone(),
                ..Contact::default()
            },
            group: ClientGroupRef::default(),
            channels: vec![format!("clients_{}", record.office_id)],
            sync_ts: now.format(SYNC_TS_FORMAT).to_string(),
            r#type: "clients".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupConfigurations {
    pub min_clients_in_group: u32,
    pub max_clients_in_group: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupDocument {
    pub id: String,
    pub account_no: String,
    pub name: String,
    pub active: bool,
    pub activation_date: Vec<String>,
    pub office_id: u32,
    pub office_name: String,
    pub channels: Vec<String>,
    pub configurations: GroupConfigurations,
    pub sync_ts: String,
    pub r#type: String,
}

impl GroupDocument {
    pub fn document_id(account_no: &str) -> String {
        format!("groups_{}", account_no)
    }
}
