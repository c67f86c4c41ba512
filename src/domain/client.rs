//! Client payloads exchanged with mobile devices and the core banking API.

use crate::error::{GatewayError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Client-creation payload embedded as a JSON string in `requestData`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClientCreationRequest {
    pub client_id: ClientIdentification,
    pub client_bio: ClientBio,
    pub client_address: ClientBodyAddress,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdentification {
    pub document_type_id: u32,
    pub document_key: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClientBio {
    #[serde(default)]
    pub office_id: Option<serde_json::Value>,
    #[serde(default)]
    pub fullname: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub group_id: Option<serde_json::Value>,
    #[serde(default)]
    pub date_format: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub activation_date: String,
    #[serde(default)]
    pub gender_id: String,
    #[serde(default)]
    pub primary_phone_number: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientBodyAddress {
    pub street: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub city: String,
    pub state_province_id: Option<i64>,
    pub country_id: Option<i64>,
    pub postal_code: Option<i64>,
}

impl ClientCreationRequest {
    /// Decodes the loosely-typed `requestData` string.
    ///
    /// The identification and bio sections are mandatory, as are the client's
    /// first and last name.
    pub fn decode(raw: &str) -> Result<Self> {
        let request: Self =
            serde_json::from_str(raw).map_err(|e| GatewayError::DecodeFailed(e.to_string()))?;
        if request.client_bio.firstname.trim().is_empty()
            || request.client_bio.lastname.trim().is_empty()
        {
            return Err(GatewayError::DecodeFailed(
                "client name must not be empty".to_string(),
            ));
        }
        Ok(request)
    }

    /// Builds the core banking creation body for this request.
    pub fn to_create_body(&self, office_id: u32, today: NaiveDate) -> CreateClientBody {
        CreateClientBody {
            client_address: ClientAddress::placeholder(&self.client_bio.locale),
            family_members: Vec::new(),
            office_id,
            legal_form_id: 1,
            firstname: self.client_bio.firstname.clone(),
            lastname: self.client_bio.lastname.clone(),
            mobile_no: self.client_bio.primary_phone_number.clone(),
            locale: self.client_bio.locale.clone(),
            active: true,
            date_format: CORE_DATE_FORMAT_PATTERN.to_string(),
            activation_date: today.format(CORE_DATE_FORMAT).to_string(),
            date_of_birth: DEFAULT_DATE_OF_BIRTH.to_string(),
            identifiers: vec![ClientIdentifier {
                document_type_id: self.client_id.document_type_id,
                document_key: self.client_id.document_key.clone(),
                status: "ACTIVE".to_string(),
            }],
        }
    }
}

/// Pattern announced to the core banking API in `dateFormat`.
pub const CORE_DATE_FORMAT_PATTERN: &str = "dd MMMM yyyy";
/// `chrono` equivalent of [`CORE_DATE_FORMAT_PATTERN`].
pub const CORE_DATE_FORMAT: &str = "%d %B %Y";
const DEFAULT_DATE_OF_BIRTH: &str = "01 January 1990";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClientAddress {
    pub street: String,
    pub address_line1: String,
    pub address_line2: String,
    pub close_town: String,
    pub village_name: String,
    pub cell_name: String,
    pub city: String,
    pub postal_code: String,
    pub latitude: String,
    pub longitude: String,
    pub locale: String,
}

impl ClientAddress {
    fn placeholder(locale: &str) -> Self {
        Self {
            street: NOT_AVAILABLE.to_string(),
            address_line1: NOT_AVAILABLE.to_string(),
            address_line2: NOT_AVAILABLE.to_string(),
            close_town: NOT_AVAILABLE.to_string(),
            village_name: NOT_AVAILABLE.to_string(),
            cell_name: NOT_AVAILABLE.to_string(),
            city: NOT_AVAILABLE.to_string(),
            postal_code: NOT_AVAILABLE.to_string(),
            latitude: "0.0".to_string(),
            longitude: "0.0".to_string(),
            locale: locale.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdentifier {
    pub document_type_id: u32,
    pub document_key: String,
    pub status: String,
}

/// Body of `POST /clients` on the core banking API.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientBody {
    pub client_address: ClientAddress,
    pub family_members: Vec<serde_json::Value>,
    pub office_id: u32,
    pub legal_form_id: u32,
    pub firstname: String,
    pub lastname: String,
    pub mobile_no: String,
    pub locale: String,
    pub active: bool,
    pub date_format: String,
    pub activation_date: String,
    pub date_of_birth: String,
    pub identifiers: Vec<ClientIdentifier>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateClientResponse {
    pub office_id: u32,
    pub client_id: u64,
    pub resource_id: u64,
    pub account_no: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeValue {
    pub id: u32,
    pub name: String,
}

/// Client record as returned by the core banking API.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientRecord {
    pub id: u64,
    pub account_no: String,
    pub external_id: String,
    pub active: bool,
    pub activation_date: Vec<i32>,
    pub firstname: String,
    pub lastname: String,
    pub display_name: String,
    pub mobile_no: String,
    pub date_of_birth: Vec<i32>,
    pub gender: CodeValue,
    pub office_id: u32,
    pub office_name: String,
}

impl ClientRecord {
    /// Date of birth, if the API sent a valid `[y, m, d]` triple.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        match self.date_of_birth.as_slice() {
            [year, month, day] => {
                NaiveDate::from_ymd_opt(*year, u32::try_from(*month).ok()?, u32::try_from(*day).ok()?)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientPage {
    pub total_filtered_records: u64,
    pub page_items: Vec<ClientRecord>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookResponse {
    pub resource_id: u64,
}

/// Change notification pushed by the core banking API.
///
/// Only the changed resource id matters here; the rest is kept for logging.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookPayload {
    pub created_by_name: String,
    pub entity_name: String,
    pub action_name: String,
    pub response: WebhookResponse,
}
