//! Fixed clinic scheduling tools.
//!
//! Three hand-declared tools covering the booking conversation: find the
//! patient, list free slots, book the appointment. Each performs exactly
//! one upstream call. The wire field names (`cpf`, `born`, `chat_id`, ...)
//! are the remote contract and must not be renamed.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content};
use serde_json::{json, Value};

use crate::arguments::{ArgumentMap, ArgumentValue};
use crate::error::{BridgeError, InvokeError, Result};
use crate::projection::{HttpMethod, ParamKind, ParamSpec, ParameterSchema, ToolDefinition};
use crate::registry::{ToolHandler, ToolRegistry};
use crate::remote::ApiClient;

const CHANNEL_ID: &str = "whatsapp_integration";
const PHONE_DIAL_CODE: &str = "55";
const FALLBACK_PHONE: &str = "000000000";

/// Clinic identifiers attached to every slot query and booking. Loaded
/// once from the environment; missing ones abort startup.
#[derive(Debug, Clone, Copy)]
pub struct ClinicIds {
    pub place_id: i64,
    pub event_id: i64,
    pub account_id: i64,
    pub user_id: i64,
    pub insurance_id: i64,
}

impl ClinicIds {
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        match (
            config.place_id,
            config.event_id,
            config.account_id,
            config.user_id,
        ) {
            (Some(place_id), Some(event_id), Some(account_id), Some(user_id)) => Ok(Self {
                place_id,
                event_id,
                account_id,
                user_id,
                insurance_id: config.insurance_id,
            }),
            _ => {
                let mut missing = Vec::new();
                if config.place_id.is_none() {
                    missing.push("PLACE_ID");
                }
                if config.event_id.is_none() {
                    missing.push("EVENT_ID");
                }
                if config.account_id.is_none() {
                    missing.push("ACCOUNT_ID");
                }
                if config.user_id.is_none() {
                    missing.push("USER_ID");
                }
                Err(BridgeError::Config(format!(
                    "static tool source requires {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Register the three clinic tools.
pub fn register_clinic_tools(
    registry: &mut ToolRegistry,
    api: ApiClient,
    ids: ClinicIds,
) -> Result<()> {
    registry.register(
        ToolDefinition {
            name: "search_patient".to_string(),
            description: "Search for a patient by name or tax id to find their internal id."
                .to_string(),
            params: ParameterSchema::Declared(vec![
                ParamSpec::optional("name", ParamKind::String, "Patient name"),
                ParamSpec::optional("tax_id", ParamKind::String, "Patient tax id"),
            ]),
        },
        Arc::new(SearchPatient { api: api.clone() }),
    )?;

    registry.register(
        ToolDefinition {
            name: "list_available_slots".to_string(),
            description: "List available appointment slots on the clinic calendar.".to_string(),
            params: ParameterSchema::Declared(vec![ParamSpec::required(
                "date",
                ParamKind::String,
                "Date in YYYY-MM-DD format",
            )]),
        },
        Arc::new(ListSlots {
            api: api.clone(),
            ids,
        }),
    )?;

    registry.register(
        ToolDefinition {
            name: "book_appointment".to_string(),
            description: "Book the appointment for a patient at a chosen slot.".to_string(),
            params: ParameterSchema::Declared(vec![
                ParamSpec::required(
                    "start_date",
                    ParamKind::String,
                    "Exact date and time: 'YYYY-MM-DD HH:mm'",
                ),
                ParamSpec::required("patient_id", ParamKind::String, "Numeric id of the patient"),
                ParamSpec::optional("phone", ParamKind::String, "Phone number, digits only"),
            ]),
        },
        Arc::new(BookAppointment { api, ids }),
    )?;

    Ok(())
}

struct SearchPatient {
    api: ApiClient,
}

#[async_trait]
impl ToolHandler for SearchPatient {
    async fn call(&self, args: ArgumentMap) -> std::result::Result<CallToolResult, InvokeError> {
        let mut query = ArgumentMap::new();
        if let Some(name) = args.get("name") {
            query.insert("name".to_string(), name.clone());
        }
        if let Some(tax_id) = args.get("tax_id") {
            query.insert("cpf".to_string(), tax_id.clone());
        }

        tracing::info!(filters = query.len(), "searching patients");
        let payload = self.api.execute(HttpMethod::Get, "/patients", &query).await?;
        let reduced = reduce_patients(payload);
        Ok(CallToolResult::success(vec![Content::text(
            reduced.to_string(),
        )]))
    }
}

struct ListSlots {
    api: ApiClient,
    ids: ClinicIds,
}

#[async_trait]
impl ToolHandler for ListSlots {
    async fn call(&self, args: ArgumentMap) -> std::result::Result<CallToolResult, InvokeError> {
        let date = required_str(&args, "date")?;

        let mut query = ArgumentMap::new();
        query.insert("date".to_string(), ArgumentValue::String(date.to_string()));
        query.insert("place_id".to_string(), ArgumentValue::Number(self.ids.place_id.into()));
        query.insert("event_id".to_string(), ArgumentValue::Number(self.ids.event_id.into()));
        query.insert(
            "insurance_id".to_string(),
            ArgumentValue::Number(self.ids.insurance_id.into()),
        );
        query.insert("user_id".to_string(), ArgumentValue::Number(self.ids.user_id.into()));

        tracing::info!(date = date, "listing available slots");
        let payload = self.api.execute(HttpMethod::Get, "/calendar", &query).await?;
        Ok(CallToolResult::success(vec![Content::text(
            payload.to_string(),
        )]))
    }
}

struct BookAppointment {
    api: ApiClient,
    ids: ClinicIds,
}

#[async_trait]
impl ToolHandler for BookAppointment {
    async fn call(&self, args: ArgumentMap) -> std::result::Result<CallToolResult, InvokeError> {
        let start_date = required_str(&args, "start_date")?;
        let patient_id = required_str(&args, "patient_id")?;
        let phone = args.get("phone").and_then(ArgumentValue::as_str);

        let body = booking_body(&self.ids, start_date, patient_id, phone)?;

        tracing::info!(patient_id = patient_id, start_date = start_date, "booking appointment");
        let payload = self
            .api
            .execute(HttpMethod::Post, "/attendances", &body)
            .await?;

        let created = match payload.get("id") {
            Some(id) => id.clone(),
            None => payload,
        };
        Ok(CallToolResult::success(vec![Content::text(format!(
            "Success! ID: {created}"
        ))]))
    }
}

fn required_str<'a>(args: &'a ArgumentMap, name: &str) -> std::result::Result<&'a str, InvokeError> {
    args.get(name)
        .and_then(ArgumentValue::as_str)
        .ok_or_else(|| InvokeError::Arguments(format!("missing required argument \"{name}\"")))
}

/// Assemble the booking body: configured clinic identifiers, the caller's
/// slot and patient, and the constants the upstream expects on every
/// bot-originated booking.
fn booking_body(
    ids: &ClinicIds,
    start_date: &str,
    patient_id: &str,
    phone: Option<&str>,
) -> std::result::Result<ArgumentMap, InvokeError> {
    let patient: i64 = patient_id.trim().parse().map_err(|_| {
        InvokeError::Arguments(format!("patient_id must be numeric, got \"{patient_id}\""))
    })?;

    let phone = phone.filter(|p| !p.is_empty()).unwrap_or(FALLBACK_PHONE);

    let mut body = ArgumentMap::new();
    body.insert("insurance_id".to_string(), ArgumentValue::Number(ids.insurance_id.into()));
    body.insert("event_id".to_string(), ArgumentValue::Number(ids.event_id.into()));
    body.insert("user_id".to_string(), ArgumentValue::Number(ids.user_id.into()));
    body.insert("place_id".to_string(), ArgumentValue::Number(ids.place_id.into()));
    body.insert("start_date".to_string(), ArgumentValue::String(start_date.to_string()));
    body.insert("patient_id".to_string(), ArgumentValue::Number(patient.into()));
    body.insert("account_id".to_string(), ArgumentValue::Number(ids.account_id.into()));
    body.insert("chat_id".to_string(), ArgumentValue::String(CHANNEL_ID.to_string()));
    body.insert(
        "scheduler_phone_dial_code".to_string(),
        ArgumentValue::String(PHONE_DIAL_CODE.to_string()),
    );
    body.insert("scheduler_phone".to_string(), ArgumentValue::String(phone.to_string()));
    body.insert("is_dependent_schedule".to_string(), ArgumentValue::Bool(false));
    Ok(body)
}

/// Reduce the upstream patient listing to the fields the agent needs.
/// `phone` prefers the contact cellphone and falls back to the main one;
/// `birth_date` maps the upstream `born` field. Non-array payloads pass
/// through untouched.
fn reduce_patients(payload: Value) -> Value {
    match payload.as_array() {
        Some(records) => Value::Array(records.iter().map(reduce_patient).collect()),
        None => payload,
    }
}

fn reduce_patient(record: &Value) -> Value {
    let phone = non_empty(record, "contact_cellphone")
        .or_else(|| non_empty(record, "cellphone"))
        .unwrap_or(Value::Null);

    json!({
        "id": record.get("id").cloned().unwrap_or(Value::Null),
        "name": record.get("name").cloned().unwrap_or(Value::Null),
        "phone": phone,
        "birth_date": record.get("born").cloned().unwrap_or(Value::Null),
    })
}

fn non_empty(record: &Value, field: &str) -> Option<Value> {
    match record.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(value) => Some(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids() -> ClinicIds {
        ClinicIds {
            place_id: 10,
            event_id: 20,
            account_id: 30,
            user_id: 40,
            insurance_id: 1,
        }
    }

    #[test]
    fn test_booking_body_combines_ids_and_constants() {
        let body = booking_body(&ids(), "2026-08-25 14:00", "42", None).unwrap();
        let body = serde_json::to_value(&body).unwrap();

        assert_eq!(body["patient_id"], json!(42));
        assert_eq!(body["insurance_id"], json!(1));
        assert_eq!(body["place_id"], json!(10));
        assert_eq!(body["account_id"], json!(30));
        assert_eq!(body["start_date"], json!("2026-08-25 14:00"));
        assert_eq!(body["chat_id"], json!("whatsapp_integration"));
        assert_eq!(body["scheduler_phone_dial_code"], json!("55"));
        assert_eq!(body["scheduler_phone"], json!("000000000"));
        assert_eq!(body["is_dependent_schedule"], json!(false));
    }

    #[test]
    fn test_booking_body_keeps_caller_phone() {
        let body = booking_body(&ids(), "2026-08-25 14:00", "42", Some("11988887777")).unwrap();
        assert_eq!(
            body["scheduler_phone"],
            ArgumentValue::String("11988887777".to_string())
        );
    }

    #[test]
    fn test_booking_body_rejects_non_numeric_patient() {
        let err = booking_body(&ids(), "2026-08-25 14:00", "forty-two", None).unwrap_err();
        assert!(err.to_string().contains("must be numeric"));
    }

    #[test]
    fn test_patient_reduction_prefers_contact_cellphone() {
        let reduced = reduce_patients(json!([
            {
                "id": 7,
                "name": "Maria Silva",
                "contact_cellphone": "11999990000",
                "cellphone": "1133334444",
                "born": "1990-01-02",
                "address": "should be dropped"
            },
            {
                "id": 8,
                "name": "Jose Santos",
                "contact_cellphone": "",
                "cellphone": "1155556666",
                "born": null
            }
        ]));

        assert_eq!(
            reduced,
            json!([
                {"id": 7, "name": "Maria Silva", "phone": "11999990000", "birth_date": "1990-01-02"},
                {"id": 8, "name": "Jose Santos", "phone": "1155556666", "birth_date": null}
            ])
        );
    }

    #[test]
    fn test_patient_reduction_passes_through_non_array() {
        let payload = json!({"error": "unexpected shape"});
        assert_eq!(reduce_patients(payload.clone()), payload);
    }

    #[test]
    fn test_clinic_ids_report_all_missing_vars() {
        let config = crate::config::Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            source: crate::config::ToolSource::Static,
            spec_url: None,
            api_url: None,
            api_token: None,
            place_id: None,
            event_id: Some(20),
            account_id: None,
            user_id: Some(40),
            insurance_id: 1,
            shutdown_timeout_secs: 5,
        };

        let err = ClinicIds::from_config(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PLACE_ID"));
        assert!(message.contains("ACCOUNT_ID"));
        assert!(!message.contains("EVENT_ID"));
    }
}
