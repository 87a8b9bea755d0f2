use crate::infrastructure::{CliError, Result};
use activity_delivery_core::{
    ActivityDescriptor, AttemptState, CataAction, CataModel, CheckResults, Message,
};
use schemars::schema::RootSchema;
use schemars::schema_for;

/// Names accepted by `delivery-cli schema`
pub const SCHEMA_NAMES: [&str; 6] = [
    "cata-model",
    "cata-action",
    "attempt-state",
    "check-results",
    "activity-descriptor",
    "message",
];

pub fn schema(name: &str) -> Result<RootSchema> {
    let schema = match name {
        "cata-model" => schema_for!(CataModel),
        "cata-action" => schema_for!(CataAction),
        "attempt-state" => schema_for!(AttemptState),
        "check-results" => schema_for!(CheckResults),
        "activity-descriptor" => schema_for!(ActivityDescriptor),
        "message" => schema_for!(Message),
        other => return Err(CliError::UnknownSchema(other.to_string())),
    };
    Ok(schema)
}
