pub mod cata;
pub mod schema;
pub mod simulate;

pub use cata::{apply_actions, grade, list_rules, new_model, GradeReport, RuleListing};
pub use schema::{schema, SCHEMA_NAMES};
pub use simulate::{run as simulate, Scenario, ScenarioStep, SimulationReport};
