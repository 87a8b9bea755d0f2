pub mod application;
pub mod domain;

pub use application::{CataAction, CataEditor, CataEvent};
pub use domain::{
    ActivityDescriptor, ActivityId, AttemptGuid, AttemptState, BridgeEventKind, BridgeResult,
    CataError, CataModel, CataVariant, CheckResults, ChoiceId, Message, MessageBoard,
    NavigationMode, NotificationType, PartState, RichText, Rule, Severity, Snapshot, Timestamp,
};
pub use domain::{
    create_rule_for_ids, invert_rule, project_init_state_facts, set_difference, union_rules,
};
