pub mod activity;
pub mod attempt;
pub mod cata;
pub mod content;
pub mod events;
pub mod messages;
pub mod results;
pub mod rule;

pub use activity::ActivityDescriptor;
pub use attempt::{ActivityId, AttemptGuid, AttemptState, CheckResults, PartState, Timestamp};
pub use cata::{
    Authoring, CataError, CataModel, CataVariant, Choice, ChoiceIdsToResponseId, Feedback, Hint,
    HintId, Part, Response, ResponseId, Stem,
};
pub use content::RichText;
pub use events::{
    project_init_state_facts, BridgeEventKind, NavigationMode, NotificationType, Snapshot,
    UnknownEventKind,
};
pub use messages::{Message, MessageBoard, Severity};
pub use results::BridgeResult;
pub use rule::{create_rule_for_ids, invert_rule, set_difference, union_rules, ChoiceId, Rule};
