use crate::domain::cata::{Feedback, Hint};
use instant::Instant;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activity identity (unique within a page)
pub type ActivityId = String;

/// Attempt identifier issued by the host
pub type AttemptGuid = String;

/// Timestamp in milliseconds since application start (monotonic)
///
/// Host-side triggers (check, mutation) are compared by equality only, so a
/// host may also supply its own clock via [`Timestamp::from_millis`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp representing the current moment
    pub fn now() -> Self {
        static ANCHOR: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let anchor = ANCHOR.get_or_init(Instant::now);

        let elapsed = Instant::now().duration_since(*anchor);
        Timestamp(elapsed.as_millis() as u64)
    }

    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// State of one part of an attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartState {
    pub attempt_guid: AttemptGuid,
    pub attempt_number: u32,
    pub date_evaluated: Option<Timestamp>,
    pub score: Option<f64>,
    pub out_of: Option<f64>,
    #[serde(default)]
    pub response: serde_json::Value,
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub hints: Vec<Hint>,
    pub part_id: String,
    pub has_more_attempts: bool,
    pub has_more_hints: bool,
}

impl PartState {
    /// Fresh, unevaluated part attempt
    pub fn new(attempt_guid: impl Into<AttemptGuid>, part_id: impl Into<String>) -> Self {
        Self {
            attempt_guid: attempt_guid.into(),
            attempt_number: 1,
            date_evaluated: None,
            score: None,
            out_of: None,
            response: serde_json::Value::Null,
            feedback: None,
            hints: Vec::new(),
            part_id: part_id.into(),
            has_more_attempts: true,
            has_more_hints: true,
        }
    }
}

/// Latest known attempt of an activity.
///
/// Replaced wholesale when grading completes; never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptState {
    /// Owning activity, when the host reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<ActivityId>,
    pub attempt_guid: AttemptGuid,
    pub attempt_number: u32,
    pub date_evaluated: Option<Timestamp>,
    pub score: Option<f64>,
    pub out_of: Option<f64>,
    #[serde(default)]
    pub parts: Vec<PartState>,
    pub has_more_attempts: bool,
    pub has_more_hints: bool,
}

impl AttemptState {
    /// First attempt, nothing evaluated yet
    pub fn new(attempt_guid: impl Into<AttemptGuid>) -> Self {
        Self {
            activity_id: None,
            attempt_guid: attempt_guid.into(),
            attempt_number: 1,
            date_evaluated: None,
            score: None,
            out_of: None,
            parts: Vec::new(),
            has_more_attempts: true,
            has_more_hints: true,
        }
    }

    pub fn for_activity(mut self, activity_id: impl Into<ActivityId>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    pub fn with_part(mut self, part: PartState) -> Self {
        self.parts.push(part);
        self
    }

    pub fn with_score(mut self, score: f64, out_of: f64) -> Self {
        self.score = Some(score);
        self.out_of = Some(out_of);
        self
    }

    pub fn evaluated_at(mut self, at: Timestamp) -> Self {
        self.date_evaluated = Some(at);
        self
    }

    pub fn is_evaluated(&self) -> bool {
        self.date_evaluated.is_some()
    }

    pub fn part(&self, part_attempt_guid: &str) -> Option<&PartState> {
        self.parts
            .iter()
            .find(|p| p.attempt_guid == part_attempt_guid)
    }
}

/// Grading results reported by the host at the end of a check cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResults {
    /// Matches the timestamp of the check that produced these results
    pub timestamp: Timestamp,

    /// Attempt state after grading
    pub attempt: AttemptState,

    /// Evaluation actions (feedback, navigation, mutations); opaque here
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

impl CheckResults {
    pub fn new(timestamp: Timestamp, attempt: AttemptState) -> Self {
        Self {
            timestamp,
            attempt,
            results: Vec::new(),
        }
    }

    pub fn with_results(mut self, results: Vec<serde_json::Value>) -> Self {
        self.results = results;
        self
    }
}
