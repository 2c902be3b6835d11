use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type GoalId = Uuid;

/// A tracked habit. Whether it is finished is derived from the counters,
/// see [`crate::progress::goal_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default = "Uuid::new_v4")]
    pub id: GoalId,
    pub name: String,
    #[serde(alias = "days")]
    pub target_days: u32,
    #[serde(default, alias = "completed")]
    pub completed_days: u32,
    #[serde(
        default,
        deserialize_with = "deserialize_stamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<NaiveDate>,
}

impl Goal {
    pub fn new(name: impl Into<String>, target_days: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_days,
            completed_days: 0,
            last_updated: None,
        }
    }
}

/// On-disk document; the collection lives under the `goals` key.
#[derive(Debug, Serialize)]
pub struct StoredGoals<'a> {
    pub goals: &'a [Goal],
}

/// Everything accepted when reading storage back. A bare array is what the
/// browser widget kept under its `goals` local-storage key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StoredDocument {
    Keyed { goals: Vec<Goal> },
    Bare(Vec<Goal>),
}

impl StoredDocument {
    pub fn into_goals(self) -> Vec<Goal> {
        match self {
            StoredDocument::Keyed { goals } | StoredDocument::Bare(goals) => goals,
        }
    }
}

// Accepts ISO dates as well as the `Fri Oct 16 2026` stamps the widget wrote;
// anything else, including the empty string, reads as "never".
fn deserialize_stamp<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_stamp))
}

fn parse_stamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%a %b %d %Y"))
        .ok()
}

/// A day count as typed into a text field or sent as a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DayInput {
    Number(serde_json::Number),
    Text(String),
}

impl DayInput {
    /// Text form of the input. Fractional numbers are truncated toward zero
    /// and written out in full, never in exponent notation.
    pub fn as_text(&self) -> String {
        match self {
            DayInput::Number(value) => match value.as_i64() {
                Some(days) => days.to_string(),
                None => value
                    .as_f64()
                    .map(|days| format!("{:.0}", days.trunc()))
                    .unwrap_or_default(),
            },
            DayInput::Text(value) => value.clone(),
        }
    }
}

/// Reads the leading integer of `raw`, the way a browser's `parseInt` does:
/// leading whitespace and a sign are allowed, anything after the digits is
/// ignored. Only counts above zero that fit in `u32` are returned.
pub fn parse_day_count(raw: &str) -> Option<u32> {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if negative || digits == 0 {
        return None;
    }
    rest[..digits].parse::<u32>().ok().filter(|days| *days > 0)
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target_days: Option<DayInput>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub keep_going: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExtendRequest {
    #[serde(default)]
    pub days: Option<DayInput>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Reached,
}

/// One rendered goal card. `index` is the on-screen position; actions are
/// addressed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalView {
    pub index: usize,
    pub id: GoalId,
    pub name: String,
    pub target_days: u32,
    pub completed_days: u32,
    pub last_updated: Option<NaiveDate>,
    pub percentage: u8,
    pub angle: f64,
    pub streak: String,
    pub status: GoalStatus,
    /// Open extend-or-stop prompt, so a reloaded page can pick it up again.
    #[serde(default)]
    pub flow: Option<FlowView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    pub revision: u64,
    pub goals: Vec<GoalView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayedMessage {
    pub text: String,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowView {
    pub goal_id: GoalId,
    pub state: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_amount: Option<String>,
    pub delay_ms: u64,
}

/// Reply to every mutating request: the re-rendered board plus whatever the
/// page should show next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub board: BoardResponse,
    #[serde(default)]
    pub clear_inputs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<DelayedMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub goal_count: usize,
    pub reached_count: usize,
    pub total_completed_days: u64,
    pub average_percentage: f64,
}
