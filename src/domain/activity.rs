use serde_json::Value;

use super::keys::{as_array, as_object, as_string, required};
use super::{ActionDetail, Actor, DecodeResult, Target};

/// One decoded entry of an `activity:query` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub time: TimeInfo,
    pub action: ActionDetail,
    pub actors: Vec<Actor>,
    pub targets: Vec<Target>,
}

/// When the activity happened. Consolidated activities carry a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeInfo {
    Timestamp(String),
    Range { end_time: String },
    Unknown,
}

impl TimeInfo {
    pub fn label(&self) -> &str {
        match self {
            Self::Timestamp(time) => time,
            Self::Range { end_time } => end_time,
            Self::Unknown => "unknown",
        }
    }
}

impl ActivityRecord {
    pub fn decode(value: &Value) -> DecodeResult<Self> {
        let object = as_object(value, "activity")?;

        let time = if let Some(timestamp) = object.get("timestamp") {
            TimeInfo::Timestamp(as_string(timestamp, "timestamp")?)
        } else if let Some(range) = object.get("timeRange") {
            let range = as_object(range, "timeRange")?;
            TimeInfo::Range {
                end_time: as_string(
                    required(range, "endTime", "timeRange.endTime")?,
                    "timeRange.endTime",
                )?,
            }
        } else {
            TimeInfo::Unknown
        };

        let action = ActionDetail::decode(required(
            object,
            "primaryActionDetail",
            "primaryActionDetail",
        )?)?;

        let actors = as_array(required(object, "actors", "actors")?, "actors")?
            .iter()
            .map(Actor::decode)
            .collect::<DecodeResult<Vec<_>>>()?;

        let targets = as_array(required(object, "targets", "targets")?, "targets")?
            .iter()
            .map(Target::decode)
            .collect::<DecodeResult<Vec<_>>>()?;

        Ok(Self {
            time,
            action,
            actors,
            targets,
        })
    }

    /// All actor labels run together.
    pub fn actors_label(&self) -> String {
        self.actors.iter().map(Actor::label).collect()
    }

    /// All target labels run together.
    pub fn targets_label(&self) -> String {
        self.targets.iter().map(Target::label).collect()
    }
}
