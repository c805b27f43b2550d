use std::io::Write;

use serde_json::Value;
use thiserror::Error;

use crate::client::{ActivityClient, ActivityQuery};
use crate::domain::{ActivityRecord, DecodeError};

pub const SEPARATOR: &str = "\t*\t";
pub const HEADER: &str = "#Time\t*\t#Action\t*\t#ActorID\t*\t#DocumentID\t*\t#OwnerID";
pub const NO_ACTIVITY: &str = "No activity.";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("malformed activity #{index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub time: String,
    pub action: String,
    pub actors: String,
    pub targets: String,
}

impl ActivityRow {
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        ActivityRecord::decode(value).map(|record| Self::from(&record))
    }
}

impl From<&ActivityRecord> for ActivityRow {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            time: record.time.label().to_string(),
            action: record.action.label(),
            actors: record.actors_label(),
            targets: record.targets_label(),
        }
    }
}

impl std::fmt::Display for ActivityRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.time, self.action, self.actors, self.targets
        )
    }
}

/// Writes the header and one row per activity.
///
/// Rows are written as they are decoded, so a malformed record stops the
/// report after the rows that precede it.
pub fn write_report<W: Write>(activities: &[Value], out: &mut W) -> Result<(), ReportError> {
    if activities.is_empty() {
        writeln!(out, "{NO_ACTIVITY}")?;
        return Ok(());
    }

    writeln!(out, "{HEADER}")?;
    for (index, activity) in activities.iter().enumerate() {
        let row = ActivityRow::decode(activity).map_err(|source| ReportError::Decode { index, source })?;
        writeln!(out, "{row}")?;
    }
    out.flush()?;
    Ok(())
}

/// Queries one page of activity and writes the report.
///
/// A failed query is reported on `out` as a single line and is not an error
/// for the caller; only decode and write failures are returned.
pub async fn report_activity<C, W>(client: &C, query: &ActivityQuery, out: &mut W) -> Result<(), ReportError>
where
    C: ActivityClient + ?Sized,
    W: Write,
{
    let activities = match client.query_activity(query).await {
        Ok(activities) => activities,
        Err(e) => {
            tracing::error!("Activity query failed: {}", e);
            writeln!(out, "An error occurred: {}", e)?;
            out.flush()?;
            return Ok(());
        }
    };

    write_report(&activities, out)
}
