/// Song report types
use crate::types::{ReportId, SongId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Moderation state of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

/// A user's complaint about a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub user_id: UserId,
    pub song_id: SongId,
    pub reason: String,
    pub detail: String,
    pub status: ReportStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data for filing a report
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub user_id: UserId,
    pub song_id: SongId,
    pub reason: String,
    pub detail: String,
}
