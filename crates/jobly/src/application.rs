//! Application state of a user's relationship to a job.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::query::query;
use crate::row::RowExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a user stands with a job posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationState {
    #[default]
    Applied,
    Interested,
    Accepted,
    Rejected,
}

impl ApplicationState {
    pub const ALL: [ApplicationState; 4] = [
        ApplicationState::Applied,
        ApplicationState::Interested,
        ApplicationState::Accepted,
        ApplicationState::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Interested => "interested",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Resolve an optional requested state; `None` means [`ApplicationState::Applied`].
    pub fn resolve(requested: Option<&str>) -> JoblyResult<Self> {
        requested.map_or(Ok(Self::default()), str::parse)
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationState {
    type Err = JoblyError;

    fn from_str(s: &str) -> JoblyResult<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                JoblyError::validation(format!(
                    "invalid application state '{s}', expected one of: applied, interested, accepted, rejected"
                ))
            })
    }
}

const UPSERT_APPLICATION: &str = "INSERT INTO applications (username, job_id, state) \
     VALUES ($1, $2, $3) \
     ON CONFLICT (username, job_id) DO UPDATE SET state = EXCLUDED.state \
     RETURNING state";

/// Record `requested` (default `applied`) as the state of `username`'s
/// application to `job_id`, creating the application if needed.
///
/// The requested state is validated before the statement is issued. Setting
/// the current state again just re-persists it. Missing users or jobs surface
/// as the storage layer's foreign-key violation, unchanged.
pub async fn set_application_status(
    conn: &impl GenericClient,
    username: &str,
    job_id: i32,
    requested: Option<&str>,
) -> JoblyResult<ApplicationState> {
    let state = ApplicationState::resolve(requested)?;

    let row = query(UPSERT_APPLICATION)
        .tag("applications.upsert")
        .bind(username.to_string())
        .bind(job_id)
        .bind(state.as_str())
        .fetch_one(conn)
        .await?;

    let stored: String = row.try_get_column("state")?;
    stored.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_state_defaults_to_applied() {
        assert_eq!(
            ApplicationState::resolve(None).unwrap(),
            ApplicationState::Applied
        );
    }

    #[test]
    fn every_known_state_parses() {
        for state in ApplicationState::ALL {
            assert_eq!(
                ApplicationState::resolve(Some(state.as_str())).unwrap(),
                state
            );
        }
    }

    #[test]
    fn unknown_state_is_a_validation_error() {
        let err = ApplicationState::resolve(Some("hired")).unwrap_err();
        assert!(err.is_validation());
        // case-sensitive, like the stored values
        assert!(ApplicationState::resolve(Some("Accepted")).is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ApplicationState::Interested).unwrap();
        assert_eq!(json, r#""interested""#);
    }
}
