use crate::schema::{applications, candidates, jobs};
use chrono::{NaiveDateTime, SubsecRound, Utc};
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current UTC time at the store's (microsecond) precision.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

/// Timestamp for a mutation; never earlier than the record's previous `updated_at`.
pub fn touch(previous: NaiveDateTime) -> NaiveDateTime {
    std::cmp::max(now(), previous)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, DbEnum)]
#[ExistingTypePath = "crate::schema::sql_types::ApplicationStatusType"]
#[DbValueStyle = "PascalCase"]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Interviewed,
    Hired,
    Rejected,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "Pending"),
            ApplicationStatus::Reviewed => write!(f, "Reviewed"),
            ApplicationStatus::Interviewed => write!(f, "Interviewed"),
            ApplicationStatus::Hired => write!(f, "Hired"),
            ApplicationStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RootMessage {
    pub msg: String,
}

// jobs

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(example = "example_job_payload")]
pub struct JobPayload {
    pub title: String,

    pub description: String,

    pub company: String,
}

fn example_job_payload() -> JobPayload {
    JobPayload {
        title: "Engineer".to_string(),
        description: "Build things".to_string(),
        company: "Acme".to_string(),
    }
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Job {
    pub id: i32,

    pub title: String,

    pub description: String,

    pub company: String,

    pub created_at: NaiveDateTime,

    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub company: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewJob {
    pub fn new(payload: JobPayload) -> NewJob {
        let timestamp = now();
        NewJob {
            title: payload.title,
            description: payload.description,
            company: payload.company,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = jobs)]
pub struct JobChanges {
    pub title: String,
    pub description: String,
    pub company: String,
    pub updated_at: NaiveDateTime,
}

impl JobChanges {
    pub fn new(payload: JobPayload, updated_at: NaiveDateTime) -> JobChanges {
        JobChanges {
            title: payload.title,
            description: payload.description,
            company: payload.company,
            updated_at,
        }
    }
}

// candidates

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(example = "example_candidate_payload")]
pub struct CandidatePayload {
    pub name: String,

    pub email: String,

    pub resume: Option<String>,

    pub contact_number: Option<String>,
}

fn example_candidate_payload() -> CandidatePayload {
    CandidatePayload {
        name: "Ann".to_string(),
        email: "ann@x.com".to_string(),
        resume: Some("https://example.com/ann.pdf".to_string()),
        contact_number: None,
    }
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[diesel(table_name = candidates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Candidate {
    pub id: i32,

    pub name: String,

    pub email: String,

    pub resume: Option<String>,

    pub contact_number: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = candidates)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub resume: Option<String>,
    pub contact_number: Option<String>,
}

impl NewCandidate {
    pub fn new(payload: CandidatePayload) -> NewCandidate {
        NewCandidate {
            name: payload.name,
            email: payload.email,
            resume: payload.resume,
            contact_number: payload.contact_number,
        }
    }
}

// applications

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApplicationPayload {
    pub candidate_id: i32,

    pub job_id: i32,

    #[serde(default = "ApplicationStatus::default")]
    pub status: ApplicationStatus,
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Application {
    pub id: i32,

    pub candidate_id: i32,

    pub job_id: i32,

    pub status: ApplicationStatus,

    pub created_at: NaiveDateTime,

    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = applications)]
pub struct NewApplication {
    pub candidate_id: i32,
    pub job_id: i32,
    pub status: ApplicationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewApplication {
    pub fn new(payload: ApplicationPayload) -> NewApplication {
        let timestamp = now();
        NewApplication {
            candidate_id: payload.candidate_id,
            job_id: payload.job_id,
            status: payload.status,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

/// Updates overwrite the whole create payload, references included.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = applications)]
pub struct ApplicationChanges {
    pub candidate_id: i32,
    pub job_id: i32,
    pub status: ApplicationStatus,
    pub updated_at: NaiveDateTime,
}

impl ApplicationChanges {
    pub fn new(payload: ApplicationPayload, updated_at: NaiveDateTime) -> ApplicationChanges {
        ApplicationChanges {
            candidate_id: payload.candidate_id,
            job_id: payload.job_id,
            status: payload.status,
            updated_at,
        }
    }
}
