use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A classroom group document from the `groups` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: String,
    pub name: String,
    pub department: String,
    pub teacher_name: String,
    pub teacher_email: String,
    pub max_students: u32,
    pub duration: String,
    pub break_time: u32,
    pub description: String,
    pub is_active: bool,
    #[serde(default)]
    pub student_count: u32,
    #[schema(value_type = Option<String>, format = "date-time", example = "2025-01-15T08:30:00Z")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time", example = "2025-01-15T08:30:00Z")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A classroom record staged for insertion. Carries no identity; the store
/// assigns document ids and timestamps at write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClassroom {
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub teacher_email: String,
    pub max_students: u32,
    pub duration: String,
    pub break_time: u32,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
}

/// Create-classroom request body. Mirrors the admin form: duration comes in
/// as whole hours and is stored as a `"{n}h"` string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassroom {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub teacher_email: String,
    pub max_students: Option<u32>,
    pub duration_hours: Option<u32>,
    pub break_time: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// A student document from the `groups/{id}/students` subcollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_number: String,
    pub email: String,
}

/// Classroom detail response: the group plus its (possibly filtered) roster.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupDetail {
    pub group: Classroom,
    pub students: Vec<Student>,
}

/// Outcome of a bulk import request. `errors` holds row-level messages when
/// the upload was rejected without writing anything.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    pub created: usize,
    pub errors: Vec<String>,
}

impl Classroom {
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.department.to_lowercase().contains(&term)
            || self.teacher_name.to_lowercase().contains(&term)
    }
}

impl Student {
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.roll_number.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
    }
}
