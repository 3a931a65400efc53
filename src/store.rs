use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::models::{Classroom, NewClassroom, Student};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Classroom not found")]
    NotFound,
    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// One field of a stored document. Integers travel as JSON strings on the
/// wire, so they are kept as strings here and parsed on access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FieldValue {
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "integerValue")]
    Integer(String),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "timestampValue")]
    Timestamp(String),
}

impl FieldValue {
    pub fn integer(value: u32) -> Self {
        FieldValue::Integer(value.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) | FieldValue::Timestamp(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            FieldValue::Integer(raw) => raw.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommitRequest {
    writes: Vec<WriteOp>,
}

#[derive(Debug, Serialize)]
struct WriteOp {
    update: Document,
}

/// REST client for the hosted document store. `base_url` is the service
/// root including the API version; documents live under
/// `{database_path}/documents/...`.
#[derive(Clone)]
pub struct DocumentStore {
    client: reqwest::Client,
    base_url: Arc<Url>,
    database_path: String,
    auth_token: Option<String>,
}

impl DocumentStore {
    pub fn new(base_url: Url, project_id: &str, auth_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Arc::new(base_url),
            database_path: format!("projects/{project_id}/databases/(default)"),
            auth_token,
        }
    }

    pub async fn list_groups(&self) -> Result<Vec<Classroom>, StoreError> {
        let documents = self.list_collection("groups").await?;
        documents.iter().map(classroom_from_document).collect()
    }

    pub async fn get_group(&self, id: &str) -> Result<Classroom, StoreError> {
        let url = self.documents_url(&format!("groups/{id}"));
        let response = self.request(reqwest::Method::GET, url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        let document: Document = response.error_for_status()?.json().await?;
        classroom_from_document(&document)
    }

    pub async fn create_group(&self, record: &NewClassroom) -> Result<Classroom, StoreError> {
        let url = self.documents_url("groups");
        let document = Document {
            fields: classroom_fields(record, &rfc3339_now()),
            ..Document::default()
        };
        let created: Document = self
            .request(reqwest::Method::POST, url)
            .json(&document)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        classroom_from_document(&created)
    }

    pub async fn delete_group(&self, id: &str) -> Result<(), StoreError> {
        let url = self.documents_url(&format!("groups/{id}"));
        let response = self.request(reqwest::Method::DELETE, url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        response.error_for_status()?;
        Ok(())
    }

    pub async fn list_students(&self, group_id: &str) -> Result<Vec<Student>, StoreError> {
        let documents = self
            .list_collection(&format!("groups/{group_id}/students"))
            .await?;
        Ok(documents.iter().map(student_from_document).collect())
    }

    /// Stages every record as a fresh document and commits them in ONE batch
    /// write. The store applies the batch atomically, so either all
    /// classrooms are created or none are.
    pub async fn batch_create_groups(&self, records: &[NewClassroom]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let now = rfc3339_now();
        let writes: Vec<WriteOp> = records
            .iter()
            .map(|record| WriteOp {
                update: Document {
                    name: format!(
                        "{}/documents/groups/{}",
                        self.database_path,
                        Uuid::new_v4()
                    ),
                    fields: classroom_fields(record, &now),
                    ..Document::default()
                },
            })
            .collect();

        let url = self.service_url("documents:commit");
        self.request(reqwest::Method::POST, url)
            .json(&CommitRequest { writes })
            .send()
            .await?
            .error_for_status()?;
        Ok(records.len())
    }

    async fn list_collection(&self, path: &str) -> Result<Vec<Document>, StoreError> {
        let url = self.documents_url(path);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.request(reqwest::Method::GET, url.clone());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: ListDocumentsResponse = request
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            documents.extend(page.documents);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn documents_url(&self, path: &str) -> Url {
        self.service_url(&format!("documents/{path}"))
    }

    fn service_url(&self, suffix: &str) -> Url {
        Url::parse(&format!("{}/{}/{suffix}", self.base_url, self.database_path))
            .expect("valid store url")
    }
}

fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn classroom_fields(record: &NewClassroom, now: &str) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), FieldValue::String(record.name.clone()));
    fields.insert(
        "department".to_string(),
        FieldValue::String(record.department.clone()),
    );
    fields.insert(
        "teacherName".to_string(),
        FieldValue::String(record.teacher_name.clone()),
    );
    fields.insert(
        "teacherEmail".to_string(),
        FieldValue::String(record.teacher_email.clone()),
    );
    fields.insert(
        "maxStudents".to_string(),
        FieldValue::integer(record.max_students),
    );
    fields.insert(
        "duration".to_string(),
        FieldValue::String(record.duration.clone()),
    );
    fields.insert(
        "breakTime".to_string(),
        FieldValue::integer(record.break_time),
    );
    fields.insert(
        "description".to_string(),
        FieldValue::String(record.description.clone()),
    );
    fields.insert("isActive".to_string(), FieldValue::Boolean(record.is_active));
    fields.insert(
        "createdAt".to_string(),
        FieldValue::Timestamp(now.to_string()),
    );
    fields.insert(
        "updatedAt".to_string(),
        FieldValue::Timestamp(now.to_string()),
    );
    fields
}

fn classroom_from_document(document: &Document) -> Result<Classroom, StoreError> {
    let field_str = |key: &str| {
        document
            .fields
            .get(key)
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let field_timestamp = |key: &str| -> Option<DateTime<Utc>> {
        document
            .fields
            .get(key)
            .and_then(FieldValue::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    };

    // Partially-written documents still render; missing optional fields fall
    // back to the same defaults the importer applies.
    Ok(Classroom {
        id: document_id(&document.name)?,
        name: field_str("name"),
        department: field_str("department"),
        teacher_name: field_str("teacherName"),
        teacher_email: field_str("teacherEmail"),
        max_students: document
            .fields
            .get("maxStudents")
            .and_then(FieldValue::as_u32)
            .unwrap_or(60),
        duration: {
            let duration = field_str("duration");
            if duration.is_empty() { "8h".to_string() } else { duration }
        },
        break_time: document
            .fields
            .get("breakTime")
            .and_then(FieldValue::as_u32)
            .unwrap_or(110),
        description: field_str("description"),
        is_active: document
            .fields
            .get("isActive")
            .and_then(FieldValue::as_bool)
            .unwrap_or(true),
        student_count: 0,
        created_at: field_timestamp("createdAt"),
        updated_at: field_timestamp("updatedAt"),
    })
}

fn student_from_document(document: &Document) -> Student {
    let field_str = |key: &str| {
        document
            .fields
            .get(key)
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Student {
        id: document_id(&document.name).unwrap_or_default(),
        name: field_str("name"),
        roll_number: field_str("rollNumber"),
        email: field_str("email"),
    }
}

fn document_id(name: &str) -> Result<String, StoreError> {
    name.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::Malformed(format!("document name without id: {name:?}")))
}
