use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CreateClassroom, NewClassroom};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("regex compiles"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Validates a create-classroom form and normalizes it into a storable
/// record. All failures are collected so the client can show them together.
pub fn validate_classroom_form(form: &CreateClassroom) -> Result<NewClassroom, Vec<String>> {
    let mut errors = Vec::new();

    if form.name.trim().is_empty() {
        errors.push("Classroom name is required".to_string());
    }
    if form.department.trim().is_empty() {
        errors.push("Department is required".to_string());
    }
    if form.teacher_name.trim().is_empty() {
        errors.push("Teacher name is required".to_string());
    }
    if !form.teacher_email.is_empty() && !is_valid_email(&form.teacher_email) {
        errors.push("Invalid email format".to_string());
    }

    let max_students = form.max_students.unwrap_or(0);
    if max_students < 1 {
        errors.push("Max students must be at least 1".to_string());
    }

    let duration_hours = form.duration_hours.unwrap_or(8);
    if duration_hours < 1 {
        errors.push("Duration must be at least 1 hour".to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewClassroom {
        name: form.name.trim().to_string(),
        department: form.department.trim().to_string(),
        teacher_name: form.teacher_name.trim().to_string(),
        teacher_email: form.teacher_email.trim().to_string(),
        max_students,
        duration: format!("{duration_hours}h"),
        break_time: form.break_time.unwrap_or(110),
        description: form.description.trim().to_string(),
        is_active: form.is_active,
    })
}
