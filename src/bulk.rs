use std::collections::HashMap;

use thiserror::Error;

use crate::models::NewClassroom;
use crate::validation::is_valid_email;

/// Fixed-content template offered for download alongside the import endpoint.
pub const TEMPLATE_CSV: &str = "\
name,department,teachername,teacheremail,maxstudents,duration,breaktime,description,isactive
III-CSE-A,Computer Science and Engineering,Dr. John Smith,john.smith@college.edu,60,8,110,Third year CSE section A,true
III-CSE-B,Computer Science and Engineering,Dr. Jane Doe,jane.doe@college.edu,65,8,110,Third year CSE section B,true
II-IT-A,Information Technology,Prof. Mike Johnson,mike.johnson@college.edu,55,7,90,Second year IT section A,true
";

/// Upload content types the import endpoint accepts. Only CSV text is
/// actually parsed; spreadsheet uploads fail row-by-row like any other
/// malformed text.
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] = [
    "text/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const REQUIRED_COLUMNS: [&str; 2] = ["name", "department"];

/// Structural failure that aborts the whole import before any row is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("Missing required columns: {0}")]
    MissingColumns(String),
}

/// Result of one parse pass: records that survived validation plus the
/// row-level errors for everything that did not. Callers must not write
/// anything unless `errors` is empty.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedImport {
    pub classrooms: Vec<NewClassroom>,
    pub errors: Vec<String>,
}

/// Parses comma-separated classroom rows. The first non-empty line is the
/// header; header names are matched case-insensitively and values trimmed.
/// Row numbers in error messages are 1-based and count the header line.
pub fn parse_classrooms_csv(text: &str) -> Result<ParsedImport, ImportError> {
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();

    let headers: Vec<String> = lines
        .first()
        .map(|first| first.split(',').map(|h| h.trim().to_lowercase()).collect())
        .unwrap_or_default();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing.join(", ")));
    }

    let mut classrooms = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in lines.iter().enumerate().skip(1) {
        let row = index + 1;
        let values: Vec<&str> = line.split(',').map(str::trim).collect();

        if values.len() != headers.len() {
            errors.push(format!("Row {row}: Column count mismatch"));
            continue;
        }

        let record: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(values)
            .collect();

        let name = record.get("name").copied().unwrap_or_default();
        if name.is_empty() {
            errors.push(format!("Row {row}: Classroom name is required"));
            continue;
        }

        let department = record.get("department").copied().unwrap_or_default();
        if department.is_empty() {
            errors.push(format!("Row {row}: Department is required"));
            continue;
        }

        let max_students = match numeric_field(&record, "maxstudents", 60) {
            Ok(0) => {
                errors.push(format!("Row {row}: Max students must be at least 1"));
                continue;
            }
            Ok(value) => value,
            Err(message) => {
                errors.push(format!("Row {row}: {message}"));
                continue;
            }
        };

        let break_time = match numeric_field(&record, "breaktime", 110) {
            Ok(value) => value,
            Err(message) => {
                errors.push(format!("Row {row}: {message}"));
                continue;
            }
        };

        let teacher_email = record.get("teacheremail").copied().unwrap_or_default();
        if !teacher_email.is_empty() && !is_valid_email(teacher_email) {
            errors.push(format!("Row {row}: Invalid teacher email format"));
            continue;
        }

        let teacher_name = record
            .get("teachername")
            .copied()
            .filter(|v| !v.is_empty())
            .or_else(|| record.get("teacher").copied())
            .unwrap_or_default();

        let duration = record
            .get("duration")
            .copied()
            .filter(|v| !v.is_empty())
            .unwrap_or("8h");

        // Only the literal "false" deactivates a row; "False", "no" and
        // absence all leave the classroom active.
        let is_active = record.get("isactive").copied() != Some("false");

        classrooms.push(NewClassroom {
            name: name.to_string(),
            department: department.to_string(),
            teacher_name: teacher_name.to_string(),
            teacher_email: teacher_email.to_string(),
            max_students,
            duration: duration.to_string(),
            break_time,
            description: record.get("description").copied().unwrap_or_default().to_string(),
            is_active,
        });
    }

    Ok(ParsedImport { classrooms, errors })
}

fn numeric_field(record: &HashMap<&str, &str>, column: &str, default: u32) -> Result<u32, String> {
    match record.get(column).copied().filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("{column} must be a whole number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_columns_is_structural() {
        let err = parse_classrooms_csv("title,teacher\nA,B\nC,D\n").unwrap_err();
        assert_eq!(
            err,
            ImportError::MissingColumns("name, department".to_string())
        );

        let err = parse_classrooms_csv("name,teacher\nA,B\n").unwrap_err();
        assert_eq!(err, ImportError::MissingColumns("department".to_string()));
    }

    #[test]
    fn test_empty_input_reports_both_columns_missing() {
        let err = parse_classrooms_csv("").unwrap_err();
        assert_eq!(
            err,
            ImportError::MissingColumns("name, department".to_string())
        );
    }

    #[test]
    fn test_defaults_applied_for_omitted_optional_fields() {
        let parsed = parse_classrooms_csv("name,department\nIII-CSE-A,CSE\n").unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.classrooms.len(), 1);

        let classroom = &parsed.classrooms[0];
        assert_eq!(classroom.name, "III-CSE-A");
        assert_eq!(classroom.department, "CSE");
        assert_eq!(classroom.max_students, 60);
        assert_eq!(classroom.duration, "8h");
        assert_eq!(classroom.break_time, 110);
        assert_eq!(classroom.teacher_name, "");
        assert_eq!(classroom.teacher_email, "");
        assert_eq!(classroom.description, "");
        assert!(classroom.is_active);
    }

    #[test]
    fn test_is_active_only_literal_false_deactivates() {
        let parsed = parse_classrooms_csv(
            "name,department,isactive\nA,CS,false\nB,CS,False\nC,CS,no\nD,CS,\n",
        )
        .unwrap();
        assert!(parsed.errors.is_empty());
        let flags: Vec<bool> = parsed.classrooms.iter().map(|c| c.is_active).collect();
        assert_eq!(flags, vec![false, true, true, true]);
    }

    #[test]
    fn test_column_count_mismatch_skips_row_with_line_number() {
        let parsed =
            parse_classrooms_csv("name,department\nA,CS\nB,CS,extra\nC,IT\n").unwrap();
        assert_eq!(parsed.classrooms.len(), 2);
        assert_eq!(parsed.errors, vec!["Row 3: Column count mismatch".to_string()]);
    }

    #[test]
    fn test_missing_name_reports_row_three() {
        let parsed = parse_classrooms_csv("name,department\nA,CS\n,CS\n").unwrap();
        assert_eq!(parsed.classrooms.len(), 1);
        assert_eq!(parsed.classrooms[0].name, "A");
        assert_eq!(parsed.classrooms[0].department, "CS");
        assert_eq!(
            parsed.errors,
            vec!["Row 3: Classroom name is required".to_string()]
        );
    }

    #[test]
    fn test_missing_department_is_row_level() {
        let parsed = parse_classrooms_csv("name,department\nA,\n").unwrap();
        assert!(parsed.classrooms.is_empty());
        assert_eq!(parsed.errors, vec!["Row 2: Department is required".to_string()]);
    }

    #[test]
    fn test_teacher_column_fallback() {
        let parsed =
            parse_classrooms_csv("name,department,teacher\nA,CS,Prof. Rao\n").unwrap();
        assert_eq!(parsed.classrooms[0].teacher_name, "Prof. Rao");

        let parsed = parse_classrooms_csv(
            "name,department,teachername,teacher\nA,CS,Dr. Iyer,Prof. Rao\n",
        )
        .unwrap();
        assert_eq!(parsed.classrooms[0].teacher_name, "Dr. Iyer");
    }

    #[test]
    fn test_unparseable_numbers_are_row_errors() {
        let parsed = parse_classrooms_csv(
            "name,department,maxstudents,breaktime\nA,CS,sixty,110\nB,CS,60,later\nC,CS,0,90\n",
        )
        .unwrap();
        assert!(parsed.classrooms.is_empty());
        assert_eq!(
            parsed.errors,
            vec![
                "Row 2: maxstudents must be a whole number".to_string(),
                "Row 3: breaktime must be a whole number".to_string(),
                "Row 4: Max students must be at least 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_invalid_teacher_email_is_row_error() {
        let parsed = parse_classrooms_csv(
            "name,department,teacheremail\nA,CS,not-an-email\nB,CS,jane.doe@college.edu\n",
        )
        .unwrap();
        assert_eq!(parsed.classrooms.len(), 1);
        assert_eq!(parsed.classrooms[0].teacher_email, "jane.doe@college.edu");
        assert_eq!(
            parsed.errors,
            vec!["Row 2: Invalid teacher email format".to_string()]
        );
    }

    #[test]
    fn test_blank_lines_are_dropped_before_numbering() {
        let parsed = parse_classrooms_csv("name,department\n\nA,CS\n\n,CS\n").unwrap();
        assert_eq!(parsed.classrooms.len(), 1);
        // The blank lines collapse, so the failing row is reported as row 3.
        assert_eq!(
            parsed.errors,
            vec!["Row 3: Classroom name is required".to_string()]
        );
    }

    #[test]
    fn test_template_round_trips_clean() {
        let parsed = parse_classrooms_csv(TEMPLATE_CSV).unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.classrooms.len(), 3);
        assert_eq!(parsed.classrooms[0].name, "III-CSE-A");
        assert_eq!(parsed.classrooms[1].max_students, 65);
        assert_eq!(parsed.classrooms[2].break_time, 90);
        assert!(parsed.classrooms.iter().all(|c| c.is_active));
    }
}
