use serde_json::Value;

use crate::models::student::Subject;
use crate::validation::FieldError;

/// A validated mark entry. `score` is still in display units; normalization
/// to stored units happens on the write path.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkPayload {
    pub subject: Subject,
    pub score: f64,
}

/// A validated student-create request.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterStudentPayload {
    pub name: String,
    pub email: String,
    pub age: i64,
    pub marks: Vec<MarkPayload>,
}

/// A validated student-update request. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateStudentPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub marks: Option<Vec<MarkPayload>>,
}

/// Validate a student-create body. Errors are collected in field order
/// rather than short-circuiting on the first failure.
pub fn validate_register(value: &Value) -> Result<RegisterStudentPayload, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = match value.get("name").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => {
            errors.push(FieldError::new("name", "Name is required"));
            None
        }
    };

    let email = match value.get("email") {
        Some(v) => match v.as_str() {
            Some(s) if is_valid_email(s) => Some(s.to_string()),
            _ => {
                errors.push(FieldError::new("email", "Invalid email address"));
                None
            }
        },
        None => {
            errors.push(FieldError::new("email", "Email is required"));
            None
        }
    };

    let age = match value.get("age").and_then(positive_integer) {
        Some(age) => Some(age),
        None => {
            errors.push(FieldError::new("age", "Age must be a positive number"));
            None
        }
    };

    let marks = match value.get("marks") {
        None => Some(Vec::new()),
        Some(v) => parse_marks(v, &mut errors),
    };

    match (name, email, age, marks) {
        (Some(name), Some(email), Some(age), Some(marks)) => Ok(RegisterStudentPayload {
            name,
            email,
            age,
            marks,
        }),
        _ => Err(errors),
    }
}

/// Validate a student-update body: every field optional, present fields held
/// to the same rules as on create.
pub fn validate_update(value: &Value) -> Result<UpdateStudentPayload, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut payload = UpdateStudentPayload::default();

    if let Some(v) = value.get("name") {
        match v.as_str() {
            Some(s) if !s.is_empty() => payload.name = Some(s.to_string()),
            _ => errors.push(FieldError::new("name", "Name is required")),
        }
    }

    if let Some(v) = value.get("email") {
        match v.as_str() {
            Some(s) if is_valid_email(s) => payload.email = Some(s.to_string()),
            _ => errors.push(FieldError::new("email", "Invalid email address")),
        }
    }

    if let Some(v) = value.get("age") {
        match positive_integer(v) {
            Some(age) => payload.age = Some(age),
            None => errors.push(FieldError::new("age", "Age must be a positive number")),
        }
    }

    if let Some(v) = value.get("marks") {
        payload.marks = parse_marks(v, &mut errors);
    }

    if errors.is_empty() {
        Ok(payload)
    } else {
        Err(errors)
    }
}

/// Parse a marks array, collecting per-entry errors. Returns `None` when any
/// entry was invalid so callers cannot accept a partially-valid list.
fn parse_marks(value: &Value, errors: &mut Vec<FieldError>) -> Option<Vec<MarkPayload>> {
    let entries = match value.as_array() {
        Some(entries) => entries,
        None => {
            errors.push(FieldError::new("marks", "Marks must be an array"));
            return None;
        }
    };

    let before = errors.len();
    let mut marks = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            errors.push(FieldError::new(format!("marks[{}]", i), "Mark must be an object"));
            continue;
        }

        let subject = match entry.get("subject").and_then(Value::as_str).and_then(Subject::parse) {
            Some(subject) => Some(subject),
            None => {
                errors.push(FieldError::new(
                    format!("marks[{}].subject", i),
                    "Subject must be one of Math, Science, English, Social_Studies, Art",
                ));
                None
            }
        };

        let score = match entry.get("score").and_then(Value::as_f64) {
            Some(score) if (0.0..=100.0).contains(&score) => Some(score),
            _ => {
                errors.push(FieldError::new(
                    format!("marks[{}].score", i),
                    "Score must be between 0 and 100",
                ));
                None
            }
        };

        if let (Some(subject), Some(score)) = (subject, score) {
            marks.push(MarkPayload { subject, score });
        }
    }

    if errors.len() == before {
        Some(marks)
    } else {
        None
    }
}

/// Structural email check: one `@`, non-empty local part, dot-separated
/// non-empty domain labels, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| !label.is_empty())
}

/// Accept a JSON number as a positive integer. Fractional values are
/// rejected; the store column is integral and a fractional age could only
/// ever fail later.
fn positive_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return (n > 0).then_some(n);
    }
    if let Some(f) = value.as_f64() {
        if f > 0.0 && f.fract() == 0.0 && f <= i64::MAX as f64 {
            return Some(f as i64);
        }
    }
    None
}
