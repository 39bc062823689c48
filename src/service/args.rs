//! Input arguments for create and update operations, with field validation.
//!
//! Text fields are trimmed before they are checked and stored. Update
//! arguments use `None` for "leave unchanged"; `Option<Option<_>>` fields
//! distinguish "leave unchanged" from "clear".

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    COURSE_CODE_MAX_LEN, EMAIL_MAX_LEN, IDENTIFICATION_MAX_LEN, NAME_MAX_LEN, PERSON_NAME_MAX_LEN, PHONE_MAX_LEN,
    PROGRAM_CODE_MAX_LEN, SEMESTER_LABEL_MAX_LEN,
};
use crate::error::{RecordsError, Result};
use crate::utils::grade::Grade;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProgramArgs {
    pub code: String,
    pub name: String,
    pub description: String,
    pub duration_semesters: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProgramArgs {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_semesters: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseArgs {
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub semester: i32,
    pub description: String,
    pub program_uuid: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseArgs {
    pub code: Option<String>,
    pub name: Option<String>,
    pub credits: Option<i32>,
    pub semester: Option<i32>,
    pub description: Option<String>,
    pub program_uuid: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentArgs {
    pub identification_number: String,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub admission_date: NaiveDate,
    pub program_uuid: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudentArgs {
    pub identification_number: Option<String>,
    pub first_names: Option<String>,
    pub last_names: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub birth_date: Option<NaiveDate>,
    pub admission_date: Option<NaiveDate>,
    pub program_uuid: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEnrollmentArgs {
    pub student_uuid: Uuid,
    pub course_uuid: Uuid,
    pub semester_taken: String,
    pub final_grade: Option<Decimal>,
    pub passed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEnrollmentArgs {
    pub student_uuid: Option<Uuid>,
    pub course_uuid: Option<Uuid>,
    pub semester_taken: Option<String>,
    pub final_grade: Option<Option<Decimal>>,
    pub passed: Option<bool>,
}

impl CreateProgramArgs {
    pub(crate) fn validated(self) -> Result<Self> {
        Ok(Self {
            code: required_text("code", &self.code, PROGRAM_CODE_MAX_LEN)?,
            name: required_text("name", &self.name, NAME_MAX_LEN)?,
            description: self.description.trim().to_string(),
            duration_semesters: positive("duration_semesters", self.duration_semesters)?,
        })
    }
}

impl UpdateProgramArgs {
    pub(crate) fn validated(self) -> Result<Self> {
        Ok(Self {
            code: self.code.map(|v| required_text("code", &v, PROGRAM_CODE_MAX_LEN)).transpose()?,
            name: self.name.map(|v| required_text("name", &v, NAME_MAX_LEN)).transpose()?,
            description: self.description.map(|v| v.trim().to_string()),
            duration_semesters: self
                .duration_semesters
                .map(|v| positive("duration_semesters", v))
                .transpose()?,
            is_active: self.is_active,
        })
    }
}

impl CreateCourseArgs {
    pub(crate) fn validated(self) -> Result<Self> {
        Ok(Self {
            code: required_text("code", &self.code, COURSE_CODE_MAX_LEN)?,
            name: required_text("name", &self.name, NAME_MAX_LEN)?,
            credits: positive("credits", self.credits)?,
            semester: positive("semester", self.semester)?,
            description: self.description.trim().to_string(),
            program_uuid: self.program_uuid,
        })
    }
}

impl UpdateCourseArgs {
    pub(crate) fn validated(self) -> Result<Self> {
        Ok(Self {
            code: self.code.map(|v| required_text("code", &v, COURSE_CODE_MAX_LEN)).transpose()?,
            name: self.name.map(|v| required_text("name", &v, NAME_MAX_LEN)).transpose()?,
            credits: self.credits.map(|v| positive("credits", v)).transpose()?,
            semester: self.semester.map(|v| positive("semester", v)).transpose()?,
            description: self.description.map(|v| v.trim().to_string()),
            program_uuid: self.program_uuid,
            is_active: self.is_active,
        })
    }
}

impl CreateStudentArgs {
    pub(crate) fn validated(self) -> Result<Self> {
        Ok(Self {
            identification_number: required_text(
                "identification_number",
                &self.identification_number,
                IDENTIFICATION_MAX_LEN,
            )?,
            first_names: required_text("first_names", &self.first_names, PERSON_NAME_MAX_LEN)?,
            last_names: required_text("last_names", &self.last_names, PERSON_NAME_MAX_LEN)?,
            email: email(&self.email)?,
            phone: optional_text("phone", self.phone.as_deref(), PHONE_MAX_LEN)?,
            birth_date: self.birth_date,
            admission_date: self.admission_date,
            program_uuid: self.program_uuid,
        })
    }
}

impl UpdateStudentArgs {
    pub(crate) fn validated(self) -> Result<Self> {
        Ok(Self {
            identification_number: self
                .identification_number
                .map(|v| required_text("identification_number", &v, IDENTIFICATION_MAX_LEN))
                .transpose()?,
            first_names: self
                .first_names
                .map(|v| required_text("first_names", &v, PERSON_NAME_MAX_LEN))
                .transpose()?,
            last_names: self
                .last_names
                .map(|v| required_text("last_names", &v, PERSON_NAME_MAX_LEN))
                .transpose()?,
            email: self.email.map(|v| email(&v)).transpose()?,
            phone: self
                .phone
                .map(|v| optional_text("phone", v.as_deref(), PHONE_MAX_LEN))
                .transpose()?,
            birth_date: self.birth_date,
            admission_date: self.admission_date,
            program_uuid: self.program_uuid,
            is_active: self.is_active,
        })
    }
}

/// Validated enrollment fields with the grade already checked.
pub(crate) struct ValidEnrollment {
    pub student_uuid: Uuid,
    pub course_uuid: Uuid,
    pub semester_taken: String,
    pub final_grade: Option<Grade>,
    pub passed: bool,
}

impl CreateEnrollmentArgs {
    pub(crate) fn validated(self) -> Result<ValidEnrollment> {
        Ok(ValidEnrollment {
            student_uuid: self.student_uuid,
            course_uuid: self.course_uuid,
            semester_taken: required_text("semester_taken", &self.semester_taken, SEMESTER_LABEL_MAX_LEN)?,
            final_grade: self.final_grade.map(Grade::from_decimal).transpose()?,
            passed: self.passed,
        })
    }
}

/// Update fields with the grade already checked.
pub(crate) struct ValidEnrollmentUpdate {
    pub student_uuid: Option<Uuid>,
    pub course_uuid: Option<Uuid>,
    pub semester_taken: Option<String>,
    pub final_grade: Option<Option<Grade>>,
    pub passed: Option<bool>,
}

impl UpdateEnrollmentArgs {
    pub(crate) fn validated(self) -> Result<ValidEnrollmentUpdate> {
        Ok(ValidEnrollmentUpdate {
            student_uuid: self.student_uuid,
            course_uuid: self.course_uuid,
            semester_taken: self
                .semester_taken
                .map(|v| required_text("semester_taken", &v, SEMESTER_LABEL_MAX_LEN))
                .transpose()?,
            final_grade: self
                .final_grade
                .map(|grade| grade.map(Grade::from_decimal).transpose())
                .transpose()?,
            passed: self.passed,
        })
    }
}

fn required_text(field: &'static str, value: &str, max_len: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RecordsError::invalid(field, "cannot be empty"));
    }
    if value.chars().count() > max_len {
        return Err(RecordsError::invalid(field, format!("must be at most {max_len} characters")));
    }
    Ok(value.to_string())
}

/// Blank input becomes `None`.
fn optional_text(field: &'static str, value: Option<&str>, max_len: usize) -> Result<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => required_text(field, v, max_len).map(Some),
        None => Ok(None),
    }
}

fn positive(field: &'static str, value: i32) -> Result<i32> {
    if value <= 0 {
        return Err(RecordsError::invalid(field, format!("must be a positive integer, got {value}")));
    }
    Ok(value)
}

/// One `@`, a non-empty local part and a dotted domain, no whitespace.
fn email(value: &str) -> Result<String> {
    let value = required_text("email", value, EMAIL_MAX_LEN)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(RecordsError::invalid("email", format!("'{value}' is not a valid address")));
    }
    Ok(value)
}
