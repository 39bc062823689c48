#![allow(dead_code)]

use std::sync::Arc;

use campus_records::config::PaginationConfig;
use campus_records::entities::{course, enrollment, program, student};
use campus_records::service::{
    CreateCourseArgs, CreateEnrollmentArgs, CreateProgramArgs, CreateStudentArgs, Registrar,
};
use campus_records::storage::Storage;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

pub async fn registrar() -> Registrar {
    let storage = Storage::in_memory().await.unwrap();
    Registrar::new(Arc::new(storage), PaginationConfig::default())
}

pub fn grade(tenths: i64) -> Decimal {
    Decimal::new(tenths, 1)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn program_args(code: &str, name: &str) -> CreateProgramArgs {
    CreateProgramArgs {
        code: code.to_string(),
        name: name.to_string(),
        description: String::new(),
        duration_semesters: 10,
    }
}

pub async fn create_program(registrar: &Registrar, code: &str, name: &str) -> program::Model {
    registrar.create_program(program_args(code, name)).await.unwrap()
}

pub fn course_args(program_uuid: Uuid, code: &str, name: &str, semester: i32) -> CreateCourseArgs {
    CreateCourseArgs {
        code: code.to_string(),
        name: name.to_string(),
        credits: 3,
        semester,
        description: String::new(),
        program_uuid,
    }
}

pub async fn create_course(
    registrar: &Registrar,
    program_uuid: Uuid,
    code: &str,
    name: &str,
    semester: i32,
) -> course::Model {
    registrar
        .create_course(course_args(program_uuid, code, name, semester))
        .await
        .unwrap()
}

pub fn student_args(number: &str, first: &str, last: &str, program_uuid: Option<Uuid>) -> CreateStudentArgs {
    CreateStudentArgs {
        identification_number: number.to_string(),
        first_names: first.to_string(),
        last_names: last.to_string(),
        email: format!("{}@example.edu", number),
        phone: None,
        birth_date: date(2000, 1, 15),
        admission_date: date(2020, 2, 1),
        program_uuid,
    }
}

pub async fn create_student(
    registrar: &Registrar,
    number: &str,
    first: &str,
    last: &str,
    program_uuid: Option<Uuid>,
) -> student::Model {
    registrar
        .create_student(student_args(number, first, last, program_uuid))
        .await
        .unwrap()
}

pub fn enrollment_args(
    student_uuid: Uuid,
    course_uuid: Uuid,
    semester: &str,
    final_grade: Option<Decimal>,
    passed: bool,
) -> CreateEnrollmentArgs {
    CreateEnrollmentArgs {
        student_uuid,
        course_uuid,
        semester_taken: semester.to_string(),
        final_grade,
        passed,
    }
}

pub async fn enroll(
    registrar: &Registrar,
    student_uuid: Uuid,
    course_uuid: Uuid,
    semester: &str,
    final_grade: Option<Decimal>,
    passed: bool,
) -> enrollment::Model {
    registrar
        .create_enrollment(enrollment_args(student_uuid, course_uuid, semester, final_grade, passed))
        .await
        .unwrap()
}
