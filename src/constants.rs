//! Constants used throughout the application
//!
//! Field limits, default page sizes and user-facing messages live here so
//! validation, configuration and tests agree on the same values.

// Application identity
pub const APP_NAME: &str = "campus-records";
pub const CONFIG_FILE_NAME: &str = "campus-records.toml";
pub const DATABASE_FILE_NAME: &str = "records.db";
pub const LOG_FILE_NAME: &str = "campus-records.log";

// Field length limits
pub const PROGRAM_CODE_MAX_LEN: usize = 10;
pub const COURSE_CODE_MAX_LEN: usize = 15;
pub const NAME_MAX_LEN: usize = 200;
pub const IDENTIFICATION_MAX_LEN: usize = 20;
pub const PERSON_NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PHONE_MAX_LEN: usize = 15;
pub const SEMESTER_LABEL_MAX_LEN: usize = 10;

// Grades, in tenths of a point
pub const GRADE_MAX_TENTHS: i32 = 50;
/// At or above this a grade is conventionally passing.
pub const GRADE_PASSING_TENTHS: i32 = 30;

// Pagination
pub const DEFAULT_PROGRAMS_PAGE_SIZE: u64 = 10;
pub const DEFAULT_COURSES_PAGE_SIZE: u64 = 15;
pub const DEFAULT_STUDENTS_PAGE_SIZE: u64 = 20;
pub const DEFAULT_ENROLLMENTS_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 500;

// Detail and dashboard limits
pub const PROGRAM_DETAIL_STUDENT_LIMIT: u64 = 10;
pub const DASHBOARD_RECENT_PROGRAMS: u64 = 5;
pub const DASHBOARD_RECENT_STUDENTS: u64 = 5;
pub const DASHBOARD_RECENT_ENROLLMENTS: u64 = 10;

// Database
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;
pub const MAX_CONNECTIONS_LIMIT: u32 = 64;

// Log Messages
pub const LOG_SCHEMA_READY: &str = "✅ Database schema ready";
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
