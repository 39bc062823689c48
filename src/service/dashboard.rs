use serde::Serialize;

use super::Registrar;
use crate::constants::{DASHBOARD_RECENT_ENROLLMENTS, DASHBOARD_RECENT_PROGRAMS, DASHBOARD_RECENT_STUDENTS};
use crate::entities::{program, student};
use crate::error::Result;
use crate::repositories::{CourseRepository, EnrollmentRepository, EnrollmentRow, ProgramRepository, StudentRepository};

/// Summary counts and the most recent activity.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub program_count: u64,
    pub course_count: u64,
    pub student_count: u64,
    /// All enrollments; they have no active flag
    pub enrollment_count: u64,
    pub recent_programs: Vec<program::Model>,
    pub recent_students: Vec<student::Model>,
    pub recent_enrollments: Vec<EnrollmentRow>,
}

impl Registrar {
    pub async fn dashboard(&self) -> Result<Dashboard> {
        let conn = self.conn();

        Ok(Dashboard {
            program_count: ProgramRepository::count_active(conn).await?,
            course_count: CourseRepository::count_active(conn).await?,
            student_count: StudentRepository::count_active(conn).await?,
            enrollment_count: EnrollmentRepository::count_all(conn).await?,
            recent_programs: ProgramRepository::get_recent(conn, DASHBOARD_RECENT_PROGRAMS).await?,
            recent_students: StudentRepository::get_recently_admitted(conn, DASHBOARD_RECENT_STUDENTS).await?,
            recent_enrollments: EnrollmentRepository::get_recent(conn, DASHBOARD_RECENT_ENROLLMENTS).await?,
        })
    }
}
