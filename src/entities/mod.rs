pub mod course;
pub mod enrollment;
pub mod program;
pub mod student;

pub use course::Entity as Course;
pub use enrollment::Entity as Enrollment;
pub use program::Entity as Program;
pub use student::Entity as Student;
