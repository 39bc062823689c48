mod common;

use campus_records::entities::enrollment;
use campus_records::error::RecordsError;
use campus_records::repositories::EnrollmentRepository;
use campus_records::service::UpdateEnrollmentArgs;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn test_duplicate_enrollment_is_rejected() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;
    common::enroll(&registrar, student.uuid, course.uuid, "2024-1", None, false).await;

    // A different term does not make the pair distinct
    let err = registrar
        .create_enrollment(common::enrollment_args(student.uuid, course.uuid, "2024-2", None, false))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::DuplicateEnrollment));
}

#[tokio::test]
async fn test_enrollment_requires_existing_parents() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;

    let err = registrar
        .create_enrollment(common::enrollment_args(Uuid::new_v4(), course.uuid, "2024-1", None, false))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::ReferentialViolation { entity: "Student", .. }));

    let err = registrar
        .create_enrollment(common::enrollment_args(student.uuid, Uuid::new_v4(), "2024-1", None, false))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::ReferentialViolation { entity: "Course", .. }));
}

#[tokio::test]
async fn test_grade_bounds() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;

    for (index, raw) in ["5.1", "-0.1", "3.25"].into_iter().enumerate() {
        let course =
            common::create_course(&registrar, program.uuid, &format!("BAD{index}"), "Course", 1).await;
        let grade = Decimal::from_str(raw).unwrap();
        let err = registrar
            .create_enrollment(common::enrollment_args(student.uuid, course.uuid, "2024-1", Some(grade), false))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordsError::InvalidGrade(_)), "{raw} should be rejected");
    }

    for (index, raw) in ["0.0", "2.5", "5.0", "3.20"].into_iter().enumerate() {
        let course =
            common::create_course(&registrar, program.uuid, &format!("OK{index}"), "Course", 1).await;
        let grade = Decimal::from_str(raw).unwrap();
        let enrollment =
            common::enroll(&registrar, student.uuid, course.uuid, "2024-1", Some(grade), false).await;
        assert_eq!(enrollment.final_grade_decimal(), Some(grade));
    }
}

#[tokio::test]
async fn test_update_enrollment_keeps_enrolled_at() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;
    let enrollment = common::enroll(&registrar, student.uuid, course.uuid, "2024-1", None, false).await;

    let updated = registrar
        .update_enrollment(
            &enrollment.uuid,
            UpdateEnrollmentArgs {
                final_grade: Some(Some(common::grade(38))),
                passed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.enrolled_at, enrollment.enrolled_at);
    assert_eq!(updated.final_grade_tenths, Some(38));
    assert!(updated.passed);

    let cleared = registrar
        .update_enrollment(
            &enrollment.uuid,
            UpdateEnrollmentArgs {
                final_grade: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.final_grade_tenths, None);
    assert!(cleared.passed);
}

#[tokio::test]
async fn test_update_onto_existing_pair_is_rejected() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let first = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let second = common::create_course(&registrar, program.uuid, "CS102", "Programming II", 2).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;
    common::enroll(&registrar, student.uuid, first.uuid, "2024-1", None, false).await;
    let moving = common::enroll(&registrar, student.uuid, second.uuid, "2024-2", None, false).await;

    let err = registrar
        .update_enrollment(
            &moving.uuid,
            UpdateEnrollmentArgs {
                course_uuid: Some(first.uuid),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::DuplicateEnrollment));
}

#[tokio::test]
async fn test_list_enrollments_filters() {
    let registrar = common::registrar().await;
    let sis = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let civ = common::create_program(&registrar, "ING-CIV", "Civil Engineering").await;
    let cs101 = common::create_course(&registrar, sis.uuid, "CS101", "Programming I", 1).await;
    let cv101 = common::create_course(&registrar, civ.uuid, "CV101", "Statics", 1).await;
    let ana = common::create_student(&registrar, "12345", "Ana", "Gómez", Some(sis.uuid)).await;
    let luis = common::create_student(&registrar, "67890", "Luis", "Pérez", Some(civ.uuid)).await;

    common::enroll(&registrar, ana.uuid, cs101.uuid, "2024-1", None, false).await;
    common::enroll(&registrar, ana.uuid, cv101.uuid, "2024-2", None, false).await;
    common::enroll(&registrar, luis.uuid, cv101.uuid, "2024-1", None, false).await;

    let page = registrar.list_enrollments(&registrar.enrollment_params()).await.unwrap();
    assert_eq!(page.total_count, 3);
    assert!(page.items.iter().all(|row| row.student.is_some() && row.course.is_some()));

    // Program filter goes through the course, not the student
    let page = registrar
        .list_enrollments(&registrar.enrollment_params().program(civ.uuid))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);

    let page = registrar
        .list_enrollments(&registrar.enrollment_params().semester("2024-1"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);

    let page = registrar
        .list_enrollments(&registrar.enrollment_params().search("statics"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);

    let page = registrar
        .list_enrollments(&registrar.enrollment_params().search("67890").semester("2024-1"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].enrollment.student_uuid, luis.uuid);
}

#[tokio::test]
async fn test_pair_index_rejects_duplicate_on_insert() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", Some(program.uuid)).await;
    common::enroll(&registrar, student.uuid, course.uuid, "2024-1", None, false).await;

    let duplicate = enrollment::ActiveModel {
        uuid: ActiveValue::Set(Uuid::new_v4()),
        student_uuid: ActiveValue::Set(student.uuid),
        course_uuid: ActiveValue::Set(course.uuid),
        enrolled_at: ActiveValue::Set(Utc::now()),
        semester_taken: ActiveValue::Set("2024-2".to_string()),
        final_grade_tenths: ActiveValue::Set(None),
        passed: ActiveValue::Set(false),
    };
    let err = EnrollmentRepository::create(&registrar.storage().conn, duplicate)
        .await
        .unwrap_err();

    assert!(matches!(err, RecordsError::DuplicateEnrollment));
}

#[tokio::test]
async fn test_enrollments_are_listed_most_recent_first() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let cs101 = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let cs102 = common::create_course(&registrar, program.uuid, "CS102", "Programming II", 2).await;
    let ma101 = common::create_course(&registrar, program.uuid, "MA101", "Calculus I", 1).await;
    let ana = common::create_student(&registrar, "12345", "Ana", "Gómez", Some(program.uuid)).await;
    let luis = common::create_student(&registrar, "67890", "Luis", "Pérez", Some(program.uuid)).await;

    let mut enrolled = Vec::new();
    for (student, course) in [(&ana, &cs101), (&luis, &cs101), (&ana, &cs102), (&ana, &ma101)] {
        tokio::time::sleep(Duration::from_millis(20)).await;
        enrolled.push(common::enroll(&registrar, student.uuid, course.uuid, "2024-1", None, false).await.uuid);
    }
    let [first, second, third, fourth] = enrolled[..] else {
        panic!("expected four enrollments");
    };

    let page = registrar.list_enrollments(&registrar.enrollment_params()).await.unwrap();
    let listed: Vec<_> = page.items.iter().map(|row| row.enrollment.uuid).collect();
    assert_eq!(listed, vec![fourth, third, second, first]);

    let course = registrar.course_detail(&cs101.uuid).await.unwrap();
    let listed: Vec<_> = course.enrollments.iter().map(|row| row.enrollment.uuid).collect();
    assert_eq!(listed, vec![second, first]);

    let student = registrar.student_detail(&ana.uuid).await.unwrap();
    let listed: Vec<_> = student.enrollments.iter().map(|row| row.enrollment.uuid).collect();
    assert_eq!(listed, vec![fourth, third, first]);
}

#[tokio::test]
async fn test_semester_options_are_distinct_and_descending() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;

    assert!(registrar.semester_options().await.unwrap().is_empty());

    for (code, term) in [("CS101", "2023-2"), ("CS102", "2024-1"), ("CS103", "2023-2"), ("CS104", "2022-1")] {
        let course = common::create_course(&registrar, program.uuid, code, "Course", 1).await;
        common::enroll(&registrar, student.uuid, course.uuid, term, None, false).await;
    }

    assert_eq!(
        registrar.semester_options().await.unwrap(),
        vec!["2024-1", "2023-2", "2022-1"]
    );
}

#[tokio::test]
async fn test_enrollment_detail_and_delete() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;
    let enrollment = common::enroll(&registrar, student.uuid, course.uuid, "2024-1", None, false).await;

    let detail = registrar.enrollment_detail(&enrollment.uuid).await.unwrap();
    assert_eq!(detail.student.map(|s| s.uuid), Some(student.uuid));
    assert_eq!(detail.course.map(|c| c.uuid), Some(course.uuid));

    registrar.delete_enrollment(&enrollment.uuid).await.unwrap();
    assert!(matches!(
        registrar.delete_enrollment(&enrollment.uuid).await,
        Err(RecordsError::NotFound { entity: "Enrollment", .. })
    ));
}

#[tokio::test]
async fn test_dashboard_summary() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let retired = common::create_program(&registrar, "OLD", "Retired Program").await;
    registrar.deactivate_program(&retired.uuid).await.unwrap();
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;

    let mut early = common::student_args("111", "Ana", "Gómez", Some(program.uuid));
    early.admission_date = common::date(2019, 8, 1);
    let early = registrar.create_student(early).await.unwrap();
    let mut late = common::student_args("222", "Luis", "Pérez", Some(program.uuid));
    late.admission_date = common::date(2023, 2, 1);
    let late = registrar.create_student(late).await.unwrap();

    common::enroll(&registrar, early.uuid, course.uuid, "2024-1", None, false).await;

    let dashboard = registrar.dashboard().await.unwrap();
    assert_eq!(dashboard.program_count, 1);
    assert_eq!(dashboard.course_count, 1);
    assert_eq!(dashboard.student_count, 2);
    assert_eq!(dashboard.enrollment_count, 1);
    assert_eq!(dashboard.recent_programs.len(), 1);
    assert_eq!(dashboard.recent_students[0].uuid, late.uuid);
    assert_eq!(dashboard.recent_enrollments.len(), 1);
    assert!(dashboard.recent_enrollments[0].course.is_some());
}
