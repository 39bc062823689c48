mod common;

use campus_records::error::RecordsError;
use campus_records::service::UpdateStudentArgs;
use uuid::Uuid;

#[tokio::test]
async fn test_failed_with_grade_counts_as_failed() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", Some(program.uuid)).await;

    common::enroll(&registrar, student.uuid, course.uuid, "2024-1", Some(common::grade(45)), false).await;

    let detail = registrar.student_detail(&student.uuid).await.unwrap();
    assert_eq!(detail.stats.total, 1);
    assert_eq!(detail.stats.passed, 0);
    assert_eq!(detail.stats.failed, 1);
    assert_eq!(detail.stats.in_progress, 0);
    assert_eq!(detail.average_grade, Some(common::grade(45)));
}

#[tokio::test]
async fn test_average_grade_without_graded_enrollments() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;

    let detail = registrar.student_detail(&student.uuid).await.unwrap();
    assert_eq!(detail.average_grade, None);
    assert_eq!(detail.stats.total, 0);

    common::enroll(&registrar, student.uuid, course.uuid, "2024-1", None, false).await;
    let detail = registrar.student_detail(&student.uuid).await.unwrap();
    assert_eq!(detail.average_grade, None);
    assert_eq!(detail.stats.in_progress, 1);
}

#[tokio::test]
async fn test_average_grade_ignores_ungraded() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", Some(program.uuid)).await;

    let grades = [Some(common::grade(40)), Some(common::grade(30)), None];
    for (index, grade) in grades.into_iter().enumerate() {
        let code = format!("CS10{index}");
        let course = common::create_course(&registrar, program.uuid, &code, "Course", 1).await;
        common::enroll(&registrar, student.uuid, course.uuid, "2024-1", grade, grade.is_some()).await;
    }

    let detail = registrar.student_detail(&student.uuid).await.unwrap();
    assert_eq!(detail.average_grade, Some(common::grade(35)));
    assert_eq!(detail.enrollments.len(), 3);
    assert!(detail
        .enrollments
        .iter()
        .all(|e| e.program.as_ref().map(|p| p.uuid) == Some(program.uuid)));
    assert_eq!(detail.program.map(|p| p.code), Some("ING-SIS".to_string()));
}

#[tokio::test]
async fn test_identification_and_email_must_be_unique() {
    let registrar = common::registrar().await;
    common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;

    let err = registrar
        .create_student(common::student_args("12345", "Luis", "Pérez", None))
        .await
        .unwrap_err();
    assert!(
        matches!(err, RecordsError::UniquenessConflict { entity: "Student", ref field } if field == "identification_number")
    );

    let mut args = common::student_args("67890", "Luis", "Pérez", None);
    args.email = "12345@example.edu".to_string();
    let err = registrar.create_student(args).await.unwrap_err();
    assert!(matches!(err, RecordsError::UniquenessConflict { ref field, .. } if field == "email"));
}

#[tokio::test]
async fn test_update_student_email_conflict_excludes_self() {
    let registrar = common::registrar().await;
    let ana = common::create_student(&registrar, "12345", "Ana", "Gómez", None).await;
    common::create_student(&registrar, "67890", "Luis", "Pérez", None).await;

    let updated = registrar
        .update_student(
            &ana.uuid,
            UpdateStudentArgs {
                email: Some(ana.email.clone()),
                phone: Some(Some("3001234567".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("3001234567"));

    let err = registrar
        .update_student(
            &ana.uuid,
            UpdateStudentArgs {
                email: Some("67890@example.edu".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RecordsError::UniquenessConflict { .. }));

    // Clearing an optional field
    let updated = registrar
        .update_student(
            &ana.uuid,
            UpdateStudentArgs {
                phone: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone, None);
}

#[tokio::test]
async fn test_student_validation() {
    let registrar = common::registrar().await;

    let mut args = common::student_args("12345", "Ana", "Gómez", None);
    args.email = "not-an-address".to_string();
    assert!(matches!(
        registrar.create_student(args).await,
        Err(RecordsError::Validation { field: "email", .. })
    ));

    let mut args = common::student_args("12345", "Ana", "Gómez", None);
    args.phone = Some("1234567890123456".to_string());
    assert!(matches!(
        registrar.create_student(args).await,
        Err(RecordsError::Validation { field: "phone", .. })
    ));

    let args = common::student_args("12345", "Ana", "Gómez", Some(Uuid::new_v4()));
    assert!(matches!(
        registrar.create_student(args).await,
        Err(RecordsError::ReferentialViolation { entity: "Program", .. })
    ));
}

#[tokio::test]
async fn test_list_students_order_filter_and_search() {
    let registrar = common::registrar().await;
    let sis = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    common::create_student(&registrar, "300", "Carla", "Zapata", Some(sis.uuid)).await;
    common::create_student(&registrar, "100", "Bruno", "Arango", Some(sis.uuid)).await;
    common::create_student(&registrar, "200", "Alba", "Arango", None).await;
    let hidden = common::create_student(&registrar, "400", "Dario", "Mejía", Some(sis.uuid)).await;
    registrar.deactivate_student(&hidden.uuid).await.unwrap();

    let page = registrar.list_students(&registrar.student_params()).await.unwrap();
    let numbers: Vec<&str> = page
        .items
        .iter()
        .map(|row| row.student.identification_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["200", "100", "300"]);

    let page = registrar
        .list_students(&registrar.student_params().program(sis.uuid))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);
    assert!(page.items.iter().all(|row| row.program.is_some()));

    let page = registrar
        .list_students(&registrar.student_params().search("ARANGO"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 2);

    let page = registrar
        .list_students(&registrar.student_params().search("300@example"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].student.first_names, "Carla");
}

#[tokio::test]
async fn test_delete_student_removes_enrollments() {
    let registrar = common::registrar().await;
    let program = common::create_program(&registrar, "ING-SIS", "Systems Engineering").await;
    let course = common::create_course(&registrar, program.uuid, "CS101", "Programming I", 1).await;
    let student = common::create_student(&registrar, "12345", "Ana", "Gómez", Some(program.uuid)).await;
    common::enroll(&registrar, student.uuid, course.uuid, "2024-1", None, false).await;

    assert_eq!(registrar.delete_student(&student.uuid).await.unwrap(), 1);

    let detail = registrar.course_detail(&course.uuid).await.unwrap();
    assert_eq!(detail.stats.total, 0);
    assert!(matches!(
        registrar.get_student(&student.uuid).await,
        Err(RecordsError::NotFound { entity: "Student", .. })
    ));
}
