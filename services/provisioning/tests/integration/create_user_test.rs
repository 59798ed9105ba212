use campus_domain::id::{AcademicYearId, ClassId, SubjectId, UserId};
use campus_domain::role::Role;
use campus_provisioning::domain::policy::DenyReason;
use campus_provisioning::domain::request::CreateUserInput;
use campus_provisioning::domain::types::ProvisioningStage;
use campus_provisioning::error::ProvisioningError;

use crate::helpers::{
    School, StageRecorder, admin_input, parent_input, student_input, teacher_input,
};

fn assert_denied(result: Result<impl std::fmt::Debug, ProvisioningError>, expected: DenyReason) {
    match result {
        Err(ProvisioningError::PermissionDenied(reason)) => assert_eq!(reason, expected),
        other => panic!("expected PermissionDenied({expected:?}), got {other:?}"),
    }
}

// ── Authorization ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_deny_non_staff_callers_without_side_effects() {
    let school = School::new();
    let class_id = ClassId::new();
    let inputs = [
        student_input("STU1", class_id),
        teacher_input("T-1"),
        parent_input("P-1"),
        admin_input("new-admin@example.com"),
    ];

    for caller_role in [None, Some(Role::Student), Some(Role::Parent)] {
        let caller = school.caller(caller_role);
        for input in inputs.clone() {
            let result = school.create_user().execute(&caller, input).await;
            assert_denied(result, DenyReason::InsufficientPrivilege);
        }
    }

    let state = school.state();
    assert!(state.writes.is_empty(), "writes: {:?}", state.writes);
    assert!(state.identities.is_empty());
}

#[tokio::test]
async fn should_deny_teacher_creating_teacher_or_admin() {
    let school = School::new();
    let caller = school.teacher_of(ClassId::new());

    let result = school.create_user().execute(&caller, teacher_input("T-2")).await;
    assert_denied(result, DenyReason::TeacherRoleRestricted);

    let result = school
        .create_user()
        .execute(&caller, admin_input("boss@example.com"))
        .await;
    assert_denied(result, DenyReason::TeacherRoleRestricted);

    assert!(school.state().writes.is_empty());
}

#[tokio::test]
async fn should_deny_teacher_adding_student_to_unassigned_class() {
    let school = School::new();
    let assigned = ClassId::new();
    let other = ClassId::new();
    let caller = school.teacher_of(assigned);
    let teachers_before = school.state().teachers.len();

    let result = school
        .create_user()
        .execute(&caller, student_input("STU1", other))
        .await;

    assert_denied(result, DenyReason::ClassNotAssigned);
    let state = school.state();
    assert!(state.writes.is_empty());
    assert!(state.identities.is_empty());
    assert!(state.students.is_empty());
    assert_eq!(state.teachers.len(), teachers_before);
}

#[tokio::test]
async fn should_deny_teacher_caller_without_teacher_record() {
    let school = School::new();
    let caller = school.caller(Some(Role::Teacher));

    let result = school
        .create_user()
        .execute(&caller, student_input("STU1", ClassId::new()))
        .await;

    assert_denied(result, DenyReason::ClassNotAssigned);
}

#[tokio::test]
async fn should_let_teacher_create_parent_without_class_check() {
    let school = School::new();
    let caller = school.caller(Some(Role::Teacher));

    let out = school
        .create_user()
        .execute(&caller, parent_input("PAR-9"))
        .await
        .unwrap();

    assert_eq!(out.user.role, Role::Parent);
    assert_eq!(out.user.login, "par-9@school.internal");
    let state = school.state();
    assert_eq!(state.parents.len(), 1);
    assert_eq!(state.parents[0].occupation.as_deref(), Some("Engineer"));
}

#[tokio::test]
async fn should_report_permission_check_failure_when_teacher_lookup_errors() {
    let school = School::new();
    let caller = school.teacher_of(ClassId::new());
    school.fail(|f| f.find_teacher = true);

    let result = school
        .create_user()
        .execute(&caller, student_input("STU1", ClassId::new()))
        .await;

    assert!(
        matches!(result, Err(ProvisioningError::PermissionCheckFailed(_))),
        "got {result:?}"
    );
    assert!(school.state().writes.is_empty());
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_class_for_students_for_every_caller() {
    let school = School::new();
    let callers = [
        school.admin(),
        school.teacher_of(ClassId::new()),
        school.caller(Some(Role::Parent)),
        school.caller(None),
    ];

    for caller in callers {
        let mut input = student_input("STU1", ClassId::new());
        input.class_id = None;
        match school.create_user().execute(&caller, input).await {
            Err(ProvisioningError::Validation(msg)) => {
                assert_eq!(msg, "class assignment is required for students")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
    assert!(school.state().writes.is_empty());
}

#[tokio::test]
async fn should_fail_validation_identically_on_retry() {
    let school = School::new();
    let caller = school.admin();
    let input = CreateUserInput {
        student_id: Some("STU1".into()),
        role: Some("student".into()),
        class_id: Some(ClassId::new().to_string()),
        ..Default::default()
    };

    let first = school.create_user().execute(&caller, input.clone()).await;
    let second = school.create_user().execute(&caller, input).await;

    match (first, second) {
        (Err(ProvisioningError::Validation(a)), Err(ProvisioningError::Validation(b))) => {
            assert_eq!(a, b);
            assert_eq!(a, "missing required fields: password, fullName");
        }
        other => panic!("expected two validation errors, got {other:?}"),
    }
    assert!(school.state().identities.is_empty());
}

#[tokio::test]
async fn should_reject_unknown_role_before_authorization() {
    let school = School::new();
    let caller = school.caller(None);
    let mut input = admin_input("x@example.com");
    input.role = Some("principal".into());

    let result = school.create_user().execute(&caller, input).await;

    assert!(
        matches!(&result, Err(ProvisioningError::Validation(msg)) if msg == "invalid role: principal"),
        "got {result:?}"
    );
}

// ── Identity creation and rollback ───────────────────────────────────────────

#[tokio::test]
async fn should_return_conflict_for_duplicate_student_id() {
    let school = School::new();
    let class_id = ClassId::new();
    let caller = school.admin();

    let first = school
        .create_user()
        .execute(&caller, student_input("STU1", class_id))
        .await
        .unwrap();
    let second = school
        .create_user()
        .execute(&caller, student_input(" stu 1 ", class_id))
        .await;

    assert!(
        matches!(second, Err(ProvisioningError::IdentityConflict)),
        "got {second:?}"
    );
    let state = school.state();
    assert_eq!(state.identities.len(), 1);
    assert_eq!(state.identities[0].id, first.user.id);
    assert_eq!(state.students.len(), 1);
    assert_eq!(state.students[0].user_id, first.user.id);
    assert_eq!(state.roles.get(&first.user.id), Some(&Role::Student));
}

#[tokio::test]
async fn should_not_compensate_when_identity_creation_fails() {
    let school = School::new();
    let caller = school.admin();
    school.fail(|f| f.create_identity = true);

    let result = school
        .create_user()
        .execute(&caller, admin_input("new@example.com"))
        .await;

    assert!(matches!(result, Err(ProvisioningError::Internal(_))), "got {result:?}");
    assert_eq!(school.state().writes, vec!["create_identity"]);
}

#[tokio::test]
async fn should_delete_identity_when_role_assignment_fails() {
    let school = School::new();
    let caller = school.admin();
    school.fail(|f| f.assign_role = true);

    let result = school
        .create_user()
        .execute(&caller, teacher_input("T-100"))
        .await;

    match result {
        Err(ProvisioningError::RoleAssignmentFailed {
            rollback_failures, ..
        }) => assert!(rollback_failures.is_empty()),
        other => panic!("expected RoleAssignmentFailed, got {other:?}"),
    }
    let state = school.state();
    assert!(state.identity_by_login("t-100@school.internal").is_none());
    assert_eq!(
        state.writes,
        vec!["create_identity", "assign_role", "delete_identity"]
    );
    assert!(state.teachers.is_empty());
}

#[tokio::test]
async fn should_surface_role_failure_even_when_rollback_fails() {
    let school = School::new();
    let caller = school.admin();
    school.fail(|f| {
        f.assign_role = true;
        f.delete_identity = true;
    });

    let result = school
        .create_user()
        .execute(&caller, admin_input("orphan@example.com"))
        .await;

    match result {
        Err(err @ ProvisioningError::RoleAssignmentFailed { .. }) => {
            assert_eq!(err.kind(), "ROLE_ASSIGNMENT_FAILED");
            assert_eq!(
                err.to_string(),
                "failed to assign role; rollback incomplete, the new identity still exists"
            );
            let detail = err.detail();
            assert!(detail.contains("rollback failed: delete identity"));
            assert!(detail.contains("orphan@example.com"));
            let ProvisioningError::RoleAssignmentFailed {
                cause,
                rollback_failures,
            } = err
            else {
                unreachable!()
            };
            assert!(format!("{cause:#}").contains("assign role"));
            assert_eq!(rollback_failures.len(), 1);
            assert!(rollback_failures[0].to_string().contains("orphan@example.com"));
            assert!(rollback_failures[0].to_string().contains("delete identity"));
        }
        other => panic!("expected RoleAssignmentFailed, got {other:?}"),
    }
    // The orphan is still there for manual cleanup.
    assert!(school.state().identity_by_login("orphan@example.com").is_some());
}

// ── Role records and relationships ───────────────────────────────────────────

#[tokio::test]
async fn should_create_teacher_with_class_subject_assignment() {
    let school = School::new();
    let caller = school.admin();
    let (c1, s1) = (ClassId::new(), SubjectId::new());
    let mut input = teacher_input("T-100");
    input.subject_ids = vec![s1.to_string()];
    input.class_ids = vec![c1.to_string()];

    let out = school.create_user().execute(&caller, input).await.unwrap();

    assert_eq!(out.user.login, "t-100@school.internal");
    assert_eq!(out.user.role, Role::Teacher);
    assert!(out.warnings.is_empty());
    let state = school.state();
    let teacher = state
        .teachers
        .iter()
        .find(|t| t.user_id == out.user.id)
        .expect("teacher record");
    assert_eq!(teacher.employee_id.as_deref(), Some("T-100"));
    assert_eq!(state.assignments.len(), 1);
    let assignment = state.assignments[0];
    assert_eq!(assignment.teacher_id, teacher.id);
    assert_eq!(assignment.class_id, c1);
    assert_eq!(assignment.subject_id, s1);
    assert!(!assignment.is_class_teacher);
}

#[tokio::test]
async fn should_create_cross_product_of_classes_and_subjects() {
    let school = School::new();
    let caller = school.admin();
    let classes = [ClassId::new(), ClassId::new()];
    let subjects = [SubjectId::new(), SubjectId::new(), SubjectId::new()];
    let mut input = teacher_input("T-7");
    input.class_ids = classes.iter().map(ToString::to_string).collect();
    input.subject_ids = subjects.iter().map(ToString::to_string).collect();

    school.create_user().execute(&caller, input).await.unwrap();

    let state = school.state();
    assert_eq!(state.assignments.len(), 6);
    for class_id in classes {
        for subject_id in subjects {
            assert!(
                state
                    .assignments
                    .iter()
                    .any(|a| a.class_id == class_id && a.subject_id == subject_id)
            );
        }
    }
}

#[tokio::test]
async fn should_skip_assignments_when_only_classes_given() {
    let school = School::new();
    let caller = school.admin();
    let mut input = teacher_input("T-8");
    input.class_ids = vec![ClassId::new().to_string()];

    school.create_user().execute(&caller, input).await.unwrap();

    let state = school.state();
    assert_eq!(state.teachers.len(), 1);
    assert!(state.assignments.is_empty());
    assert!(!state.writes.contains(&"create_assignments"));
}

#[tokio::test]
async fn should_create_student_linked_to_primary_parent() {
    let school = School::new();
    let c1 = ClassId::new();
    let caller = school.teacher_of(c1);
    let (p1_user, p1_record) = school.parent();
    let year = AcademicYearId::new();
    school.state().active_year = Some(year);
    let mut input = student_input("STU1", c1);
    input.parent_ids = vec![p1_user.to_string()];
    input.roll_number = Some("12".into());

    let out = school.create_user().execute(&caller, input).await.unwrap();

    assert_eq!(out.user.login, "stu1@school.internal");
    assert_eq!(out.user.full_name, "Sam Student");
    assert!(out.warnings.is_empty());
    let state = school.state();
    assert_eq!(state.students.len(), 1);
    let student = &state.students[0];
    assert_eq!(student.user_id, out.user.id);
    assert_eq!(student.class_id, c1);
    assert_eq!(student.roll_number.as_deref(), Some("12"));
    assert_eq!(student.academic_year_id, Some(year));
    assert_eq!(student.status, "active");
    assert_eq!(state.links.len(), 1);
    assert_eq!(state.links[0].student_id, student.id);
    assert_eq!(state.links[0].parent_id, p1_record);
    assert!(state.links[0].is_primary);
}

#[tokio::test]
async fn should_mark_only_first_supplied_parent_primary() {
    let school = School::new();
    let caller = school.admin();
    let (first, first_record) = school.parent();
    let (second, second_record) = school.parent();
    let mut input = student_input("STU2", ClassId::new());
    input.parent_ids = vec![first.to_string(), second.to_string()];

    school.create_user().execute(&caller, input).await.unwrap();

    let state = school.state();
    let primary: Vec<_> = state.links.iter().filter(|l| l.is_primary).collect();
    assert_eq!(primary.len(), 1);
    assert_eq!(primary[0].parent_id, first_record);
    assert!(
        state
            .links
            .iter()
            .any(|l| l.parent_id == second_record && !l.is_primary)
    );
}

#[tokio::test]
async fn should_skip_unresolved_parent_ids_silently() {
    let school = School::new();
    let caller = school.admin();
    let (known, known_record) = school.parent();
    let mut input = student_input("STU3", ClassId::new());
    input.parent_ids = vec![UserId::new().to_string(), known.to_string()];

    let out = school.create_user().execute(&caller, input).await.unwrap();

    assert!(out.warnings.is_empty());
    let state = school.state();
    assert_eq!(state.links.len(), 1);
    assert_eq!(state.links[0].parent_id, known_record);
    // Primary follows the supplied position, not the resolved one.
    assert!(!state.links[0].is_primary);
}

#[tokio::test]
async fn should_skip_malformed_parent_ids() {
    let school = School::new();
    let class_id = ClassId::new();
    let caller = school.teacher_of(class_id);
    let (known, known_record) = school.parent();
    let mut input = student_input("STU9", class_id);
    input.parent_ids = vec!["P-unknown".into(), known.to_string()];

    let out = school.create_user().execute(&caller, input).await.unwrap();

    assert!(out.warnings.is_empty());
    let state = school.state();
    assert_eq!(state.students.len(), 1);
    assert_eq!(state.links.len(), 1);
    assert_eq!(state.links[0].parent_id, known_record);
    assert!(!state.links[0].is_primary);
}

#[tokio::test]
async fn should_tolerate_missing_or_failing_academic_year_lookup() {
    let school = School::new();
    let caller = school.admin();

    let out = school
        .create_user()
        .execute(&caller, student_input("STU4", ClassId::new()))
        .await
        .unwrap();
    assert!(out.warnings.is_empty());

    school.fail(|f| f.find_active_year = true);
    let out = school
        .create_user()
        .execute(&caller, student_input("STU5", ClassId::new()))
        .await
        .unwrap();
    assert_eq!(out.warnings.len(), 1);

    let state = school.state();
    assert_eq!(state.students.len(), 2);
    assert!(state.students.iter().all(|s| s.academic_year_id.is_none()));
}

#[tokio::test]
async fn should_succeed_when_role_record_insert_fails() {
    let school = School::new();
    let caller = school.admin();
    school.fail(|f| f.create_student = true);
    let (parent_user, _) = school.parent();
    let mut input = student_input("STU6", ClassId::new());
    input.parent_ids = vec![parent_user.to_string()];

    let out = school.create_user().execute(&caller, input).await.unwrap();

    assert_eq!(out.user.role, Role::Student);
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].stage, ProvisioningStage::CreatingRoleRecord);
    assert!(out.warnings[0].detail.contains("create student"));
    let state = school.state();
    assert!(state.identity_by_login("stu6@school.internal").is_some());
    assert_eq!(state.roles.get(&out.user.id), Some(&Role::Student));
    assert!(state.links.is_empty());
    assert!(!state.writes.contains(&"delete_identity"));
}

#[tokio::test]
async fn should_succeed_when_linking_fails() {
    let school = School::new();
    let caller = school.admin();
    school.fail(|f| f.create_assignments = true);
    let mut input = teacher_input("T-9");
    input.class_ids = vec![ClassId::new().to_string()];
    input.subject_ids = vec![SubjectId::new().to_string()];

    let out = school.create_user().execute(&caller, input).await.unwrap();

    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].stage, ProvisioningStage::LinkingRelationships);
    let state = school.state();
    assert_eq!(state.teachers.len(), 1);
    assert!(state.assignments.is_empty());
}

#[tokio::test]
async fn should_warn_on_malformed_assignment_ids() {
    let school = School::new();
    let caller = school.admin();
    let mut input = teacher_input("T-100");
    input.class_ids = vec!["C1".into()];
    input.subject_ids = vec!["S1".into()];

    let out = school.create_user().execute(&caller, input).await.unwrap();

    assert_eq!(out.user.role, Role::Teacher);
    assert_eq!(out.warnings.len(), 2);
    assert!(
        out.warnings
            .iter()
            .all(|w| w.stage == ProvisioningStage::LinkingRelationships)
    );
    assert!(out.warnings[0].detail.contains("invalid class id: C1"));
    assert!(out.warnings[1].detail.contains("invalid subject id: S1"));
    let state = school.state();
    assert_eq!(state.teachers.len(), 1);
    assert!(state.assignments.is_empty());
    assert!(!state.writes.contains(&"create_assignments"));
}

#[tokio::test]
async fn should_link_remaining_assignment_ids_when_one_is_malformed() {
    let school = School::new();
    let caller = school.admin();
    let (c1, s1) = (ClassId::new(), SubjectId::new());
    let mut input = teacher_input("T-101");
    input.class_ids = vec![c1.to_string(), "C-bad".into()];
    input.subject_ids = vec![s1.to_string()];

    let out = school.create_user().execute(&caller, input).await.unwrap();

    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].detail.contains("C-bad"));
    let state = school.state();
    assert_eq!(state.assignments.len(), 1);
    assert_eq!(state.assignments[0].class_id, c1);
    assert_eq!(state.assignments[0].subject_id, s1);
}

#[tokio::test]
async fn should_warn_on_duplicate_roll_number() {
    let school = School::new();
    let caller = school.admin();
    let class_id = ClassId::new();
    let mut first = student_input("STU7", class_id);
    first.roll_number = Some("1".into());
    let mut second = student_input("STU8", class_id);
    second.roll_number = Some("1".into());

    school.create_user().execute(&caller, first).await.unwrap();
    let out = school.create_user().execute(&caller, second).await.unwrap();

    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].detail.contains("roll number"));
    assert_eq!(school.state().students.len(), 1);
}

#[tokio::test]
async fn should_create_admin_without_role_record() {
    let school = School::new();
    let caller = school.admin();

    let out = school
        .create_user()
        .execute(&caller, admin_input("Head@Example.com"))
        .await
        .unwrap();

    assert_eq!(out.user.login, "Head@Example.com");
    assert_eq!(out.user.role, Role::SchoolAdmin);
    assert_eq!(school.state().writes, vec!["create_identity", "assign_role"]);
}

// ── Stage tracking ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_record_failed_stage_after_rollback() {
    let school = School::new();
    let caller = school.admin();
    school.fail(|f| f.assign_role = true);
    let recorder = StageRecorder::default();
    let _guard = recorder.install();

    let result = school
        .create_user()
        .execute(&caller, admin_input("new@example.com"))
        .await;

    assert!(result.is_err());
    assert_eq!(
        recorder.stages(),
        [
            "validating",
            "authorizing",
            "creating_identity",
            "assigning_role",
            "rolling_back",
            "failed",
        ]
    );
}

#[tokio::test]
async fn should_record_failed_stage_on_validation_error() {
    let school = School::new();
    let caller = school.admin();
    let recorder = StageRecorder::default();
    let _guard = recorder.install();

    let result = school
        .create_user()
        .execute(&caller, CreateUserInput::default())
        .await;

    assert!(matches!(result, Err(ProvisioningError::Validation(_))));
    assert_eq!(recorder.stages(), ["validating", "failed"]);
}

#[tokio::test]
async fn should_end_in_succeeded_stage() {
    let school = School::new();
    let caller = school.admin();
    let recorder = StageRecorder::default();
    let _guard = recorder.install();

    school
        .create_user()
        .execute(&caller, admin_input("ok@example.com"))
        .await
        .unwrap();

    let stages = recorder.stages();
    assert_eq!(stages.last().map(String::as_str), Some("succeeded"));
    assert!(!stages.iter().any(|s| s == "failed"));
}
