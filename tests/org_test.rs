//! Admin-side organisation CRUD: faculties, departments, and accounts.

mod common;

use common::*;
use obeflow::auth::password;
use obeflow::errors::AppError;
use obeflow::models::{department, faculty, user};

#[tokio::test]
async fn test_faculty_crud_lifecycle() {
    let db = setup_test_db().await;

    let id = faculty::create(
        db.pool(),
        &faculty::FacultyInput {
            name: "Engineering".to_string(),
            abbreviation: "ENG".to_string(),
        },
    )
    .await
    .expect("create");

    let fetched = faculty::find_by_id(db.pool(), id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(fetched.name, "Engineering");
    assert_eq!(fetched.abbreviation, "ENG");

    faculty::update(
        db.pool(),
        id,
        &faculty::FacultyInput {
            name: "Engineering and Technology".to_string(),
            abbreviation: "ET".to_string(),
        },
    )
    .await
    .expect("update");

    let all = faculty::find_all(db.pool()).await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Engineering and Technology");

    faculty::delete(db.pool(), id).await.expect("delete");
    assert!(faculty::find_all(db.pool()).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_duplicate_faculty_name_reported_against_name_field() {
    let db = setup_test_db().await;

    let input = faculty::FacultyInput {
        name: "Engineering".to_string(),
        abbreviation: "ENG".to_string(),
    };
    faculty::create(db.pool(), &input).await.expect("first create");

    let result = faculty::create(db.pool(), &input).await;
    match result {
        Err(AppError::Validation(errors)) => {
            assert_eq!(errors.get("name"), Some(&vec!["already taken".to_string()]));
        }
        other => panic!("expected name validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_faculty_rename_keeps_its_own_name_available() {
    let db = setup_test_db().await;

    let id = faculty::create(
        db.pool(),
        &faculty::FacultyInput {
            name: "Engineering".to_string(),
            abbreviation: "ENG".to_string(),
        },
    )
    .await
    .expect("create");

    // Re-submitting the unchanged name against the same row is not a collision.
    faculty::update(
        db.pool(),
        id,
        &faculty::FacultyInput {
            name: "Engineering".to_string(),
            abbreviation: "COE".to_string(),
        },
    )
    .await
    .expect("same-name update");
}

#[tokio::test]
async fn test_department_requires_existing_faculty() {
    let db = setup_test_db().await;

    let result = department::create(
        db.pool(),
        &department::DepartmentInput {
            faculty_id: 42,
            name: "Computer Engineering".to_string(),
            abbreviation: "CPE".to_string(),
        },
    )
    .await;
    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.contains_key("faculty_id"));
        }
        other => panic!("expected faculty_id validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_department_listing_carries_faculty_name() {
    let db = setup_test_db().await;
    let org = seed_org(db.pool()).await;

    let all = department::find_all(db.pool()).await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, org.department_id);
    assert!(!all[0].faculty_name.is_empty());
}

#[tokio::test]
async fn test_user_create_rejects_unknown_role() {
    let db = setup_test_db().await;

    let result = user::create(
        db.pool(),
        &user::NewUser {
            username: "jsmith".to_string(),
            password: password::hash_password("secret-pass-1").expect("hash"),
            email: "jsmith@example.edu".to_string(),
            display_name: "J. Smith".to_string(),
            role: "superuser".to_string(),
            faculty_id: None,
            department_id: None,
        },
    )
    .await;
    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.contains_key("role"));
        }
        other => panic!("expected role validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_user_role_stored_in_canonical_form() {
    let db = setup_test_db().await;
    let org = seed_org(db.pool()).await;

    let id = user::create(
        db.pool(),
        &user::NewUser {
            username: "chair".to_string(),
            password: password::hash_password("secret-pass-1").expect("hash"),
            email: "chair@example.edu".to_string(),
            display_name: "Department Chair".to_string(),
            role: "Department".to_string(),
            faculty_id: Some(org.faculty_id),
            department_id: Some(org.department_id),
        },
    )
    .await
    .expect("create");

    let stored = user::find_by_id(db.pool(), id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(stored.role, "department");
    assert!(password::verify_password("secret-pass-1", &stored.password).expect("verify"));
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let db = setup_test_db().await;

    let new_user = user::NewUser {
        username: "chair".to_string(),
        password: password::hash_password("secret-pass-1").expect("hash"),
        email: "chair@example.edu".to_string(),
        display_name: "Department Chair".to_string(),
        role: "department".to_string(),
        faculty_id: None,
        department_id: None,
    };
    user::create(db.pool(), &new_user).await.expect("first create");

    let result = user::create(db.pool(), &new_user).await;
    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.contains_key("username"));
        }
        other => panic!("expected username validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_user_partial_update() {
    let db = setup_test_db().await;

    let id = user::create(
        db.pool(),
        &user::NewUser {
            username: "dean".to_string(),
            password: password::hash_password("secret-pass-1").expect("hash"),
            email: "dean@example.edu".to_string(),
            display_name: "The Dean".to_string(),
            role: "dean".to_string(),
            faculty_id: None,
            department_id: None,
        },
    )
    .await
    .expect("create");

    user::update(
        db.pool(),
        id,
        &user::UpdateUser {
            email: Some("dean.office@example.edu".to_string()),
            display_name: None,
            role: None,
            faculty_id: None,
            department_id: None,
        },
    )
    .await
    .expect("update");

    let stored = user::find_display_by_id(db.pool(), id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(stored.email, "dean.office@example.edu");
    assert_eq!(stored.display_name, "The Dean");
    assert_eq!(stored.role, "dean");
}
