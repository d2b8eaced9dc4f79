mod common;

use axum::http::StatusCode;
use common::{TestSchool, send};
use mamnon::mamnon_models::academic_years::YearStatus;
use mamnon::mamnon_models::ids::{AcademicYearId, ClassId, UserId};
use serde_json::{Value, json};

const KITCHEN: &str = "Tổ cấp dưỡng";

fn class_body(name: &str, teacher: UserId) -> Value {
    json!({
        "grade": "Lá",
        "age_group": "Lá 1",
        "name": name,
        "home_room_teacher": teacher,
        "sessions": { "morning": true }
    })
}

async fn create_class(school: &TestSchool, name: &str, teacher: UserId) -> Value {
    let (status, body) = send(
        school.app(),
        "POST",
        "/api/classes",
        Some(school.principal),
        Some(class_body(name, teacher)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn class_id(body: &Value) -> ClassId {
    body["id"].as_str().unwrap().parse().unwrap()
}

fn teacher_ids(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_class_in_active_year() {
    let mut school = TestSchool::new().await;
    let year = school.add_year(2025, YearStatus::Active).await;
    let teacher = school.add_teacher("An").await;

    let body = create_class(&school, "Lá 1A", teacher).await;

    assert_eq!(body["name"], "Lá 1A");
    assert_eq!(body["grade"], "Lá");
    assert_eq!(body["academic_year"]["id"], year.to_string());
    assert_eq!(body["home_room_teacher"]["id"], teacher.to_string());
    assert_eq!(body["created_by"]["id"], school.principal.to_string());
    assert!(body["class_code"].as_str().unwrap().starts_with("LOP-"));

    let id = class_id(&body);
    assert_eq!(school.store.user(teacher).await.unwrap().class_id, Some(id));
    assert!(school.store.academic_year(year).await.unwrap().is_config);
}

#[tokio::test]
async fn test_missing_or_invalid_caller_is_unauthorized() {
    let school = TestSchool::new().await;

    let (status, body) = send(school.app(), "GET", "/api/classes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let request = axum::http::Request::builder()
        .uri("/api/classes")
        .header("x-user-id", "not-a-uuid")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(school.app(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_caller_is_not_found() {
    let school = TestSchool::new().await;
    let (status, _) = send(school.app(), "GET", "/api/classes", Some(UserId::new()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_without_active_year_is_not_found() {
    let mut school = TestSchool::new().await;
    school.add_year(2025, YearStatus::Inactive).await;
    let teacher = school.add_teacher("An").await;

    let (status, body) = send(
        school.app(),
        "POST",
        "/api/classes",
        Some(school.principal),
        Some(class_body("Lá 1A", teacher)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No active academic year found for this school");
}

#[tokio::test]
async fn test_duplicate_name_is_conflict() {
    let mut school = TestSchool::new().await;
    school.add_year(2025, YearStatus::Active).await;
    let first = school.add_teacher("An").await;
    let second = school.add_teacher("Bình").await;
    create_class(&school, "Lá 1A", first).await;

    let (status, body) = send(
        school.app(),
        "POST",
        "/api/classes",
        Some(school.principal),
        Some(class_body("Lá 1A", second)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn test_invalid_age_group_and_missing_session_are_bad_requests() {
    let mut school = TestSchool::new().await;
    school.add_year(2025, YearStatus::Active).await;
    let teacher = school.add_teacher("An").await;

    let mut body = class_body("Lá 1A", teacher);
    body["age_group"] = json!("Mầm 1");
    let (status, _) = send(school.app(), "POST", "/api/classes", Some(school.principal), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = class_body("Lá 1A", teacher);
    body["sessions"] = json!({ "morning": false, "afternoon": false, "evening": false });
    let (status, _) = send(school.app(), "POST", "/api/classes", Some(school.principal), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(school.store.all_classes().await.is_empty());
}

#[tokio::test]
async fn test_malformed_and_invalid_bodies() {
    let mut school = TestSchool::new().await;
    school.add_year(2025, YearStatus::Active).await;
    let teacher = school.add_teacher("An").await;

    let (status, body) = send(
        school.app(),
        "POST",
        "/api/classes",
        Some(school.principal),
        Some(json!({ "grade": "Lá", "age_group": "Lá 1", "home_room_teacher": teacher })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");

    let mut unknown_grade = class_body("Lá 1A", teacher);
    unknown_grade["grade"] = json!("Lớp 1");
    let (status, _) = send(school.app(), "POST", "/api/classes", Some(school.principal), Some(unknown_grade)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        school.app(),
        "POST",
        "/api/classes",
        Some(school.principal),
        Some(class_body("", teacher)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "unprocessable");
}

#[tokio::test]
async fn test_teacher_cannot_lead_two_classes_in_one_year() {
    let mut school = TestSchool::new().await;
    school.add_year(2025, YearStatus::Active).await;
    let teacher = school.add_teacher("An").await;
    create_class(&school, "Lá 1A", teacher).await;

    let (status, body) = send(
        school.app(),
        "POST",
        "/api/classes",
        Some(school.principal),
        Some(class_body("Lá 1B", teacher)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Lá 1A"));
}

#[tokio::test]
async fn test_kitchen_manager_cannot_be_homeroom_teacher() {
    let mut school = TestSchool::new().await;
    let year = school.add_year(2025, YearStatus::Active).await;
    let cook = school.add_teacher("Cúc").await;
    school.add_department(year, KITCHEN, vec![cook]).await;

    let (status, body) = send(
        school.app(),
        "POST",
        "/api/classes",
        Some(school.principal),
        Some(class_body("Lá 1A", cook)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains(KITCHEN));
}

#[tokio::test]
async fn test_update_moves_homeroom_back_reference() {
    let mut school = TestSchool::new().await;
    school.add_year(2025, YearStatus::Active).await;
    let first = school.add_teacher("An").await;
    let second = school.add_teacher("Bình").await;
    let id = class_id(&create_class(&school, "Lá 1A", first).await);

    let (status, body) = send(
        school.app(),
        "PUT",
        &format!("/api/classes/{id}"),
        Some(school.principal),
        Some(json!({ "home_room_teacher": second, "description": "Phòng 2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["home_room_teacher"]["id"], second.to_string());
    assert_eq!(body["description"], "Phòng 2");
    assert_eq!(body["name"], "Lá 1A");

    assert_eq!(school.store.user(first).await.unwrap().class_id, None);
    assert_eq!(school.store.user(second).await.unwrap().class_id, Some(id));
}

#[tokio::test]
async fn test_classes_of_inactive_year_are_read_only() {
    let mut school = TestSchool::new().await;
    school.add_year(2024, YearStatus::Active).await;
    let teacher = school.add_teacher("An").await;
    let id = class_id(&create_class(&school, "Lá 1A", teacher).await);

    let next = school.add_year(2025, YearStatus::Inactive).await;
    let (status, _) = send(
        school.app(),
        "POST",
        &format!("/api/academic-years/{next}/activate"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        school.app(),
        "PUT",
        &format!("/api/classes/{id}"),
        Some(school.principal),
        Some(json!({ "name": "Lá 1B" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");

    let (status, _) = send(
        school.app(),
        "DELETE",
        &format!("/api/classes/{id}"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        school.app(),
        "GET",
        &format!("/api/classes/{id}"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_hides_class_and_frees_teacher() {
    let mut school = TestSchool::new().await;
    let year = school.add_year(2025, YearStatus::Active).await;
    let teacher = school.add_teacher("An").await;
    let id = class_id(&create_class(&school, "Lá 1A", teacher).await);

    let (status, body) = send(
        school.app(),
        "DELETE",
        &format!("/api/classes/{id}"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Class deleted successfully");

    let (status, _) = send(
        school.app(),
        "GET",
        &format!("/api/classes/{id}"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(school.store.class(id).await.unwrap().is_destroyed);
    assert_eq!(school.store.user(teacher).await.unwrap().class_id, None);

    let (_, available) = send(
        school.app(),
        "GET",
        &format!("/api/classes/available-teachers?academic_year_id={year}"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(teacher_ids(&available), vec![teacher.to_string()]);

    // The name is free again once the class is gone.
    create_class(&school, "Lá 1A", teacher).await;
}

#[tokio::test]
async fn test_list_filters_and_paginates_newest_first() {
    let mut school = TestSchool::new().await;
    school.add_year(2025, YearStatus::Active).await;
    for name in ["Lá 1A", "Lá 1B", "Lá 1C"] {
        let teacher = school.add_teacher(name).await;
        create_class(&school, name, teacher).await;
    }

    let (status, body) = send(
        school.app(),
        "GET",
        "/api/classes?grade=L%C3%A1&limit=2&page=1",
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Lá 1C", "Lá 1B"]);
    assert_eq!(body["meta"]["total_items"], 3);
    assert_eq!(body["meta"]["has_more"], true);

    let (_, body) = send(
        school.app(),
        "GET",
        "/api/classes?name=1b",
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(body["meta"]["total_items"], 1);
    assert_eq!(body["data"][0]["name"], "Lá 1B");
}

#[tokio::test]
async fn test_classes_of_other_schools_are_invisible() {
    let mut school = TestSchool::new().await;
    school.add_year(2025, YearStatus::Active).await;
    let teacher = school.add_teacher("An").await;
    let id = class_id(&create_class(&school, "Lá 1A", teacher).await);

    let mut other = TestSchool::new().await;
    other.store = school.store.clone();
    let outsider = other
        .add_user("Người", "Ngoài", mamnon::mamnon_models::users::UserRole::Principal)
        .await;

    let (status, _) = send(
        school.app(),
        "GET",
        &format!("/api/classes/{id}"),
        Some(outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(school.app(), "GET", "/api/classes", Some(outsider), None).await;
    assert_eq!(body["meta"]["total_items"], 0);
}

#[tokio::test]
async fn test_available_teachers_excludes_assigned_and_kitchen() {
    let mut school = TestSchool::new().await;
    let year = school.add_year(2025, YearStatus::Active).await;
    let assigned = school.add_teacher("An").await;
    let free = school.add_teacher("Bình").await;
    let cook = school.add_teacher("Cúc").await;
    school.add_department(year, KITCHEN, vec![cook]).await;
    let id = class_id(&create_class(&school, "Lá 1A", assigned).await);

    let (status, body) = send(
        school.app(),
        "GET",
        &format!("/api/classes/available-teachers?academic_year_id={year}"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teacher_ids(&body), vec![free.to_string()]);

    // Editing a class keeps its own teacher selectable.
    let (_, body) = send(
        school.app(),
        "GET",
        &format!("/api/classes/available-teachers?academic_year_id={year}&current_class_id={id}"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(
        teacher_ids(&body),
        vec![assigned.to_string(), free.to_string()]
    );

    // A year without classes or departments offers every teacher.
    let (status, body) = send(
        school.app(),
        "GET",
        &format!(
            "/api/classes/available-teachers?academic_year_id={}",
            AcademicYearId::new()
        ),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_age_groups_need_no_caller() {
    let school = TestSchool::new().await;

    let (status, body) = send(school.app(), "GET", "/api/classes/age-groups?grade=L%C3%A1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grade"], "Lá");
    assert_eq!(body["age_groups"], json!(["Lá 1", "Lá 2", "Lá 3"]));

    let (status, _) = send(school.app(), "GET", "/api/classes/age-groups?grade=Unknown", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_copy_classes_into_new_year() {
    let mut school = TestSchool::new().await;
    let old_year = school.add_year(2024, YearStatus::Active).await;
    let first = school.add_teacher("An").await;
    let second = school.add_teacher("Bình").await;
    create_class(&school, "Lá 1A", first).await;
    create_class(&school, "Lá 1B", second).await;

    let new_year = school.add_year(2025, YearStatus::Inactive).await;
    send(
        school.app(),
        "POST",
        &format!("/api/academic-years/{new_year}/activate"),
        Some(school.principal),
        None,
    )
    .await;

    let body = json!({
        "from_academic_year_id": old_year,
        "to_academic_year_id": new_year
    });
    let (status, copied) = send(
        school.app(),
        "POST",
        "/api/classes/copy",
        Some(school.principal),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{copied}");
    assert_eq!(copied["count"], 2);
    let names: Vec<&str> = copied["classes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Lá 1A", "Lá 1B"]);
    for class in copied["classes"].as_array().unwrap() {
        assert_eq!(class["academic_year_id"], new_year.to_string());
    }
    assert!(school.store.academic_year(new_year).await.unwrap().is_config);

    let (status, _) = send(
        school.app(),
        "POST",
        "/api/classes/copy",
        Some(school.principal),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_copy_rejects_inactive_destination_and_empty_source() {
    let mut school = TestSchool::new().await;
    let active = school.add_year(2025, YearStatus::Active).await;
    let inactive = school.add_year(2023, YearStatus::Inactive).await;
    let empty = school.add_year(2022, YearStatus::Inactive).await;
    let teacher = school.add_teacher("An").await;
    create_class(&school, "Lá 1A", teacher).await;

    let (status, _) = send(
        school.app(),
        "POST",
        "/api/classes/copy",
        Some(school.principal),
        Some(json!({ "from_academic_year_id": active, "to_academic_year_id": inactive })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let destination = school.add_year(2026, YearStatus::Inactive).await;
    send(
        school.app(),
        "POST",
        &format!("/api/academic-years/{destination}/activate"),
        Some(school.principal),
        None,
    )
    .await;
    let (status, _) = send(
        school.app(),
        "POST",
        "/api/classes/copy",
        Some(school.principal),
        Some(json!({ "from_academic_year_id": empty, "to_academic_year_id": destination })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
