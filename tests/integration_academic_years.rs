mod common;

use axum::http::StatusCode;
use common::{TestSchool, send};
use mamnon::mamnon_models::academic_years::YearStatus;
use mamnon::mamnon_models::ids::AcademicYearId;
use mamnon::mamnon_models::users::UserRole;
use serde_json::json;

#[tokio::test]
async fn test_create_academic_year() {
    let school = TestSchool::new().await;

    let (status, body) = send(
        school.app(),
        "POST",
        "/api/academic-years",
        Some(school.principal),
        Some(json!({ "from_year": 2025, "to_year": 2026 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["from_year"], 2025);
    assert_eq!(body["status"], "inactive");
    assert_eq!(body["is_config"], false);
    assert_eq!(body["school_id"], school.school_id.to_string());
}

#[tokio::test]
async fn test_create_rejects_reversed_range_and_duplicates() {
    let school = TestSchool::new().await;

    let (status, _) = send(
        school.app(),
        "POST",
        "/api/academic-years",
        Some(school.principal),
        Some(json!({ "from_year": 2026, "to_year": 2025 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    school.add_year(2025, YearStatus::Inactive).await;
    let (status, body) = send(
        school.app(),
        "POST",
        "/api/academic-years",
        Some(school.principal),
        Some(json!({ "from_year": 2025, "to_year": 2026 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn test_caller_without_school_is_forbidden() {
    let mut school = TestSchool::new().await;
    let drifter = school.add_user("Không", "Trường", UserRole::Staff).await;
    let mut user = school.store.user(drifter).await.unwrap();
    user.school_id = None;
    school.store.put_user(user).await;

    let (status, _) = send(school.app(), "GET", "/api/academic-years", Some(drifter), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_active_year_lookup_and_activation() {
    let school = TestSchool::new().await;
    let old = school.add_year(2024, YearStatus::Active).await;
    let new = school.add_year(2025, YearStatus::Inactive).await;

    let (status, body) = send(
        school.app(),
        "GET",
        "/api/academic-years/active",
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], old.to_string());

    let (status, body) = send(
        school.app(),
        "POST",
        &format!("/api/academic-years/{new}/activate"),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (_, body) = send(
        school.app(),
        "GET",
        "/api/academic-years/active",
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(body["id"], new.to_string());
    assert!(!school.store.academic_year(old).await.unwrap().is_active());
}

#[tokio::test]
async fn test_missing_active_year_and_unknown_year() {
    let school = TestSchool::new().await;

    let (status, _) = send(
        school.app(),
        "GET",
        "/api/academic-years/active",
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        school.app(),
        "POST",
        &format!("/api/academic-years/{}/activate", AcademicYearId::new()),
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_academic_years_paginates() {
    let school = TestSchool::new().await;
    for from in [2022, 2023, 2024] {
        school.add_year(from, YearStatus::Inactive).await;
    }

    let (status, body) = send(
        school.app(),
        "GET",
        "/api/academic-years?limit=2",
        Some(school.principal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["from_year"], 2024);
    assert_eq!(body["meta"]["total_items"], 3);
    assert_eq!(body["meta"]["total_pages"], 2);
    assert_eq!(body["meta"]["has_more"], true);
}

#[tokio::test]
async fn test_health_and_openapi_are_served() {
    let school = TestSchool::new().await;

    let (status, body) = send(school.app(), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(school.app(), "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/classes/copy"].is_object());
}
