use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use mamnon::mamnon_config::{AssignmentPolicy, CorsConfig};
use mamnon::mamnon_models::academic_years::{AcademicYear, YearStatus};
use mamnon::mamnon_models::departments::Department;
use mamnon::mamnon_models::ids::{AcademicYearId, DepartmentId, SchoolId, UserId};
use mamnon::mamnon_models::users::{User, UserRole};
use mamnon::router::init_router;
use mamnon::state::AppState;
use mamnon::store::MemoryStore;
use serde_json::Value;
use tower::ServiceExt;

/// One school with a principal, seeded into an in-memory store.
#[allow(dead_code)]
pub struct TestSchool {
    pub store: MemoryStore,
    pub school_id: SchoolId,
    pub principal: UserId,
    seeded: i64,
}

#[allow(dead_code)]
impl TestSchool {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let school_id = SchoolId::new();
        let mut school = Self {
            store,
            school_id,
            principal: UserId::new(),
            seeded: 0,
        };
        school.principal = school
            .add_user("Hiệu", "Trưởng", UserRole::Principal)
            .await;
        school
    }

    pub fn app(&self) -> Router {
        let state = AppState::new(Arc::new(self.store.clone()), AssignmentPolicy::default());
        init_router(state, &CorsConfig::default())
    }

    /// Users are seeded with increasing `created_at` so listing order is stable.
    pub async fn add_user(&mut self, first_name: &str, last_name: &str, role: UserRole) -> UserId {
        self.seeded += 1;
        let created_at = Utc::now() - Duration::hours(1) + Duration::seconds(self.seeded);
        let id = UserId::new();
        self.store
            .put_user(User {
                id,
                school_id: Some(self.school_id),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: format!("{}@mamnon.test", id),
                role,
                is_active: true,
                is_destroyed: false,
                class_id: None,
                created_at,
                updated_at: created_at,
            })
            .await;
        id
    }

    pub async fn add_teacher(&mut self, first_name: &str) -> UserId {
        self.add_user(first_name, "Giáo viên", UserRole::Teacher).await
    }

    pub async fn add_year(&self, from_year: i32, status: YearStatus) -> AcademicYearId {
        let id = AcademicYearId::new();
        self.store
            .put_academic_year(AcademicYear {
                id,
                school_id: self.school_id,
                from_year,
                to_year: from_year + 1,
                status,
                is_config: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await;
        id
    }

    pub async fn add_department(
        &self,
        academic_year_id: AcademicYearId,
        name: &str,
        managers: Vec<UserId>,
    ) {
        self.store
            .put_department(Department {
                id: DepartmentId::new(),
                school_id: self.school_id,
                academic_year_id,
                name: name.to_string(),
                manager_ids: managers,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await;
    }
}

/// Sends one request and returns the status with the decoded JSON body.
#[allow(dead_code)]
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    caller: Option<UserId>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header("x-user-id", caller.to_string());
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        // Extractor rejections from axum itself are plain text.
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}
