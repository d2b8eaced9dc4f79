use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mamnon_core::{AppError, ErrorResponse};
use mamnon_models::classes::{
    AgeGroupsQuery, AvailableTeachersQuery, ClassFilterParams, ClassView, CopyClassesDto,
    CopyClassesResponse, CreateClassDto, MessageResponse, PaginatedClassesResponse,
    UpdateClassDto,
};
use mamnon_models::grades::AgeGroupsResponse;
use mamnon_models::ids::ClassId;
use mamnon_models::users::UserSummary;
use tracing::instrument;

use crate::middleware::CallerId;
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/classes",
    params(("x-user-id" = String, Header, description = "Caller user ID")),
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created in the active academic year", body = ClassView),
        (status = 400, description = "Invalid age group or no session selected", body = ErrorResponse),
        (status = 401, description = "Missing or invalid caller header", body = ErrorResponse),
        (status = 404, description = "No active year or teacher not found", body = ErrorResponse),
        (status = 409, description = "Duplicate name or teacher unavailable", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn create_class(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<ClassView>), AppError> {
    let class = state.classes.create_class(caller, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/api/classes",
    params(
        ("x-user-id" = String, Header, description = "Caller user ID"),
        ClassFilterParams
    ),
    responses(
        (status = 200, description = "Page of classes, newest first", body = PaginatedClassesResponse),
        (status = 401, description = "Missing or invalid caller header", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn list_classes(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Query(filters): Query<ClassFilterParams>,
) -> Result<Json<PaginatedClassesResponse>, AppError> {
    let classes = state.classes.list_classes(caller, filters).await?;
    Ok(Json(classes))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(
        ("x-user-id" = String, Header, description = "Caller user ID"),
        ("id" = String, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class details", body = ClassView),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Path(id): Path<ClassId>,
) -> Result<Json<ClassView>, AppError> {
    let class = state.classes.get_class(caller, id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(
        ("x-user-id" = String, Header, description = "Caller user ID"),
        ("id" = String, Path, description = "Class ID")
    ),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = ClassView),
        (status = 400, description = "Invalid age group or no session selected", body = ErrorResponse),
        (status = 403, description = "Academic year is not active", body = ErrorResponse),
        (status = 404, description = "Class or teacher not found", body = ErrorResponse),
        (status = 409, description = "Duplicate name or teacher unavailable", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn update_class(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Path(id): Path<ClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<ClassView>, AppError> {
    let class = state.classes.update_class(caller, id, dto).await?;
    Ok(Json(class))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(
        ("x-user-id" = String, Header, description = "Caller user ID"),
        ("id" = String, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class soft-deleted", body = MessageResponse),
        (status = 403, description = "Academic year is not active", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Path(id): Path<ClassId>,
) -> Result<Json<MessageResponse>, AppError> {
    let ack = state.classes.delete_class(caller, id).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    get,
    path = "/api/classes/available-teachers",
    params(
        ("x-user-id" = String, Header, description = "Caller user ID"),
        AvailableTeachersQuery
    ),
    responses(
        (status = 200, description = "Teachers free to take a homeroom class", body = Vec<UserSummary>)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn available_teachers(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Query(query): Query<AvailableTeachersQuery>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let teachers = state.classes.available_teachers(caller, query).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/classes/age-groups",
    params(AgeGroupsQuery),
    responses(
        (status = 200, description = "Age groups valid for the grade", body = AgeGroupsResponse)
    ),
    tag = "Classes"
)]
pub async fn age_groups(Query(query): Query<AgeGroupsQuery>) -> Json<AgeGroupsResponse> {
    Json(ClassService::age_groups(query.grade))
}

#[utoipa::path(
    post,
    path = "/api/classes/copy",
    params(("x-user-id" = String, Header, description = "Caller user ID")),
    request_body = CopyClassesDto,
    responses(
        (status = 201, description = "Classes copied into the destination year", body = CopyClassesResponse),
        (status = 400, description = "No eligible teachers; nothing copied", body = ErrorResponse),
        (status = 403, description = "Destination year is not active", body = ErrorResponse),
        (status = 404, description = "Year not found or source year has no classes", body = ErrorResponse),
        (status = 409, description = "Destination year already has classes", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn copy_classes(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    ValidatedJson(dto): ValidatedJson<CopyClassesDto>,
) -> Result<(StatusCode, Json<CopyClassesResponse>), AppError> {
    let copied = state.classes.copy_classes(caller, dto).await?;
    Ok((StatusCode::CREATED, Json(copied)))
}
