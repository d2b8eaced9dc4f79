use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mamnon_core::{AppError, ErrorResponse, PaginationParams};
use mamnon_models::academic_years::{
    AcademicYear, CreateAcademicYearDto, PaginatedAcademicYearsResponse,
};
use mamnon_models::ids::AcademicYearId;
use tracing::instrument;

use crate::middleware::CallerId;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/academic-years",
    params(("x-user-id" = String, Header, description = "Caller user ID")),
    request_body = CreateAcademicYearDto,
    responses(
        (status = 201, description = "Academic year created (inactive)", body = AcademicYear),
        (status = 409, description = "Academic year already exists", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn create_academic_year(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    ValidatedJson(dto): ValidatedJson<CreateAcademicYearDto>,
) -> Result<(StatusCode, Json<AcademicYear>), AppError> {
    let year = state
        .academic_years
        .create_academic_year(caller, dto)
        .await?;
    Ok((StatusCode::CREATED, Json(year)))
}

#[utoipa::path(
    get,
    path = "/api/academic-years",
    params(
        ("x-user-id" = String, Header, description = "Caller user ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Academic years of the caller's school", body = PaginatedAcademicYearsResponse)
    ),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn list_academic_years(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedAcademicYearsResponse>, AppError> {
    let years = state
        .academic_years
        .list_academic_years(caller, pagination)
        .await?;
    Ok(Json(years))
}

#[utoipa::path(
    get,
    path = "/api/academic-years/active",
    params(("x-user-id" = String, Header, description = "Caller user ID")),
    responses(
        (status = 200, description = "The active academic year", body = AcademicYear),
        (status = 404, description = "No active academic year", body = ErrorResponse)
    ),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn get_active_academic_year(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
) -> Result<Json<AcademicYear>, AppError> {
    let year = state.academic_years.get_active_academic_year(caller).await?;
    Ok(Json(year))
}

#[utoipa::path(
    post,
    path = "/api/academic-years/{id}/activate",
    params(
        ("x-user-id" = String, Header, description = "Caller user ID"),
        ("id" = String, Path, description = "Academic year ID")
    ),
    responses(
        (status = 200, description = "Academic year is now the active one", body = AcademicYear),
        (status = 404, description = "Academic year not found", body = ErrorResponse)
    ),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn activate_academic_year(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    Path(id): Path<AcademicYearId>,
) -> Result<Json<AcademicYear>, AppError> {
    let year = state
        .academic_years
        .activate_academic_year(caller, id)
        .await?;
    Ok(Json(year))
}
