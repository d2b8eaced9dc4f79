use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use mamnon_core::{ErrorKind, ErrorResponse, PaginationMeta, PaginationParams};
use mamnon_models::academic_years::{
    AcademicYear, AcademicYearSummary, CreateAcademicYearDto, PaginatedAcademicYearsResponse,
    YearStatus,
};
use mamnon_models::classes::{
    ClassView, CopyClassesDto, CopyClassesResponse, CreateClassDto, MessageResponse,
    PaginatedClassesResponse, UpdateClassDto,
};
use mamnon_models::grades::{AgeGroupsResponse, Grade, Sessions};
use mamnon_models::users::{UserRole, UserSummary};

use crate::middleware::caller::CALLER_HEADER;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::list_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::classes::controller::available_teachers,
        crate::modules::classes::controller::age_groups,
        crate::modules::classes::controller::copy_classes,
        crate::modules::academic_years::controller::create_academic_year,
        crate::modules::academic_years::controller::list_academic_years,
        crate::modules::academic_years::controller::get_active_academic_year,
        crate::modules::academic_years::controller::activate_academic_year,
    ),
    components(
        schemas(
            ClassView,
            CreateClassDto,
            UpdateClassDto,
            CopyClassesDto,
            CopyClassesResponse,
            PaginatedClassesResponse,
            MessageResponse,
            Grade,
            Sessions,
            AgeGroupsResponse,
            UserRole,
            UserSummary,
            AcademicYear,
            AcademicYearSummary,
            CreateAcademicYearDto,
            PaginatedAcademicYearsResponse,
            YearStatus,
            ErrorKind,
            ErrorResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Classes", description = "Class records and homeroom teacher assignment"),
        (name = "Academic Years", description = "Academic year lifecycle and activation")
    ),
    info(
        title = "Mamnon API",
        version = "0.1.0",
        description = "Kindergarten class management: classes, homeroom teachers and academic years.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "caller_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(CALLER_HEADER))),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_class_and_year_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/classes",
            "/api/classes/{id}",
            "/api/classes/available-teachers",
            "/api/classes/age-groups",
            "/api/classes/copy",
            "/api/academic-years",
            "/api/academic-years/active",
            "/api/academic-years/{id}/activate",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}
