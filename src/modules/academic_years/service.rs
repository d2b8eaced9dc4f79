use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use mamnon_core::{AppError, PaginationMeta, PaginationParams};
use mamnon_models::academic_years::{
    AcademicYear, CreateAcademicYearDto, NewAcademicYear, PaginatedAcademicYearsResponse,
};
use mamnon_models::ids::{AcademicYearId, UserId};
use tracing::{info, instrument};

use crate::modules::school_scope::school_of;
use crate::store::SchoolStore;

/// Academic-year lifecycle: create, list, read and switch the active year.
#[derive(Clone)]
pub struct AcademicYearService {
    store: Arc<dyn SchoolStore>,
}

impl fmt::Debug for AcademicYearService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcademicYearService").finish_non_exhaustive()
    }
}

impl AcademicYearService {
    pub fn new(store: Arc<dyn SchoolStore>) -> Self {
        Self { store }
    }

    /// New years start inactive and unconfigured.
    #[instrument(skip(self))]
    pub async fn create_academic_year(
        &self,
        caller: UserId,
        dto: CreateAcademicYearDto,
    ) -> Result<AcademicYear, AppError> {
        let school_id = school_of(&*self.store, caller).await?;
        let year = self
            .store
            .insert_academic_year(NewAcademicYear {
                school_id,
                from_year: dto.from_year,
                to_year: dto.to_year,
            })
            .await?;

        info!(academic_year_id = %year.id, label = %year.label(), "Academic year created");
        Ok(year)
    }

    #[instrument(skip(self))]
    pub async fn list_academic_years(
        &self,
        caller: UserId,
        pagination: PaginationParams,
    ) -> Result<PaginatedAcademicYearsResponse, AppError> {
        let school_id = school_of(&*self.store, caller).await?;
        let (data, total) = self
            .store
            .list_academic_years(school_id, &pagination)
            .await?;

        Ok(PaginatedAcademicYearsResponse {
            data,
            meta: PaginationMeta::new(&pagination, total),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_active_academic_year(&self, caller: UserId) -> Result<AcademicYear, AppError> {
        let school_id = school_of(&*self.store, caller).await?;
        self.store
            .find_active_year(school_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(anyhow!("No active academic year found for this school"))
            })
    }

    /// Makes `id` the only active year of the caller's school.
    #[instrument(skip(self))]
    pub async fn activate_academic_year(
        &self,
        caller: UserId,
        id: AcademicYearId,
    ) -> Result<AcademicYear, AppError> {
        let school_id = school_of(&*self.store, caller).await?;
        self.store
            .find_academic_year(school_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Academic year not found")))?;

        let year = self.store.activate_academic_year(school_id, id).await?;
        info!(academic_year_id = %year.id, label = %year.label(), "Academic year activated");
        Ok(year)
    }
}
