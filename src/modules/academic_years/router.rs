use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    activate_academic_year, create_academic_year, get_active_academic_year, list_academic_years,
};

pub fn init_academic_years_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_academic_year).get(list_academic_years))
        .route("/active", get(get_active_academic_year))
        .route("/{id}/activate", post(activate_academic_year))
}
