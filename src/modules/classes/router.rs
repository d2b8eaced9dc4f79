use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    age_groups, available_teachers, copy_classes, create_class, delete_class, get_class,
    list_classes, update_class,
};

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_class).get(list_classes))
        .route("/available-teachers", get(available_teachers))
        .route("/age-groups", get(age_groups))
        .route("/copy", post(copy_classes))
        .route(
            "/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
}
