pub mod availability;
pub mod controller;
pub mod error;
pub mod router;
pub mod service;

pub use error::ClassError;
pub use router::init_classes_router;
pub use service::ClassService;
