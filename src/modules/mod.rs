pub mod academic_years;
pub mod classes;
pub mod school_scope;
