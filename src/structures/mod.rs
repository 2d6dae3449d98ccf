pub mod errors;
pub mod model;
