pub mod constants;
pub mod validation;
