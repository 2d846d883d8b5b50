pub mod credits;
pub mod outcomes;
