pub mod error;
pub mod mdl;
