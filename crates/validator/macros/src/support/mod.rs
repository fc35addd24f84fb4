pub mod diag;
pub mod utils;
