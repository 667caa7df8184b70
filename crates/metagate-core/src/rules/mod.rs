pub mod catalog;
pub mod eval;
pub mod extensions;
pub mod finding;
