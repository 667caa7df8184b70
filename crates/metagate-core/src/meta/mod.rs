pub mod document;
pub mod locate;
pub mod parse;
