pub mod console;
pub mod dialog;
pub mod justification;
pub mod surface;
pub mod workflow;
