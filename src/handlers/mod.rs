pub mod reference;
pub mod source;
pub mod submission;
