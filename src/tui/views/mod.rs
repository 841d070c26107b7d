pub mod detail;
pub mod documents;
pub mod upload;
