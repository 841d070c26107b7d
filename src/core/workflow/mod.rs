//! Client-side state machines for the upload, list and detail tasks.
//!
//! Each workflow owns its view-state exclusively and reports navigation as
//! a returned [`Route`] rather than performing it.

pub mod detail;
pub mod list;
pub mod navigation;
pub mod upload;

pub use detail::{Confirmation, DetailState, DetailWorkflow};
pub use list::{ListState, ListWorkflow, PageTicket};
pub use navigation::Route;
pub use upload::{UploadPolicy, UploadState, UploadWorkflow};
