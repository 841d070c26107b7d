//! Navigation targets returned by workflows.
//!
//! Workflows never jump between views themselves; they hand back a
//! [`Route`] and the caller decides how to apply it.

use std::fmt;

use crate::core::api::DocumentId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Upload form (home).
    Upload,
    /// Paginated document list.
    Documents,
    /// Analysis view for one document.
    Document(DocumentId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Upload => "/".to_string(),
            Route::Documents => "/documents".to_string(),
            Route::Document(id) => format!("/documents/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Route::Upload.path(), "/");
        assert_eq!(Route::Documents.to_string(), "/documents");
        assert_eq!(
            Route::Document(DocumentId::new("65f1")).path(),
            "/documents/65f1"
        );
    }
}
