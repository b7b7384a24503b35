//! Principals: the authenticated actors uploads run on behalf of.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::paths;

/// The actor an upload or derivation is performed for.
///
/// Every principal is confined to a base path; all client-supplied paths are
/// resolved under it and may not escape it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub base_path: String,
}

impl Principal {
    pub fn new(name: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            base_path: base_path.into(),
        }
    }

    /// Resolve a client-supplied path against this principal's permitted root.
    ///
    /// The result is a normalized virtual path guaranteed to sit under
    /// `base_path`. Traversal outside it fails with `PermissionDenied`.
    pub fn resolve_path(&self, raw: &str) -> Result<String, AppError> {
        let base = paths::normalize(&self.base_path)
            .ok_or_else(|| AppError::PermissionDenied(self.base_path.clone()))?;

        let candidate = paths::join(&base, raw);
        let resolved = paths::normalize(&candidate)
            .ok_or_else(|| AppError::PermissionDenied(raw.to_string()))?;

        if base != "/" && resolved != base && !resolved.starts_with(&format!("{}/", base)) {
            return Err(AppError::PermissionDenied(raw.to_string()));
        }

        Ok(resolved)
    }
}
