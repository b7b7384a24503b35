//! Domain models shared across Shelf components.

pub mod object;
pub mod principal;

pub use object::{HashAlg, HashInfo, ObjectMeta, UploadDescriptor};
pub use principal::Principal;
