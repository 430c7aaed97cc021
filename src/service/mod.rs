//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate the flag store, transcoder and object store.

mod gallery;
mod upload;

pub use gallery::{GalleryService, SignedEntry, SignedPage};
pub use upload::{IncomingPhoto, StoredPhoto, UploadService};
