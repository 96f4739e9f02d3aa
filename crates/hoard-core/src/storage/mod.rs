//! Storage layer
//!
//! Backend adapters that persist encoded documents.
//!
//! ## Backends
//!
//! - **File**: one file per document, atomic writes (`FileBackend`)
//! - **Memory**: local-storage style map, no directory (`MemoryBackend`)

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;

pub use backend::{Backend, DocumentKey};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
