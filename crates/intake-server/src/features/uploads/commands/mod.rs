pub mod store;

pub use store::{StoreFileCommand, StoreFileError, UploadResponse};
