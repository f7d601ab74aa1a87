pub mod commands;
pub mod routes;

pub use commands::{StoreFileCommand, StoreFileError, UploadResponse};

pub use routes::upload_routes;
