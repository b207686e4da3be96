pub mod traits;
pub mod minio;
pub mod filesystem;

pub use traits::ObjectStore;
pub use minio::MinioStore;
pub use filesystem::FilesystemStore;
