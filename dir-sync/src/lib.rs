pub mod config;
pub mod credentials;
pub mod error;
pub mod google;
pub mod normalize;
pub mod pages;
pub mod service;

pub use config::{DirectorySettings, GSuiteConfig, SyncConfig};
pub use credentials::ServiceAccountKey;
pub use error::{DirSyncError, DirSyncResult};
pub use google::{DirectoryClient, GoogleDirectoryClient};
pub use service::DirectorySnapshotService;
