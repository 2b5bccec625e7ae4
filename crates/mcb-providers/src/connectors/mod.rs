//! Source connectors (§2 "Connector", §4.1): one [`Connector`]
//! implementation per [`mcb_domain::entities::SourceType`], selected by
//! the orchestrator's clone stage at runtime (§4.1). There is no S3
//! connector — remote source repositories beyond git/upload/filesystem
//! are specified only by the `Connector` fetch contract.

mod filesystem;
mod git;
mod upload;

pub use filesystem::FilesystemConnector;
pub use git::GitConnector;
pub use upload::UploadConnector;
