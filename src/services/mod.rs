pub mod identity;
pub mod report;
pub mod storage;

pub use identity::HttpIdentityProvider;
pub use report::ReportServiceClient;
pub use storage::SignedUrlFileStore;
