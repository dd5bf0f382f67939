// Service exports
pub mod credentials;
pub mod http;
pub mod memory;
pub mod remote;

pub use credentials::{Credential, CredentialError, CredentialStore};
pub use http::HttpMatchingService;
pub use memory::{CapacityPolicy, Fault, MemoryMatchingService, Operation, RemoteCall};
pub use remote::{MatchingService, RemoteError};
