// Application layer - use cases and orchestration.
// The CLI talks to LedgerService; LedgerService talks to a DataService.

pub mod data_service;
pub mod error;
pub mod service;

pub use data_service::*;
pub use error::*;
pub use service::*;
