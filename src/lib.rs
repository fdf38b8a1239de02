pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod github;
pub mod logging;
pub mod output;
pub mod repository;
pub mod run;
pub mod transform;

pub use error::{ExportError, FetchCause};
pub use repository::RepositoryRef;
