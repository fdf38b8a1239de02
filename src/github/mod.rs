pub mod issues;
pub mod mock;
pub mod pagination;
pub mod transport;
