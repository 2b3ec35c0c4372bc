//! The connector: verb shortcuts, the generic execution path, option
//! merging, and response normalization.
//!
//! # Example
//!
//! ```rust,no_run
//! use rest_connector::{CallOptions, Connector, ConnectorConfig, Reply};
//!
//! # async fn example() -> rest_connector::Result<()> {
//! let connector = Connector::new(ConnectorConfig::new("https://api.example.com"))?;
//!
//! let reply = connector.get(CallOptions::new().path("/status")).await?;
//! if let Reply::Buffered(response) = reply {
//!     println!("{}", response.status);
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod headers;
pub(crate) mod options;
mod request;
mod response;

#[cfg(test)]
mod tests;

pub use builder::Connector;
pub use options::{CallOptions, RequestBody};
pub use response::{HttpResponse, Reply, ResponseBody, StreamHandle};
