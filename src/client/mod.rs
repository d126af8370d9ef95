//! The request client.
//!
//! [`Client`] is the public face of the pipeline: it owns the immutable
//! instance defaults, the two interceptor registries, and the transport
//! adapter. Each call merges defaults with the call-site config, snapshots
//! the registries, and walks the interceptor chain around a single
//! dispatch:
//!
//! ```text
//! reqN .. req1 -> dispatch -> resp1 .. respN
//! ```
//!
//! Request interceptors run in reverse registration order, response
//! interceptors in registration order; both orderings are part of the
//! contract.
//!
//! # Example
//!
//! ```rust,no_run
//! use courier::client::Client;
//!
//! # async fn example() -> courier::error::Result<()> {
//! let client = Client::new().expect("transport initializes");
//! let response = client.get("https://api.example.com/users", None).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

mod builder;
mod dispatch;
mod request;

#[cfg(test)]
mod tests;

pub use builder::{Client, ClientBuilder, Interceptors};
pub use request::all;
