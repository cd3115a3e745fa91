//! MongoDB store session backend for repolayer.
//!
//! This crate implements the `StoreSession` trait over the official
//! MongoDB async driver. Filters translate into native query documents,
//! the atomic `find_one_and_*` primitives map onto the driver's
//! find-and-modify operations, and unique-index violations surface as
//! `DuplicateKey`.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! repolayer = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! Sessions are built from a connection string through the builder; pool
//! management and credentials belong to the driver, not to this layer.
//!
//! # Example
//!
//! ```ignore
//! use repolayer::{mongodb::MongoSession, session::StoreSessionBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = MongoSession::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as repolayer_mongodb;

pub mod query;
pub mod store;

pub use store::{MongoSession, MongoSessionBuilder};
