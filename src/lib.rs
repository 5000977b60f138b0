// src/lib.rs

//! Getting started with a managed document database.
//!
//! The crate walks through the basic lifecycle of a document database
//! account: create a database and a partitioned container, insert two sample
//! "family" documents, query them back page by page, and delete everything.
//!
//! The walkthrough in [`demo`] is written against the [`DocumentClient`]
//! trait. `client::AccountClient` (feature `cosmos`) talks to a real account
//! through the `azure_data_cosmos` SDK; [`MemoryClient`] keeps everything in
//! process and is what the tests run against.

pub mod client;
pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
pub mod model;
pub mod types;

pub use client::{DocumentClient, FeedPager, MemoryClient};
pub use config::Config;
pub use demo::{launch, DemoOutcome, GetStartedDemo};
pub use error::{GSError, Result};
pub use model::Family;
