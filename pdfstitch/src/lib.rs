//! pdfstitch - Collect PDF files, put them in order, merge them into one.
//!
//! The library is the headless core of a PDF merge tool. A UI (the bundled
//! CLI, or anything else) hands it raw file inputs and renders the state it
//! publishes. It provides:
//!
//! - An ordered collection of pending documents with add, remove, reorder
//!   and clear operations
//! - Drag-and-drop gesture bookkeeping
//! - A single-flight merge that exports one downloadable artifact
//! - A lopdf-backed merge engine behind a replaceable trait
//! - Artifact sinks for memory and the filesystem
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::config::Config;
//! use pdfstitch::controller::Controller;
//! use pdfstitch::engine::LopdfEngine;
//! use pdfstitch::io::{FileSink, InputLoader};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let controller = Controller::new(LopdfEngine::from_config(&config), FileSink::from_config(&config));
//!
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let inputs = InputLoader::new()
//!     .load_all(&paths, config.effective_jobs())
//!     .await
//!     .into_iter()
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! controller.add(inputs)?;
//! let receipt = controller.merge_and_export().await?;
//! println!("Saved {}", receipt.location);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod io;
pub mod output;
pub mod sink;

pub use config::Config;
pub use controller::Controller;
pub use error::{Result, StitchError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
