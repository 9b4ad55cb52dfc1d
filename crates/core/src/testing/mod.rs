//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the bundling traits,
//! allowing the task lifecycle to be tested without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use linkpack_core::testing::{MockBundler, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.set_response("http://example.com/a.pdf", b"%PDF".to_vec()).await;
//!
//! let bundler = MockBundler::new();
//! bundler.set_delay(Duration::from_millis(100)).await;
//! // ... drive a TaskManager built with Arc::new(bundler.clone())
//! assert_eq!(bundler.invocation_count().await, 1);
//! ```

mod mock_bundler;
mod mock_fetcher;

pub use mock_bundler::{MockBundler, RecordedBundle};
pub use mock_fetcher::MockFetcher;
