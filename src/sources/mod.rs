//! Content fetcher implementations.

mod content_fetcher;

#[cfg(feature = "github")]
mod github;

pub use content_fetcher::ContentFetcher;

#[cfg(feature = "github")]
pub use github::{GithubFetcher, GithubFetcherBuilder};
