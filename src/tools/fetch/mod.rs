mod client;
mod fetcher;
mod headers;
mod tests;

pub mod types;

// Re-export types for public use
pub use fetcher::PageFetcher;
pub use types::*;
