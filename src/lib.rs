pub mod error;
pub mod fetch;
pub mod fetcher;
pub mod metrics;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod scorer;
pub mod source;
