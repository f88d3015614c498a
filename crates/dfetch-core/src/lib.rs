pub mod config;
pub mod logging;

pub mod batch;
pub mod downloader;
pub mod progress;
pub mod resolver;
pub mod runner;
pub mod url_model;

#[cfg(test)]
pub(crate) mod test_support;
