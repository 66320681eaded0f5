pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod explorer;
pub mod paginate;
pub mod report;
pub mod schema;
pub mod search;
pub mod sheets;

#[cfg(test)]
mod tests;
