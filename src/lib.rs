pub mod cli;
pub mod error;
pub mod ingest;
pub mod markup;
pub mod model;
pub mod report;
pub mod writer;
