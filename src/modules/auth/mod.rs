pub mod extractors;
pub mod service;
