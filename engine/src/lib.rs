pub mod brand;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod normalize;
pub mod probes;
pub mod routes;
pub mod scoring;
pub mod types;
pub mod verdict;
