//! Simulation helpers: random group generation for benchmarks and demos.

pub mod generator;
