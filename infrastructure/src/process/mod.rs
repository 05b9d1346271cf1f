//! Process execution adapter

pub mod runner;

pub use runner::TokioProcessRunner;
