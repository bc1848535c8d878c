pub mod client;

pub use client::{FoundryClient, FoundryClientBuilder};
