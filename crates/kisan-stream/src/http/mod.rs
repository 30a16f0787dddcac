mod client;

pub use client::{HttpAgentClient, HttpAgentClientBuilder};
