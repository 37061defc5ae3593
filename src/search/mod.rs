pub mod handler;
pub mod models;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use models::*;
