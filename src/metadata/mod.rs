pub mod handler;
pub mod models;
pub mod service;

#[cfg(test)]
mod tests;

pub use models::*;
