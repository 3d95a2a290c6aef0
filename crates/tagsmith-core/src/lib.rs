pub mod config;
pub mod error;
pub mod io;
pub mod mutate;
pub mod paths;
pub mod prompt;
pub mod region;
pub mod response;
pub mod scanner;
pub mod tags;
pub mod tree;
pub mod types;

pub use error::{Result, TagsmithError};
