pub mod broadcast;
pub mod classifier;
pub mod config;
pub mod counter;
pub mod error;
pub mod event;
pub mod history;
pub mod io;
pub mod message;
pub mod paths;
pub mod pipeline;
pub mod scenario;
pub mod selector;
pub mod template;
pub mod types;
pub mod writer;

pub use error::{DialecticError, Result};
