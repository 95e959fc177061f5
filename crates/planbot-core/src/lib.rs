//! # Planbot Core
//!
//! Shared foundation for the Planbot workspace: configuration, the error
//! taxonomy, and the trait seams between the scheduling core and its
//! external collaborators (submission automation, evidence storage,
//! notification delivery, plan generation).

pub mod config;
pub mod error;
pub mod traits;

pub use config::PlanbotConfig;
pub use error::{PlanbotError, Result};
