//! nudge-client - HTTP classifier client for the nudge classification endpoint.
//!
//! [`HttpClassifier`] implements [`nudge_core::Classifier`] by posting to
//! `POST /api/check-notification`, either once per batch or once per
//! condition (legacy form).
//!
//! # Example
//!
//! ```ignore
//! use nudge_client::{ClassifierClientConfig, HttpClassifier};
//!
//! let classifier = HttpClassifier::new(ClassifierClientConfig::from_env())?;
//! let (engine, _task) = NotificationEngine::spawn(EngineConfig::default(), Arc::new(classifier))?;
//! ```

mod client;
mod config;

pub use client::HttpClassifier;
pub use config::{ClassifierClientConfig, ClassifierMode};
