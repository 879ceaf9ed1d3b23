//! Pretrained image feature extractor.
//!
//! Fetches an ONNX classifier, reads the activations of its penultimate
//! output for a batch of frames and averages them into one
//! [`harec_models::FeatureVector`].

pub mod config;
pub mod error;
pub mod extractor;
pub mod loader;

pub use config::{ExtractorConfig, InputLayout, DEFAULT_MODEL_URL};
pub use error::{InferenceError, InferenceResult};
pub use extractor::{
    BackendLoader, FeatureBackend, FeatureExtractorService, OrtBackend, OrtLoader,
};
pub use loader::{ModelFetcher, ModelLocation};
