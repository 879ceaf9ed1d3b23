//! Penultimate-layer feature extraction.
//!
//! The pretrained classifier is loaded once per process and shared. A failed
//! load leaves the cache empty, so the next call tries again.

use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use harec_models::{FeatureVector, FrameBatch, FRAME_CHANNELS};

use crate::config::{ExtractorConfig, InputLayout};
use crate::error::{InferenceError, InferenceResult};
use crate::loader::ModelFetcher;

/// Runs a batch of frames through the truncated network.
pub trait FeatureBackend: Send + Sync {
    /// One flattened activation row per frame, in batch order.
    fn forward(&self, batch: &FrameBatch) -> InferenceResult<Vec<Vec<f32>>>;
}

/// Produces the backend on first use.
#[async_trait]
pub trait BackendLoader: Send + Sync {
    async fn load(&self) -> InferenceResult<Arc<dyn FeatureBackend>>;
}

/// ONNX Runtime session reading one named output.
pub struct OrtBackend {
    session: Mutex<Session>,
    output_name: String,
    layout: InputLayout,
}

impl OrtBackend {
    pub fn from_bytes(
        model_bytes: &[u8],
        feature_output: Option<&str>,
        layout: InputLayout,
    ) -> InferenceResult<Self> {
        let session = Session::builder()
            .map_err(|e| InferenceError::model_load(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::model_load(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes)
            .map_err(|e| InferenceError::model_load(format!("ORT load model: {e}")))?;

        let declared: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let output_name = resolve_output_name(&declared, feature_output)?;

        info!(
            output = %output_name,
            declared_outputs = declared.len(),
            layout = %layout,
            "Built feature extractor session"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            layout,
        })
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

impl FeatureBackend for OrtBackend {
    fn forward(&self, batch: &FrameBatch) -> InferenceResult<Vec<Vec<f32>>> {
        let (shape, data) = batch_tensor(batch, self.layout);
        let input: Value = Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| InferenceError::feature_extraction(format!("ORT tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::feature_extraction("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| InferenceError::feature_extraction(format!("ORT run failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            InferenceError::feature_extraction(format!("Missing {} tensor", self.output_name))
        })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::feature_extraction(format!("ORT extract: {e}")))?;

        split_rows(&shape.to_vec(), data, batch.len())
    }
}

/// Pick the output that holds penultimate-layer activations.
///
/// A configured name must exist. Otherwise the second-to-last declared
/// output is used; a single-output graph is taken as a headless export.
pub fn resolve_output_name(
    declared: &[String],
    configured: Option<&str>,
) -> InferenceResult<String> {
    if let Some(name) = configured {
        return declared
            .iter()
            .find(|d| d.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                InferenceError::model_load(format!(
                    "Configured feature output '{}' not in model outputs {:?}",
                    name, declared
                ))
            });
    }

    match declared {
        [] => Err(InferenceError::model_load("Model declares no outputs")),
        [only] => {
            warn!(
                output = %only,
                "Model declares a single output; using it as the feature layer"
            );
            Ok(only.clone())
        }
        [.., penultimate, _] => Ok(penultimate.clone()),
    }
}

/// Flatten a batch into one input tensor.
///
/// Frames are stored HWC, so NHWC is a plain concatenation and NCHW is a
/// per-frame transpose.
pub fn batch_tensor(batch: &FrameBatch, layout: InputLayout) -> (Vec<usize>, Vec<f32>) {
    let (width, height) = batch.dimensions();
    let (w, h, c) = (width as usize, height as usize, FRAME_CHANNELS);
    let n = batch.len();
    let mut data = Vec::with_capacity(n * h * w * c);

    match layout {
        InputLayout::Nhwc => {
            for frame in batch.frames() {
                data.extend_from_slice(frame.pixels());
            }
            (vec![n, h, w, c], data)
        }
        InputLayout::Nchw => {
            for frame in batch.frames() {
                let pixels = frame.pixels();
                // HWC -> CHW
                for ch in 0..c {
                    for y in 0..h {
                        for x in 0..w {
                            data.push(pixels[(y * w + x) * c + ch]);
                        }
                    }
                }
            }
            (vec![n, c, h, w], data)
        }
    }
}

/// Split a `[N, ...]` output into N flattened rows.
pub fn split_rows(
    shape: &[i64],
    data: &[f32],
    batch_len: usize,
) -> InferenceResult<Vec<Vec<f32>>> {
    if shape.first().copied() != Some(batch_len as i64) {
        return Err(InferenceError::feature_extraction(format!(
            "Output shape {:?} does not start with batch size {}",
            shape, batch_len
        )));
    }

    let row_len = shape[1..].iter().product::<i64>();
    if row_len <= 0 {
        return Err(InferenceError::feature_extraction(format!(
            "Output shape {:?} has no feature units",
            shape
        )));
    }
    let row_len = row_len as usize;

    if data.len() != row_len * batch_len {
        return Err(InferenceError::feature_extraction(format!(
            "Output holds {} values, expected {}",
            data.len(),
            row_len * batch_len
        )));
    }

    Ok(data.chunks(row_len).map(<[f32]>::to_vec).collect())
}

/// Fetches the configured model and builds an [`OrtBackend`].
pub struct OrtLoader {
    config: ExtractorConfig,
}

impl OrtLoader {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BackendLoader for OrtLoader {
    async fn load(&self) -> InferenceResult<Arc<dyn FeatureBackend>> {
        let fetcher = ModelFetcher::new(&self.config).map_err(InferenceError::into_model_load)?;
        let bytes = fetcher.fetch(&self.config.model_url).await?;

        let feature_output = self.config.feature_output.clone();
        let layout = self.config.input_layout;
        let backend = tokio::task::spawn_blocking(move || {
            OrtBackend::from_bytes(&bytes, feature_output.as_deref(), layout)
        })
        .await
        .map_err(|e| InferenceError::model_load(format!("Session build task failed: {e}")))??;

        Ok(Arc::new(backend))
    }
}

/// Process-wide feature extractor with a lazily loaded, never invalidated
/// model.
pub struct FeatureExtractorService {
    loader: Box<dyn BackendLoader>,
    backend: OnceCell<Arc<dyn FeatureBackend>>,
    feature_len: OnceLock<usize>,
}

impl FeatureExtractorService {
    /// Service backed by ONNX Runtime.
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_loader(OrtLoader::new(config))
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(ExtractorConfig::from_env())
    }

    pub fn with_loader(loader: impl BackendLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            backend: OnceCell::new(),
            feature_len: OnceLock::new(),
        }
    }

    /// Load the model now instead of on the first extraction.
    pub async fn init(&self) -> InferenceResult<()> {
        self.backend().await.map(|_| ())
    }

    pub fn is_ready(&self) -> bool {
        self.backend.initialized()
    }

    /// Length of the vectors produced so far, once known.
    pub fn feature_len(&self) -> Option<usize> {
        self.feature_len.get().copied()
    }

    async fn backend(&self) -> InferenceResult<Arc<dyn FeatureBackend>> {
        self.backend
            .get_or_try_init(|| async {
                info!("Loading feature extractor model");
                let backend = self.loader.load().await.map_err(InferenceError::into_model_load);
                if let Err(e) = &backend {
                    warn!(error = %e, "Feature extractor model load failed");
                }
                backend
            })
            .await
            .cloned()
    }

    /// Run the batch in one forward pass and average the per-frame rows.
    pub async fn extract(&self, batch: FrameBatch) -> InferenceResult<FeatureVector> {
        let backend = self.backend().await?;
        let frames = batch.len();

        let rows = tokio::task::spawn_blocking(move || backend.forward(&batch))
            .await
            .map_err(|e| {
                InferenceError::feature_extraction(format!("Inference task failed: {e}"))
            })??;

        if rows.len() != frames {
            return Err(InferenceError::feature_extraction(format!(
                "Backend returned {} rows for {} frames",
                rows.len(),
                frames
            )));
        }

        let features = FeatureVector::mean_of(&rows)
            .map_err(|e| InferenceError::feature_extraction(e.to_string()))?;

        let expected = *self.feature_len.get_or_init(|| features.len());
        if features.len() != expected {
            return Err(InferenceError::feature_extraction(format!(
                "Feature length changed from {} to {}",
                expected,
                features.len()
            )));
        }

        debug!(frames, feature_len = features.len(), "Extracted features");
        Ok(features)
    }
}
