pub mod checkpoint;
pub mod classification;
pub mod device;
pub mod error;
pub mod loader;
pub mod network;
pub mod prediction;
pub mod predictor;
pub mod progress;
pub mod regression;
pub mod segmentation;

pub use checkpoint::{
    Checkpoint, CheckpointLocation, CheckpointStatus, DEFAULT_CHECKPOINT_FILE_NAME, MODEL_ENTRY,
};
pub use classification::ImageClassificationPredictor;
pub use error::{PredictError, Result};
pub use loader::{Batch, Loader, Target, TensorLoader};
pub use network::Network;
pub use prediction::{Prediction, Targets};
pub use predictor::{Predictor, PredictorBase};
pub use regression::ImageRegressionPredictor;
pub use segmentation::SemanticSegmentationPredictor;
