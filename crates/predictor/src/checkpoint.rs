use {
    crate::{
        error::{PredictError, Result},
        network::Network,
    },
    base::log,
    candle_core::{Device, Tensor},
    candle_nn::Module,
    safetensors::SafeTensors,
    std::{
        collections::HashMap,
        fs::{self, File},
        io::Read,
        path::{Path, PathBuf},
    },
};

pub const DEFAULT_CHECKPOINT_FILE_NAME: &str = "best_val_model.pt";

/// Entry holding the network's parameter state.
pub const MODEL_ENTRY: &str = "model";

// `torch.save` writes a zip archive.
const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Where a predictor looks for its checkpoint: `<dir>/<file_name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointLocation {
    dir: Option<PathBuf>,
    file_name: String,
}

impl CheckpointLocation {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            dir: (!dir.as_os_str().is_empty()).then_some(dir),
            file_name: DEFAULT_CHECKPOINT_FILE_NAME.to_string(),
        }
    }

    /// No checkpoint: the network keeps the parameters it was built with.
    pub fn none() -> Self {
        Self {
            dir: None,
            file_name: DEFAULT_CHECKPOINT_FILE_NAME.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(&self.file_name))
    }
}

impl Default for CheckpointLocation {
    fn default() -> Self {
        Self::none()
    }
}

/// Outcome of restoring a network from a [`CheckpointLocation`].
#[derive(Debug, Clone, PartialEq)]
pub enum CheckpointStatus {
    Loaded {
        path: PathBuf,
        parameters: usize,
        metadata: HashMap<String, String>,
    },
    /// No directory was given, or nothing exists at the path.
    Skipped { path: Option<PathBuf> },
}

impl CheckpointStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, CheckpointStatus::Loaded { .. })
    }
}

/// Named groups of tensors (`"model"`, `"optimizer"`, ...) plus free-form
/// string metadata.
///
/// On disk a checkpoint is either a safetensors file, where the tensor
/// `<entry>.<name>` belongs to `entry`, or a PyTorch pickle whose
/// `"model"` key holds the state dict. The format comes from the leading
/// bytes of the file, never from its name.
#[derive(Debug, Default)]
pub struct Checkpoint {
    entries: HashMap<String, HashMap<String, Tensor>>,
    metadata: HashMap<String, String>,
}

impl Checkpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut magic = [0u8; 4];
        // Files shorter than the magic go to the safetensors parser, which
        // reports them as malformed.
        let is_zip = File::open(path)?.read_exact(&mut magic).is_ok() && magic == ZIP_MAGIC;
        if is_zip {
            Self::read_pickle(path)
        } else {
            Self::read_safetensors(path)
        }
    }

    fn read_safetensors(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let (_, header) = SafeTensors::read_metadata(&data)?;
        let metadata = header.metadata().clone().unwrap_or_default();
        let mut checkpoint = Self {
            entries: HashMap::new(),
            metadata,
        };
        for (key, tensor) in candle_core::safetensors::load_buffer(&data, &Device::Cpu)? {
            let Some((entry, name)) = key.split_once('.') else {
                return Err(PredictError::Checkpoint(format!(
                    "tensor {key} in {} is not grouped under an entry",
                    path.display()
                )));
            };
            checkpoint
                .entries
                .entry(entry.to_string())
                .or_default()
                .insert(name.to_string(), tensor);
        }
        Ok(checkpoint)
    }

    /// Only the `"model"` state dict is read from a pickle; everything
    /// else in it is ignored.
    fn read_pickle(path: &Path) -> Result<Self> {
        let tensors = match candle_core::pickle::read_all_with_key(path, Some(MODEL_ENTRY)) {
            Ok(tensors) => tensors,
            Err(candle_core::Error::Msg(msg)) if msg == format!("key {MODEL_ENTRY} not found") => {
                return Err(missing_model_entry(path));
            }
            Err(e) => return Err(e.into()),
        };
        let mut checkpoint = Self::new();
        checkpoint.insert_entry(MODEL_ENTRY, tensors.into_iter().collect());
        Ok(checkpoint)
    }

    pub fn entry(&self, name: &str) -> Option<&HashMap<String, Tensor>> {
        self.entries.get(name)
    }

    pub fn insert_entry(&mut self, name: impl Into<String>, tensors: HashMap<String, Tensor>) {
        self.entries.insert(name.into(), tensors);
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Write as safetensors, whatever the path's extension. Each tensor
    /// keeps its own dtype.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut tensors = Vec::new();
        for (entry, group) in &self.entries {
            for (name, tensor) in group {
                tensors.push((format!("{entry}.{name}"), tensor.to_device(&Device::Cpu)?));
            }
        }
        let metadata = (!self.metadata.is_empty()).then(|| self.metadata.clone());
        safetensors::serialize_to_file(tensors, metadata, path.as_ref())?;
        Ok(())
    }
}

fn missing_model_entry(path: &Path) -> PredictError {
    PredictError::Checkpoint(format!(
        "{} has no \"{MODEL_ENTRY}\" entry",
        path.display()
    ))
}

/// Load the `"model"` entry of the checkpoint at `location` into `network`.
///
/// A missing directory or file leaves the network untouched and yields
/// [`CheckpointStatus::Skipped`]. Anything wrong with an existing file is
/// an error.
pub fn restore<M: Module>(
    network: &mut Network<M>,
    location: &CheckpointLocation,
) -> Result<CheckpointStatus> {
    let Some(path) = location.path() else {
        log::debug!("No checkpoint directory given, keeping current parameters");
        return Ok(CheckpointStatus::Skipped { path: None });
    };
    if !path.exists() {
        log::debug!("No checkpoint at {}, keeping current parameters", path.display());
        return Ok(CheckpointStatus::Skipped { path: Some(path) });
    }

    let checkpoint = Checkpoint::read(&path)?;
    let state = checkpoint
        .entry(MODEL_ENTRY)
        .ok_or_else(|| missing_model_entry(&path))?;
    network.load_state(state)?;
    log::info!("Restored {} parameters from {}", state.len(), path.display());

    Ok(CheckpointStatus::Loaded {
        parameters: state.len(),
        metadata: checkpoint.metadata().clone(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_default_file_name() {
        let location = CheckpointLocation::new("runs/exp1");
        assert_eq!(location.file_name(), "best_val_model.pt");
        assert_eq!(
            location.path(),
            Some(PathBuf::from("runs/exp1/best_val_model.pt"))
        );
    }

    #[test]
    fn test_location_empty_dir_is_none() {
        assert_eq!(CheckpointLocation::new("").path(), None);
        assert_eq!(CheckpointLocation::none().path(), None);
    }

    #[test]
    fn test_location_custom_file_name() {
        let location = CheckpointLocation::new("out").with_file_name("last.safetensors");
        assert_eq!(location.path(), Some(PathBuf::from("out/last.safetensors")));
    }

    #[test]
    fn test_write_then_read_keeps_entries_and_metadata() {
        let path = std::env::temp_dir().join(format!(
            "predictor-checkpoint-{}-entries.safetensors",
            std::process::id()
        ));
        let weight = Tensor::new(&[[1f32, 2.], [3., 4.]], &Device::Cpu).unwrap();
        let momentum = Tensor::new(&[0.5f32], &Device::Cpu).unwrap();

        let mut checkpoint = Checkpoint::new();
        checkpoint.insert_entry(MODEL_ENTRY, HashMap::from([("fc.weight".to_string(), weight)]));
        checkpoint.insert_entry("optimizer", HashMap::from([("m".to_string(), momentum)]));
        checkpoint.insert_metadata("epoch", "12");
        checkpoint.write(&path).unwrap();

        let read = Checkpoint::read(&path).unwrap();
        let model = read.entry(MODEL_ENTRY).unwrap();
        assert_eq!(
            model["fc.weight"].to_vec2::<f32>().unwrap(),
            vec![vec![1., 2.], vec![3., 4.]]
        );
        assert!(read.entry("optimizer").is_some());
        assert_eq!(read.metadata().get("epoch").map(String::as_str), Some("12"));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_keeps_f64_precision() {
        let path = std::env::temp_dir().join(format!(
            "predictor-checkpoint-{}-f64.safetensors",
            std::process::id()
        ));
        let values = [[0.1f64, 0.2, 0.3], [0.4, 0.5, 0.6]];
        let weight = Tensor::new(&values, &Device::Cpu).unwrap();

        let mut checkpoint = Checkpoint::new();
        checkpoint.insert_entry(MODEL_ENTRY, HashMap::from([("fc.weight".to_string(), weight)]));
        checkpoint.write(&path).unwrap();

        let read = Checkpoint::read(&path).unwrap();
        let weight = &read.entry(MODEL_ENTRY).unwrap()["fc.weight"];
        assert_eq!(weight.dtype(), candle_core::DType::F64);
        assert_eq!(
            weight.to_vec2::<f64>().unwrap(),
            values.iter().map(|row| row.to_vec()).collect::<Vec<_>>()
        );

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_format_comes_from_content_not_extension() {
        let path = std::env::temp_dir().join(format!(
            "predictor-checkpoint-{}-written.pt",
            std::process::id()
        ));
        let bias = Tensor::new(&[-1f32, 1.], &Device::Cpu).unwrap();

        let mut checkpoint = Checkpoint::new();
        checkpoint.insert_entry(MODEL_ENTRY, HashMap::from([("fc.bias".to_string(), bias)]));
        checkpoint.write(&path).unwrap();

        let read = Checkpoint::read(&path).unwrap();
        assert_eq!(
            read.entry(MODEL_ENTRY).unwrap()["fc.bias"].to_vec1::<f32>().unwrap(),
            vec![-1., 1.]
        );

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_short_file_is_checkpoint_error() {
        let path = std::env::temp_dir().join(format!(
            "predictor-checkpoint-{}-short.pt",
            std::process::id()
        ));
        fs::write(&path, b"PK").unwrap();

        assert!(matches!(Checkpoint::read(&path), Err(PredictError::Checkpoint(_))));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let result = Checkpoint::read("/nonexistent/checkpoint.safetensors");
        assert!(matches!(result, Err(PredictError::Io(_))));
    }
}
