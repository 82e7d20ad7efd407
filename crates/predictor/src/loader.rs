use {
    crate::error::{PredictError, Result},
    candle_core::Tensor,
};

/// Ground truth for one batch.
#[derive(Debug, Clone)]
pub enum Target {
    Tensor(Tensor),
    /// Plain per-sample values, e.g. regression labels read from a CSV.
    Scalars(Vec<f32>),
}

impl Target {
    /// Number of samples described by this target.
    pub fn len(&self) -> Result<usize> {
        match self {
            Target::Tensor(tensor) if tensor.rank() == 0 => Ok(1),
            Target::Tensor(tensor) => Ok(tensor.dim(0)?),
            Target::Scalars(values) => Ok(values.len()),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl From<Tensor> for Target {
    fn from(tensor: Tensor) -> Self {
        Target::Tensor(tensor)
    }
}

impl From<Vec<f32>> for Target {
    fn from(values: Vec<f32>) -> Self {
        Target::Scalars(values)
    }
}

#[derive(Debug, Clone)]
pub struct Batch {
    pub input: Tensor,
    pub target: Target,
}

impl Batch {
    pub fn new(input: Tensor, target: impl Into<Target>) -> Self {
        Self {
            input,
            target: target.into(),
        }
    }
}

/// An ordered, finite source of batches with a known length.
pub trait Loader {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch>> + '_>;
}

impl Loader for [Batch] {
    fn len(&self) -> usize {
        <[Batch]>::len(self)
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch>> + '_> {
        Box::new(self.iter().cloned().map(Ok))
    }
}

impl Loader for Vec<Batch> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch>> + '_> {
        self.as_slice().batches()
    }
}

/// Slices a full input tensor and its targets into consecutive batches
/// along dim 0, keeping sample order. The last batch may be short.
#[derive(Debug, Clone)]
pub struct TensorLoader {
    inputs: Tensor,
    targets: Target,
    samples: usize,
    batch_size: usize,
}

impl TensorLoader {
    pub fn new(inputs: Tensor, targets: impl Into<Target>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(PredictError::Loader("batch size must be positive".to_string()));
        }
        let targets = targets.into();
        let samples = inputs.dim(0)?;
        let target_samples = targets.len()?;
        if samples != target_samples {
            return Err(PredictError::Loader(format!(
                "{samples} inputs but {target_samples} targets"
            )));
        }
        Ok(Self {
            inputs,
            targets,
            samples,
            batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn batch(&self, index: usize) -> Result<Batch> {
        let start = index * self.batch_size;
        let count = self.batch_size.min(self.samples - start);
        let input = self.inputs.narrow(0, start, count)?;
        let target = match &self.targets {
            Target::Tensor(tensor) => Target::Tensor(tensor.narrow(0, start, count)?),
            Target::Scalars(values) => Target::Scalars(values[start..start + count].to_vec()),
        };
        Ok(Batch { input, target })
    }
}

impl Loader for TensorLoader {
    fn len(&self) -> usize {
        self.samples.div_ceil(self.batch_size)
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch>> + '_> {
        Box::new((0..self.len()).map(|index| self.batch(index)))
    }
}
