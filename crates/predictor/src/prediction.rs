use {
    crate::{error::Result, loader::Target},
    candle_core::{DType, Tensor},
};

/// Targets gathered over a whole loader.
#[derive(Debug, Clone)]
pub enum Targets {
    /// Every batch target was a tensor; concatenated along dim 0.
    Tensor(Tensor),
    /// At least one batch target was a plain value list; every target is
    /// flattened into one list, in loader order.
    List(Vec<f32>),
}

impl Targets {
    pub fn collect(targets: Vec<Target>) -> Result<Self> {
        if targets.iter().all(|t| matches!(t, Target::Tensor(_))) {
            let tensors: Vec<Tensor> = targets
                .into_iter()
                .filter_map(|t| match t {
                    Target::Tensor(tensor) => Some(tensor),
                    Target::Scalars(_) => None,
                })
                .collect();
            return Ok(Targets::Tensor(Tensor::cat(&tensors, 0)?));
        }

        let mut values = Vec::new();
        for target in targets {
            match target {
                Target::Scalars(scalars) => values.extend(scalars),
                Target::Tensor(tensor) => {
                    values.extend(tensor.flatten_all()?.to_dtype(DType::F32)?.to_vec1::<f32>()?)
                }
            }
        }
        Ok(Targets::List(values))
    }

    pub fn len(&self) -> Result<usize> {
        match self {
            Targets::Tensor(tensor) => Ok(tensor.dim(0)?),
            Targets::List(values) => Ok(values.len()),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Output of a loader-wide prediction: model outputs on the CPU and the
/// matching targets, both in loader order.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub predictions: Tensor,
    pub targets: Targets,
}
