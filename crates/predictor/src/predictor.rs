use {
    crate::{
        checkpoint::{CheckpointLocation, CheckpointStatus, restore},
        error::{PredictError, Result},
        loader::Loader,
        network::Network,
        prediction::Prediction,
    },
    candle_core::Tensor,
    candle_nn::Module,
};

/// Uniform inference surface over a restored network.
///
/// Both operations default to [`PredictError::NotImplemented`]; a task
/// predictor overrides the ones it supports.
pub trait Predictor {
    fn name(&self) -> &'static str;

    /// Run the network over every batch of `loader`. `Ok(None)` when the
    /// loader has no batches.
    fn predict(&mut self, loader: &dyn Loader, use_gpu: bool) -> Result<Option<Prediction>> {
        let _ = (loader, use_gpu);
        Err(PredictError::NotImplemented {
            predictor: self.name(),
            operation: "predict",
        })
    }

    /// Run the network on a single input.
    fn predict_one(&mut self, input: &Tensor, use_gpu: bool) -> Result<Tensor> {
        let _ = (input, use_gpu);
        Err(PredictError::NotImplemented {
            predictor: self.name(),
            operation: "predict_one",
        })
    }
}

/// State shared by every task predictor: the owned network and how its
/// parameters were restored.
#[derive(Debug)]
pub struct PredictorBase<M> {
    network: Network<M>,
    checkpoint: CheckpointStatus,
}

impl<M: Module> PredictorBase<M> {
    /// Take ownership of `network` and restore it from `location` before
    /// anything can run on it.
    pub fn new(mut network: Network<M>, location: &CheckpointLocation) -> Result<Self> {
        let checkpoint = restore(&mut network, location)?;
        Ok(Self {
            network,
            checkpoint,
        })
    }

    pub fn network(&self) -> &Network<M> {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network<M> {
        &mut self.network
    }

    pub fn checkpoint_status(&self) -> &CheckpointStatus {
        &self.checkpoint
    }

    pub fn into_network(self) -> Network<M> {
        self.network
    }
}
