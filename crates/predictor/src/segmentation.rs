use {
    crate::{
        checkpoint::{CheckpointLocation, CheckpointStatus},
        error::Result,
        network::Network,
        predictor::{Predictor, PredictorBase},
    },
    candle_nn::Module,
};

/// Per-pixel class prediction. Restores its network like every predictor,
/// but neither `predict` nor `predict_one` is available yet: both return
/// `NotImplemented`.
#[derive(Debug)]
pub struct SemanticSegmentationPredictor<M> {
    base: PredictorBase<M>,
}

impl<M: Module> SemanticSegmentationPredictor<M> {
    pub fn new(network: Network<M>, location: &CheckpointLocation) -> Result<Self> {
        Ok(Self {
            base: PredictorBase::new(network, location)?,
        })
    }

    pub fn checkpoint_status(&self) -> &CheckpointStatus {
        self.base.checkpoint_status()
    }

    pub fn network(&self) -> &Network<M> {
        self.base.network()
    }
}

impl<M: Module> Predictor for SemanticSegmentationPredictor<M> {
    fn name(&self) -> &'static str {
        "SemanticSegmentationPredictor"
    }
}
