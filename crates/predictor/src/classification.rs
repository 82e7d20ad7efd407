use {
    crate::{
        checkpoint::{CheckpointLocation, CheckpointStatus},
        error::Result,
        network::Network,
        predictor::{Predictor, PredictorBase},
    },
    candle_nn::Module,
};

/// Whole-image class prediction over an optional list of class names.
/// `predict` and `predict_one` are not available yet and return
/// `NotImplemented`.
#[derive(Debug)]
pub struct ImageClassificationPredictor<M> {
    base: PredictorBase<M>,
    classes: Option<Vec<String>>,
}

impl<M: Module> ImageClassificationPredictor<M> {
    pub fn new(network: Network<M>, location: &CheckpointLocation) -> Result<Self> {
        Ok(Self {
            base: PredictorBase::new(network, location)?,
            classes: None,
        })
    }

    /// Class names, indexed by the network's output position.
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    pub fn classes(&self) -> Option<&[String]> {
        self.classes.as_deref()
    }

    pub fn checkpoint_status(&self) -> &CheckpointStatus {
        self.base.checkpoint_status()
    }

    pub fn network(&self) -> &Network<M> {
        self.base.network()
    }
}

impl<M: Module> Predictor for ImageClassificationPredictor<M> {
    fn name(&self) -> &'static str {
        "ImageClassificationPredictor"
    }
}
