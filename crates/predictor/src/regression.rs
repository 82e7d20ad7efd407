use {
    crate::{
        checkpoint::{CheckpointLocation, CheckpointStatus},
        device::select_device,
        error::Result,
        loader::{Batch, Loader},
        network::Network,
        prediction::{Prediction, Targets},
        predictor::{Predictor, PredictorBase},
        progress::Progress,
    },
    base::log,
    candle_core::Device,
    candle_nn::Module,
};

/// Continuous-valued prediction from images. Supports loader-wide
/// `predict`; `predict_one` is not available yet.
#[derive(Debug)]
pub struct ImageRegressionPredictor<M> {
    base: PredictorBase<M>,
}

impl<M: Module> ImageRegressionPredictor<M> {
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

impl<M: Module> Predictor for ImageRegressionPredictor<M> {
    fn name(&self) -> &'static str {
        "ImageRegressionPredictor"
    }

    fn predict(&mut self, loader: &dyn Loader, use_gpu: bool) -> Result<Option<Prediction>> {
        if loader.is_empty() {
            log::warn!("Loader is empty");
            return Ok(None);
        }

        let device = select_device(use_gpu)?;
        self.base.network_mut().to_device(&device)?;
        let network = self.base.network();

        let mut progress = Progress::new("Prediction", loader.len());
        let mut outputs = Vec::with_capacity(loader.len());
        let mut targets = Vec::with_capacity(loader.len());
        for batch in loader.batches() {
            let Batch { input, target } = batch?;
            let input = if use_gpu {
                input.to_device(&device)?
            } else {
                input
            };
            // Detached so no gradient graph outlives the call.
            let output = network.forward(&input)?.detach().to_device(&Device::Cpu)?;
            outputs.push(output);
            targets.push(target);
            progress.advance();
        }

        Ok(Some(Prediction {
            predictions: candle_core::Tensor::cat(&outputs, 0)?,
            targets: Targets::collect(targets)?,
        }))
    }
}
