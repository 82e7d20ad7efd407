use {
    crate::error::{PredictError, Result},
    base::log,
    candle_core::{DType, Device, Tensor, Var},
    candle_nn::{Module, VarBuilder, VarMap},
    std::{collections::HashMap, fmt},
};

type Build<M> = Box<dyn Fn(VarBuilder) -> candle_core::Result<M> + Send + Sync>;

/// A trainable model: a module plus the named parameters it was built from.
///
/// Parameters live in a `VarMap`, so restoring a state mutates them in
/// place and the module sees the new values without being rebuilt.
/// Moving to another device copies the parameters and rebuilds the module
/// from the copies.
pub struct Network<M> {
    varmap: VarMap,
    dtype: DType,
    device: Device,
    build: Build<M>,
    module: M,
}

impl<M: fmt::Debug> fmt::Debug for Network<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("dtype", &self.dtype)
            .field("device", &self.device)
            .field("parameters", &self.varmap.all_vars().len())
            .field("module", &self.module)
            .finish()
    }
}

impl<M: Module> Network<M> {
    /// Build the module against a fresh parameter store. Parameters get
    /// whatever initialisation the module's layers ask for.
    pub fn new<F>(device: &Device, dtype: DType, build: F) -> Result<Self>
    where
        F: Fn(VarBuilder) -> candle_core::Result<M> + Send + Sync + 'static,
    {
        let varmap = VarMap::new();
        let module = build(VarBuilder::from_varmap(&varmap, dtype, device))?;
        Ok(Self {
            varmap,
            dtype,
            device: device.clone(),
            build: Box::new(build),
            module,
        })
    }

    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        Ok(self.module.forward(input)?)
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Relocate every parameter to `device` and rebuild the module there.
    pub fn to_device(&mut self, device: &Device) -> Result<()> {
        if self.device.same_device(device) {
            return Ok(());
        }
        let moved = VarMap::new();
        {
            let source = self.varmap.data().lock().unwrap_or_else(|e| e.into_inner());
            let mut target = moved.data().lock().unwrap_or_else(|e| e.into_inner());
            for (name, var) in source.iter() {
                let tensor = var.as_tensor().to_device(device)?;
                target.insert(name.clone(), Var::from_tensor(&tensor)?);
            }
        }
        let module = (self.build)(VarBuilder::from_varmap(&moved, self.dtype, device))?;
        self.varmap = moved;
        self.module = module;
        self.device = device.clone();
        log::debug!("Network moved to {:?}", device);
        Ok(())
    }

    /// Snapshot of every parameter, keyed by name.
    pub fn state(&self) -> Result<HashMap<String, Tensor>> {
        let vars = self.varmap.data().lock().unwrap_or_else(|e| e.into_inner());
        let mut state = HashMap::with_capacity(vars.len());
        for (name, var) in vars.iter() {
            state.insert(name.clone(), var.as_tensor().copy()?);
        }
        Ok(state)
    }

    /// Overwrite the parameters with `state`.
    ///
    /// Strict: every parameter must be present with a matching shape and
    /// `state` may not carry names the network does not have. Tensors are
    /// cast to the network's dtype and device. Nothing is written unless
    /// the whole state matches.
    pub fn load_state(&mut self, state: &HashMap<String, Tensor>) -> Result<()> {
        let vars = self.varmap.data().lock().unwrap_or_else(|e| e.into_inner());

        let mut missing: Vec<&str> = vars
            .keys()
            .filter(|name| !state.contains_key(*name))
            .map(String::as_str)
            .collect();
        let mut unexpected: Vec<&str> = state
            .keys()
            .filter(|name| !vars.contains_key(*name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            missing.sort_unstable();
            unexpected.sort_unstable();
            return Err(PredictError::Checkpoint(format!(
                "state does not match network: missing {:?}, unexpected {:?}",
                missing, unexpected
            )));
        }

        let mut converted = Vec::with_capacity(vars.len());
        for (name, var) in vars.iter() {
            let tensor = &state[name];
            if tensor.dims() != var.dims() {
                return Err(PredictError::Checkpoint(format!(
                    "shape mismatch for {name}: network has {:?}, state has {:?}",
                    var.dims(),
                    tensor.dims()
                )));
            }
            converted.push((var, tensor.to_dtype(self.dtype)?.to_device(&self.device)?));
        }
        for (var, tensor) in converted {
            var.set(&tensor)?;
        }
        Ok(())
    }
}
