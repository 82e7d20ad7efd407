use {crate::error::Result, base::log, candle_core::Device};

/// Pick the execution device for a prediction call: CUDA ordinal 0 when
/// `use_gpu` is set and CUDA is usable, the CPU otherwise.
pub fn select_device(use_gpu: bool) -> Result<Device> {
    if !use_gpu {
        log::debug!("Prediction device: CPU");
        return Ok(Device::Cpu);
    }
    let device = Device::cuda_if_available(0)?;
    if device.is_cuda() {
        log::info!("Prediction device: CUDA (ordinal 0)");
    } else {
        log::warn!("Prediction device: GPU requested but CUDA is unavailable, using CPU");
    }
    Ok(device)
}
