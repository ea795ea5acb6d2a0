use crate::error::GpuError;

/// An acquired GPU device and its submission queue.
///
/// Dropping the context releases the device; every pipeline object created
/// from it is scope-owned and freed on drop as well, including on early
/// failure paths.
pub struct GpuContext {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquire a device on the highest-performance available adapter.
    ///
    /// # Errors
    ///
    /// `AdapterNotFound` when no adapter is exposed (e.g. headless machines
    /// without a software rasterizer), `RequestDevice` when the adapter
    /// refuses the default feature set.
    pub fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .ok_or(GpuError::AdapterNotFound)?;

        let info = adapter.get_info();
        log::debug!("rendering on {} ({})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("pixwarp_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .map_err(|e| GpuError::RequestDevice(e.to_string()))?;

        Ok(Self { device, queue })
    }
}
