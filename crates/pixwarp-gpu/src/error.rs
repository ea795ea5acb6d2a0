/// An error type for the GPU resampling backend.
#[derive(thiserror::Error, Debug)]
pub enum GpuError {
    /// No compatible graphics adapter was found.
    #[error("no compatible graphics adapter found")]
    AdapterNotFound,

    /// The adapter refused to hand out a device.
    #[error("failed to acquire a device: {0}")]
    RequestDevice(String),

    /// The shader did not compile or validate.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// Reading the rendered image back from the device failed.
    #[error("failed to read back the rendered image: {0}")]
    Readback(String),

    /// The executor was handed a job for a different backend.
    #[error("job selects a different backend than this executor")]
    BackendMismatch,

    /// Error from the image container.
    #[error(transparent)]
    Image(#[from] pixwarp_image::ImageError),
}
