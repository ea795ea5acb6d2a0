use std::any::Any;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use pixwarp_image::{Image, ImageError, ImageSize, PixelDtype};
use pixwarp_linalg::Matrix;

use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::progress::ProgressReporter;
use crate::warp::OutputExtent;

/// Errors that can occur while resampling on the CPU.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    PoolBuild(String),

    /// The executor was handed a job for a different backend.
    #[error("job selects a different backend than this executor")]
    BackendMismatch,

    /// Error from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// A worker that died while rendering its column chunk.
///
/// Failed chunks leave their columns at the default pixel value; sibling
/// chunks are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    /// Index of the column chunk the worker owned.
    pub chunk: usize,
    /// The panic payload rendered to text.
    pub message: String,
}

/// Selects which resampling backend executes a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Multi-threaded CPU inverse mapping.
    Cpu {
        /// Number of worker threads.
        threads: usize,
    },
    /// Offscreen GPU fragment pipeline.
    Gpu,
}

/// Everything a resampling backend needs for one invocation.
///
/// Constructed once per run and immutable while rendering. The inverse
/// transform is carried as its four linear coefficients; the translation is
/// already folded into the offsets.
pub struct RenderJob<'a> {
    /// Source image.
    pub src: &'a Image<u8, 3>,
    /// Output canvas size.
    pub dst_size: ImageSize,
    /// Destination-to-source offset along x.
    pub x_offset: i64,
    /// Destination-to-source offset along y.
    pub y_offset: i64,
    /// Row-major linear part of the inverse transform.
    pub inverse: [f64; 4],
    /// The backend selected for this job.
    pub backend: Backend,
}

impl<'a> RenderJob<'a> {
    /// Assemble a job from a computed extent and the inverted forward
    /// transform (3x3 homogeneous).
    pub fn new(
        src: &'a Image<u8, 3>,
        extent: OutputExtent,
        inverse: &Matrix<f64>,
        backend: Backend,
    ) -> Self {
        Self {
            src,
            dst_size: extent.size,
            x_offset: extent.x_offset,
            y_offset: extent.y_offset,
            inverse: [
                inverse[(0, 0)],
                inverse[(0, 1)],
                inverse[(1, 0)],
                inverse[(1, 1)],
            ],
            backend,
        }
    }

    /// Map an output coordinate back into source space.
    pub fn map_to_source(&self, new_x: usize, new_y: usize) -> (f64, f64) {
        let px = (new_x as i64 + self.x_offset) as f64;
        let py = (new_y as i64 + self.y_offset) as f64;
        let x = px * self.inverse[0] + py * self.inverse[2];
        let y = px * self.inverse[1] + py * self.inverse[3];
        (x, y)
    }
}

/// Resample a job on the CPU across its configured number of threads.
///
/// The output width is statically partitioned into contiguous column chunks
/// of `ceil(new_width / threads)`; each worker owns one chunk and fills a
/// chunk-local buffer, so no two workers ever touch the same output column.
/// The buffers are scattered into the output image after all workers joined.
///
/// Output pixels whose inverse-mapped coordinate falls outside the source
/// stay at the default value, forming the background introduced by rotation.
///
/// Worker panics are contained per chunk and returned alongside the image;
/// the run itself keeps going so sibling columns stay intact.
///
/// # Returns
///
/// The resampled image and the failures of any workers that died.
pub fn render_cpu(
    job: &RenderJob<'_>,
    interpolation: InterpolationMode,
    progress: &dyn ProgressReporter,
) -> Result<(Image<u8, 3>, Vec<WorkerFailure>), RenderError> {
    let threads = match job.backend {
        Backend::Cpu { threads } => threads,
        Backend::Gpu => return Err(RenderError::BackendMismatch),
    };
    if threads == 0 {
        return Err(RenderError::InvalidThreadCount(threads));
    }

    let ImageSize {
        width: new_width,
        height: new_height,
    } = job.dst_size;

    let mut dst = Image::from_size_val(job.dst_size, 0u8)?;
    if new_width == 0 || new_height == 0 {
        return Ok((dst, Vec::new()));
    }

    let chunk_size = new_width.div_ceil(threads);
    let columns_done = AtomicUsize::new(0);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| RenderError::PoolBuild(e.to_string()))?;

    // one statically assigned chunk per worker, no stealing between chunks
    let chunks: Vec<Result<Vec<u8>, WorkerFailure>> = pool.install(|| {
        (0..threads)
            .into_par_iter()
            .map(|i| {
                let columns = chunk_columns(i, chunk_size, new_width);
                catch_unwind(AssertUnwindSafe(|| {
                    render_chunk(job, interpolation, columns, &columns_done, progress)
                }))
                .map_err(|payload| WorkerFailure {
                    chunk: i,
                    message: panic_message(payload),
                })
            })
            .collect()
    });

    let mut failures = Vec::new();
    for (i, chunk) in chunks.into_iter().enumerate() {
        let columns = chunk_columns(i, chunk_size, new_width);
        match chunk {
            Ok(buf) => scatter_chunk(&mut dst, &columns, &buf),
            Err(failure) => {
                log::error!(
                    "render worker for chunk {} failed: {}",
                    failure.chunk,
                    failure.message
                );
                failures.push(failure);
            }
        }
    }

    progress.report(1.0);

    Ok((dst, failures))
}

/// The columns owned by chunk `i`; trailing chunks may be short or empty.
fn chunk_columns(i: usize, chunk_size: usize, new_width: usize) -> Range<usize> {
    let start = (i * chunk_size).min(new_width);
    let end = ((i + 1) * chunk_size).min(new_width);
    start..end
}

fn render_chunk(
    job: &RenderJob<'_>,
    interpolation: InterpolationMode,
    columns: Range<usize>,
    columns_done: &AtomicUsize,
    progress: &dyn ProgressReporter,
) -> Vec<u8> {
    let (src_width, src_height) = (job.src.width() as f64, job.src.height() as f64);
    let new_width = job.dst_size.width;
    let new_height = job.dst_size.height;
    let chunk_width = columns.len();

    let mut buf = vec![0u8; chunk_width * new_height * 3];

    for (ci, new_x) in columns.enumerate() {
        for new_y in 0..new_height {
            let (x, y) = job.map_to_source(new_x, new_y);

            if x < 0.0 || x >= src_width || y < 0.0 || y >= src_height {
                continue;
            }

            let pixel = interpolate_pixel(job.src, x as f32, y as f32, interpolation);

            let base = (new_y * chunk_width + ci) * 3;
            for (k, value) in pixel.iter().enumerate() {
                buf[base + k] = u8::from_f32(*value);
            }
        }

        let done = columns_done.fetch_add(1, Ordering::Relaxed) + 1;
        progress.report(done as f64 / new_width as f64);
    }

    buf
}

/// Copy a chunk-local buffer into its column range of the output image.
fn scatter_chunk(dst: &mut Image<u8, 3>, columns: &Range<usize>, buf: &[u8]) {
    let chunk_width = columns.len();
    if chunk_width == 0 {
        return;
    }

    let new_width = dst.width();
    let rows = dst.height();
    let dst_slice = dst.as_slice_mut();
    for y in 0..rows {
        let src_base = y * chunk_width * 3;
        let dst_base = (y * new_width + columns.start) * 3;
        dst_slice[dst_base..dst_base + chunk_width * 3]
            .copy_from_slice(&buf[src_base..src_base + chunk_width * 3]);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::warp::{affine_matrix, output_extent, AffineParams};
    use pixwarp_linalg::LinalgError;

    fn gradient_image(width: usize, height: usize) -> Image<u8, 3> {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 7 % 256) as u8);
                data.push((y * 13 % 256) as u8);
                data.push(((x + y) * 3 % 256) as u8);
            }
        }
        Image::new(ImageSize { width, height }, data).expect("buffer matches size")
    }

    fn job_for<'a>(
        src: &'a Image<u8, 3>,
        params: &AffineParams,
        backend: Backend,
    ) -> Result<(RenderJob<'a>, Matrix<f64>), LinalgError> {
        let m = affine_matrix(params).expect("params are valid");
        let inverse = m.inverse()?;
        let extent = output_extent(&m, src.size());
        Ok((RenderJob::new(src, extent, &inverse, backend), m))
    }

    #[test]
    fn identity_render_copies_the_source() -> Result<(), RenderError> {
        let src = gradient_image(17, 11);
        let (job, _) = job_for(&src, &AffineParams::default(), Backend::Cpu { threads: 2 })
            .expect("identity is invertible");

        let (out, failures) = render_cpu(&job, InterpolationMode::Bilinear, &NoProgress)?;

        assert!(failures.is_empty());
        assert_eq!(out.size(), src.size());
        assert_eq!(out.as_slice(), src.as_slice());
        Ok(())
    }

    #[test]
    fn thread_count_does_not_change_the_output() -> Result<(), RenderError> {
        let src = gradient_image(33, 21);
        let params = AffineParams {
            angle: 33.0,
            scale: Some(1.4),
            ..Default::default()
        };

        let (job_one, _) =
            job_for(&src, &params, Backend::Cpu { threads: 1 }).expect("transform is invertible");
        let (job_four, _) =
            job_for(&src, &params, Backend::Cpu { threads: 4 }).expect("transform is invertible");

        let (out_one, _) = render_cpu(&job_one, InterpolationMode::Bilinear, &NoProgress)?;
        let (out_four, _) = render_cpu(&job_four, InterpolationMode::Bilinear, &NoProgress)?;

        assert_eq!(out_one.as_slice(), out_four.as_slice());
        Ok(())
    }

    #[test]
    fn more_threads_than_columns_is_fine() -> Result<(), RenderError> {
        let src = gradient_image(3, 5);
        let (job, _) = job_for(&src, &AffineParams::default(), Backend::Cpu { threads: 8 })
            .expect("identity is invertible");

        let (out, failures) = render_cpu(&job, InterpolationMode::Bilinear, &NoProgress)?;

        assert!(failures.is_empty());
        assert_eq!(out.as_slice(), src.as_slice());
        Ok(())
    }

    #[test]
    fn zero_threads_is_rejected() {
        let src = gradient_image(4, 4);
        let (job, _) = job_for(&src, &AffineParams::default(), Backend::Cpu { threads: 0 })
            .expect("identity is invertible");

        let res = render_cpu(&job, InterpolationMode::Bilinear, &NoProgress);

        assert!(matches!(res, Err(RenderError::InvalidThreadCount(0))));
    }

    #[test]
    fn gpu_job_is_rejected_by_the_cpu_executor() {
        let src = gradient_image(4, 4);
        let (job, _) =
            job_for(&src, &AffineParams::default(), Backend::Gpu).expect("identity is invertible");

        let res = render_cpu(&job, InterpolationMode::Bilinear, &NoProgress);

        assert!(matches!(res, Err(RenderError::BackendMismatch)));
    }

    #[test]
    fn rotation_fills_corners_with_background() -> Result<(), RenderError> {
        let src = Image::from_size_val(
            ImageSize {
                width: 10,
                height: 10,
            },
            255u8,
        )?;
        let params = AffineParams {
            angle: 45.0,
            ..Default::default()
        };
        let (job, _) =
            job_for(&src, &params, Backend::Cpu { threads: 2 }).expect("rotation is invertible");

        let (out, _) = render_cpu(&job, InterpolationMode::Bilinear, &NoProgress)?;

        // canvas corners lie outside the rotated source and stay at the default
        assert_eq!(out.get_pixel(0, 0)?, [0, 0, 0]);
        let w = out.width() - 1;
        let h = out.height() - 1;
        assert_eq!(out.get_pixel(w, 0)?, [0, 0, 0]);
        assert_eq!(out.get_pixel(0, h)?, [0, 0, 0]);
        assert_eq!(out.get_pixel(w, h)?, [0, 0, 0]);
        // while the canvas center is filled from the source
        assert_eq!(out.get_pixel(out.width() / 2, out.height() / 2)?, [255; 3]);
        Ok(())
    }

    #[test]
    fn empty_extent_renders_an_empty_image() -> Result<(), RenderError> {
        let src = gradient_image(4, 4);
        let job = RenderJob {
            src: &src,
            dst_size: ImageSize {
                width: 0,
                height: 0,
            },
            x_offset: 0,
            y_offset: 0,
            inverse: [1.0, 0.0, 0.0, 1.0],
            backend: Backend::Cpu { threads: 2 },
        };

        let (out, failures) = render_cpu(&job, InterpolationMode::Bilinear, &NoProgress)?;

        assert!(failures.is_empty());
        assert_eq!(out.as_slice().len(), 0);
        Ok(())
    }
}
