use std::path::PathBuf;

use argh::FromArgs;

use pixwarp::gpu::{warp_gpu, GpuError};
use pixwarp::imgproc::interpolation::InterpolationMode;
use pixwarp::imgproc::render::{render_cpu, Backend, RenderError, RenderJob};
use pixwarp::imgproc::warp::{affine_matrix, matrix_from_coeffs, output_extent, AffineParams};
use pixwarp::imgproc::WarpError;
use pixwarp::io::functional as F;
use pixwarp::io::IoError;
use pixwarp::linalg::LinalgError;

mod progress;

use progress::ProgressBar;

#[derive(FromArgs)]
/// Apply a 2D affine transform to a raster image.
struct Args {
    /// path to the input image
    #[argh(positional)]
    input: PathBuf,

    /// path to the output image
    #[argh(positional)]
    output: PathBuf,

    /// rotation angle in degrees
    #[argh(option, short = 'a', default = "0.0")]
    angle: f64,

    /// horizontal scale factor
    #[argh(option, default = "1.0")]
    hsc: f64,

    /// vertical scale factor
    #[argh(option, default = "1.0")]
    vsc: f64,

    /// uniform scale overriding both axis scales
    #[argh(option, short = 's')]
    scale: Option<f64>,

    /// horizontal skew angle in degrees
    #[argh(option, default = "0.0")]
    hsk: f64,

    /// vertical skew angle in degrees
    #[argh(option, default = "0.0")]
    vsk: f64,

    /// mirror the image horizontally
    #[argh(switch)]
    hf: bool,

    /// mirror the image vertically
    #[argh(switch)]
    vf: bool,

    /// literal 2x2 matrix "a1 a2 b1 b2" bypassing the other parameters
    #[argh(option, short = 'm')]
    matrix: Option<String>,

    /// rendering device: 1 = CPU, 2 = GPU
    #[argh(option, short = 'd', default = "1")]
    device: u32,

    /// number of CPU worker threads
    #[argh(option, short = 't', default = "4")]
    threads: usize,
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("unknown device id {0} (1 = CPU, 2 = GPU)")]
    UnknownDevice(u32),

    #[error("matrix coefficient {0:?} is not a number")]
    BadMatrixCoefficient(String),

    #[error(transparent)]
    Warp(#[from] WarpError),

    #[error(transparent)]
    Linalg(#[from] LinalgError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error(transparent)]
    Io(#[from] IoError),
}

fn parse_coeffs(raw: &str) -> Result<Vec<f64>, AppError> {
    raw.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| AppError::BadMatrixCoefficient(token.to_string()))
        })
        .collect()
}

fn backend_of(args: &Args) -> Result<Backend, AppError> {
    match args.device {
        1 => Ok(Backend::Cpu {
            threads: args.threads,
        }),
        2 => Ok(Backend::Gpu),
        other => Err(AppError::UnknownDevice(other)),
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let backend = backend_of(args)?;

    let input = F::read_image_auto(&args.input)?;
    log::info!("loaded {} ({})", args.input.display(), input.size());

    let matrix = match &args.matrix {
        Some(raw) => matrix_from_coeffs(&parse_coeffs(raw)?)?,
        None => affine_matrix(&AffineParams {
            angle: args.angle,
            horizontal_scale: args.hsc,
            vertical_scale: args.vsc,
            scale: args.scale,
            horizontal_skew: args.hsk,
            vertical_skew: args.vsk,
            horizontal_flip: args.hf,
            vertical_flip: args.vf,
        })?,
    };
    log::debug!("forward transform:\n{matrix}");

    let inverse = matrix.inverse()?;
    let extent = output_extent(&matrix, input.size());
    log::info!(
        "output canvas {} anchored at ({}, {})",
        extent.size,
        extent.x_offset,
        extent.y_offset
    );

    let job = RenderJob::new(&input, extent, &inverse, backend);

    let output = match backend {
        Backend::Cpu { .. } => {
            let (image, failures) = render_cpu(&job, InterpolationMode::Bilinear, &ProgressBar::default())?;
            println!();
            if !failures.is_empty() {
                log::warn!(
                    "{} of the render workers failed; their columns stay at the background color",
                    failures.len()
                );
            }
            image
        }
        Backend::Gpu => warp_gpu(&job)?,
    };

    F::write_image_auto(&args.output, &output)?;
    log::info!("saved {}", args.output.display());

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Args = argh::from_env();
    if let Err(error) = run(&args) {
        println!("{error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_device(device: u32) -> Args {
        Args {
            input: PathBuf::from("in.png"),
            output: PathBuf::from("out.png"),
            angle: 0.0,
            hsc: 1.0,
            vsc: 1.0,
            scale: None,
            hsk: 0.0,
            vsk: 0.0,
            hf: false,
            vf: false,
            matrix: None,
            device,
            threads: 4,
        }
    }

    #[test]
    fn device_ids_map_to_backends() {
        assert!(matches!(
            backend_of(&args_with_device(1)),
            Ok(Backend::Cpu { threads: 4 })
        ));
        assert!(matches!(backend_of(&args_with_device(2)), Ok(Backend::Gpu)));
        assert!(matches!(
            backend_of(&args_with_device(3)),
            Err(AppError::UnknownDevice(3))
        ));
    }

    #[test]
    fn coefficients_parse_as_whitespace_separated_numbers() {
        assert_eq!(
            parse_coeffs("0 -1 1 0").expect("all numeric"),
            vec![0.0, -1.0, 1.0, 0.0]
        );
        assert!(matches!(
            parse_coeffs("1 x 0 1"),
            Err(AppError::BadMatrixCoefficient(_))
        ));
    }
}
