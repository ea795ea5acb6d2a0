use pixwarp_gpu::{warp_gpu_with_context, GpuContext};
use pixwarp_image::{Image, ImageSize};
use pixwarp_imgproc::interpolation::InterpolationMode;
use pixwarp_imgproc::progress::NoProgress;
use pixwarp_imgproc::render::{render_cpu, Backend, RenderJob};
use pixwarp_imgproc::warp::{affine_matrix, output_extent, AffineParams};

fn gradient_image(width: usize, height: usize) -> Image<u8, 3> {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width) as u8);
            data.push((y * 255 / height) as u8);
            data.push(((x + y) % 256) as u8);
        }
    }
    Image::new(ImageSize { width, height }, data).expect("buffer matches size")
}

/// Both backends evaluate the same inverse mapping and the same clamped
/// 4-neighbor blend; f32 uniforms and unorm narrowing leave a little room.
const CHANNEL_TOLERANCE: i16 = 2;

#[test]
#[ignore = "needs a GPU adapter at runtime"]
fn cpu_and_gpu_agree_within_tolerance() {
    let src = gradient_image(64, 48);

    let matrix = affine_matrix(&AffineParams {
        angle: 30.0,
        scale: Some(1.25),
        ..Default::default()
    })
    .expect("params are valid");
    let inverse = matrix.inverse().expect("transform is invertible");
    let extent = output_extent(&matrix, src.size());

    let cpu_job = RenderJob::new(&src, extent, &inverse, Backend::Cpu { threads: 4 });
    let (cpu_out, failures) =
        render_cpu(&cpu_job, InterpolationMode::Bilinear, &NoProgress).expect("render succeeds");
    assert!(failures.is_empty());

    let ctx = GpuContext::new().expect("adapter available");
    let gpu_job = RenderJob::new(&src, extent, &inverse, Backend::Gpu);
    let gpu_out = warp_gpu_with_context(&ctx, &gpu_job).expect("render succeeds");

    assert_eq!(gpu_out.size(), cpu_out.size());

    let mut worst = 0i16;
    for (&cpu, &gpu) in cpu_out.as_slice().iter().zip(gpu_out.as_slice()) {
        worst = worst.max((cpu as i16 - gpu as i16).abs());
    }
    assert!(
        worst <= CHANNEL_TOLERANCE,
        "per-channel difference {worst} exceeds {CHANNEL_TOLERANCE}"
    );
}
