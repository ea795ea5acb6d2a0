/// Fullscreen-quad warp shader.
///
/// The fragment stage floors its position to recover the integer output
/// coordinate, adds the canvas offsets, applies the inverse linear part
/// (`inv = (a, b, c, d)`, row-vector convention) and blends the four
/// clamped neighbors manually. Texels are fetched with `textureLoad` at
/// integer coordinates so the blend matches the CPU kernel instead of the
/// sampler's filtering.
pub(crate) const WARP_SHADER: &str = r#"
struct WarpParams {
    src_size: vec2<f32>,
    offset: vec2<f32>,
    inv: vec4<f32>,
};

@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var<uniform> params: WarpParams;

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 0.0, 1.0);
}

@fragment
fn fs_main(@builtin(position) frag_coord: vec4<f32>) -> @location(0) vec4<f32> {
    let dst = floor(frag_coord.xy) + params.offset;

    let x = dst.x * params.inv.x + dst.y * params.inv.z;
    let y = dst.x * params.inv.y + dst.y * params.inv.w;

    if (x < 0.0 || x >= params.src_size.x || y < 0.0 || y >= params.src_size.y) {
        return vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }

    let limit = vec2<i32>(params.src_size) - vec2<i32>(1, 1);
    let i0 = vec2<i32>(i32(floor(x)), i32(floor(y)));
    let i1 = min(i0 + vec2<i32>(1, 1), limit);

    let p1 = textureLoad(source, vec2<i32>(i0.x, i0.y), 0).rgb;
    let p2 = textureLoad(source, vec2<i32>(i1.x, i0.y), 0).rgb;
    let p3 = textureLoad(source, vec2<i32>(i0.x, i1.y), 0).rgb;
    let p4 = textureLoad(source, vec2<i32>(i1.x, i1.y), 0).rgb;

    let t = x - floor(x);
    let u = y - floor(y);

    let top = mix(p1, p2, t);
    let bottom = mix(p3, p4, t);
    return vec4<f32>(mix(top, bottom, u), 1.0);
}
"#;
