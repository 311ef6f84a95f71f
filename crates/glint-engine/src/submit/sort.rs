use crate::coords::Vec3;
use crate::pipeline::VertexLayout;

/// Depth-sorts quad mesh bytes back-to-front relative to `viewer`, in place.
///
/// Sorting whole quads (groups of four vertices) keeps the shared quad index
/// pattern valid: the pattern only assumes quads are contiguous, not which
/// order they appear in. Translucency is therefore correct *within* this one
/// draw call; ordering across draw-state keys stays unspecified.
///
/// A trailing partial quad (vertex count not a multiple of four) is left in
/// place at the end.
pub fn sort_quads_back_to_front(bytes: &mut [u8], layout: VertexLayout, viewer: Vec3) {
    let stride = layout.stride as usize;
    let quad = stride * 4;
    if quad == 0 || bytes.len() < 2 * quad {
        return;
    }

    let count = bytes.len() / quad;
    let pos_off = layout.position_offset as usize;

    let mut order: Vec<(f32, usize)> = (0..count)
        .map(|q| (quad_distance_squared(bytes, q, stride, pos_off, viewer), q))
        .collect();
    // Farthest first. NaN distances (degenerate vertices) sort as equal.
    order.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(core::cmp::Ordering::Equal));

    if order.iter().enumerate().all(|(dst, &(_, src))| dst == src) {
        return;
    }

    let mut scratch = vec![0u8; count * quad];
    for (dst, &(_, src)) in order.iter().enumerate() {
        scratch[dst * quad..(dst + 1) * quad].copy_from_slice(&bytes[src * quad..(src + 1) * quad]);
    }
    bytes[..count * quad].copy_from_slice(&scratch);
}

fn quad_distance_squared(
    bytes: &[u8],
    quad_index: usize,
    stride: usize,
    pos_off: usize,
    viewer: Vec3,
) -> f32 {
    let mut centroid = Vec3::zero();
    for v in 0..4 {
        let base = (quad_index * 4 + v) * stride + pos_off;
        centroid = centroid
            + Vec3::new(
                read_f32(bytes, base),
                read_f32(bytes, base + 4),
                read_f32(bytes, base + 8),
            );
    }
    (centroid * 0.25).distance_squared(viewer)
}

#[inline]
fn read_f32(bytes: &[u8], off: usize) -> f32 {
    f32::from_ne_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    // Position-only layout: three f32s per vertex.
    fn layout() -> VertexLayout {
        VertexLayout::new(0, 12, 0)
    }

    fn quad_at(z: f32) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (x, y) in [(0.0f32, 0.0f32), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            bytes.extend_from_slice(&x.to_ne_bytes());
            bytes.extend_from_slice(&y.to_ne_bytes());
            bytes.extend_from_slice(&z.to_ne_bytes());
        }
        bytes
    }

    fn quad_z(bytes: &[u8], quad: usize) -> f32 {
        read_f32(bytes, quad * 4 * 12 + 8)
    }

    #[test]
    fn near_quad_moves_behind_far_quad() {
        let mut bytes = quad_at(1.0);
        bytes.extend(quad_at(10.0));
        sort_quads_back_to_front(&mut bytes, layout(), Vec3::zero());

        assert_eq!(quad_z(&bytes, 0), 10.0);
        assert_eq!(quad_z(&bytes, 1), 1.0);
    }

    #[test]
    fn already_sorted_input_is_untouched() {
        let mut bytes = quad_at(10.0);
        bytes.extend(quad_at(1.0));
        let before = bytes.clone();
        sort_quads_back_to_front(&mut bytes, layout(), Vec3::zero());
        assert_eq!(bytes, before);
    }

    #[test]
    fn sort_is_relative_to_viewer() {
        let mut bytes = quad_at(0.0);
        bytes.extend(quad_at(10.0));
        // Viewer sits past the second quad, so the first is the far one.
        sort_quads_back_to_front(&mut bytes, layout(), Vec3::new(0.5, 0.5, 12.0));
        assert_eq!(quad_z(&bytes, 0), 0.0);
        assert_eq!(quad_z(&bytes, 1), 10.0);
    }

    #[test]
    fn single_quad_is_untouched() {
        let mut bytes = quad_at(5.0);
        let before = bytes.clone();
        sort_quads_back_to_front(&mut bytes, layout(), Vec3::zero());
        assert_eq!(bytes, before);
    }
}
