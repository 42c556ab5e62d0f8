use std::f32::consts::PI;

use crate::vk_renderer::error::RenderError;

/// Largest division count whose `(d + 1)^2` vertices still fit in u16 indices.
const MAX_SPHERE_DIV: u32 = 255;

/// Tessellated geometry as flat, tightly packed attribute data.
///
/// `positions` holds three floats per vertex, `indices` is a triangle list.
/// For a radius of 1.0 the sphere is origin-centered and unit, so the
/// position array doubles as the normal attribute array; any model transform
/// applied downstream has to run normals through an inverse-transpose matrix.
pub struct GeometryData {
    pub positions: Vec<f32>,
    pub indices: Vec<u16>,
}

impl GeometryData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Latitude/longitude tessellation of a sphere.
///
/// `divisions` is the grid density along both the polar and azimuthal sweep,
/// giving `(d + 1)^2` vertices and `6 * d^2` indices. Seam vertices (first
/// and last column) and pole vertices are duplicated, not deduplicated.
pub fn sphere(divisions: u32, radius: f32) -> Result<GeometryData, RenderError> {
    if divisions == 0 {
        return Err(RenderError::InvalidParameter(
            "sphere divisions must be at least 1".into(),
        ));
    }
    if divisions > MAX_SPHERE_DIV {
        return Err(RenderError::InvalidParameter(format!(
            "sphere divisions {divisions} exceed the u16 index range (max {MAX_SPHERE_DIV})"
        )));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(RenderError::InvalidParameter(format!(
            "sphere radius must be finite and positive, got {radius}"
        )));
    }

    let mut positions = Vec::with_capacity(((divisions + 1) * (divisions + 1) * 3) as usize);
    for lat in 0..=divisions {
        let theta = PI * lat as f32 / divisions as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for lon in 0..=divisions {
            let phi = 2.0 * PI * lon as f32 / divisions as f32;
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();

            positions.push(sin_phi * sin_theta * radius); // x
            positions.push(cos_theta * radius); // y
            positions.push(cos_phi * sin_theta * radius); // z
        }
    }

    let mut indices = Vec::with_capacity((divisions * divisions * 6) as usize);
    for lat in 0..divisions {
        for lon in 0..divisions {
            let p1 = lat * (divisions + 1) + lon;
            let p2 = p1 + divisions + 1;

            indices.push(p1 as u16);
            indices.push(p2 as u16);
            indices.push((p1 + 1) as u16);

            indices.push((p1 + 1) as u16);
            indices.push(p2 as u16);
            indices.push((p2 + 1) as u16);
        }
    }

    Ok(GeometryData { positions, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn counts_match_grid_size() {
        for divisions in [1u32, 2, 5, 13, 64] {
            let geometry = sphere(divisions, 1.0).unwrap();
            let expected_vertices = ((divisions + 1) * (divisions + 1)) as usize;
            assert_eq!(geometry.vertex_count(), expected_vertices);
            assert_eq!(geometry.positions.len(), expected_vertices * 3);
            assert_eq!(geometry.index_count(), (divisions * divisions * 6) as usize);
        }
    }

    #[test]
    fn indices_stay_in_vertex_range() {
        for divisions in [1u32, 3, 13] {
            let geometry = sphere(divisions, 1.0).unwrap();
            let vertex_count = geometry.vertex_count() as u16;
            assert!(geometry.indices.iter().all(|&i| i < vertex_count));
        }
    }

    #[test]
    fn single_division_is_two_triangles() {
        let geometry = sphere(1, 1.0).unwrap();
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.indices, vec![0, 2, 1, 1, 2, 3]);
    }

    #[test]
    fn vertices_lie_on_the_sphere() {
        let radius = 2.5;
        let geometry = sphere(13, radius).unwrap();
        for vertex in geometry.positions.chunks_exact(3) {
            let len_sq = vertex[0] * vertex[0] + vertex[1] * vertex[1] + vertex[2] * vertex[2];
            assert_abs_diff_eq!(len_sq, radius * radius, epsilon = 1e-4);
        }

        let unit = sphere(13, 1.0).unwrap();
        for vertex in unit.positions.chunks_exact(3) {
            let len_sq = vertex[0] * vertex[0] + vertex[1] * vertex[1] + vertex[2] * vertex[2];
            assert_abs_diff_eq!(len_sq, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn poles_sit_on_the_y_axis() {
        let geometry = sphere(4, 1.0).unwrap();
        let north = &geometry.positions[0..3];
        assert_abs_diff_eq!(north[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(north[1], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(north[2], 0.0, epsilon = 1e-6);

        let last = geometry.positions.len() - 3;
        let south = &geometry.positions[last..];
        assert_abs_diff_eq!(south[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(south[1], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(south[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn generator_is_deterministic() {
        let a = sphere(13, 1.0).unwrap();
        let b = sphere(13, 1.0).unwrap();
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn output_is_finite() {
        let geometry = sphere(255, 1.0).unwrap();
        assert!(geometry.positions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn zero_divisions_is_rejected() {
        assert!(matches!(
            sphere(0, 1.0),
            Err(RenderError::InvalidParameter(_))
        ));
    }

    #[test]
    fn oversized_divisions_are_rejected() {
        assert!(sphere(255, 1.0).is_ok());
        assert!(matches!(
            sphere(256, 1.0),
            Err(RenderError::InvalidParameter(_))
        ));
    }

    #[test]
    fn bad_radius_is_rejected() {
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                sphere(13, radius),
                Err(RenderError::InvalidParameter(_))
            ));
        }
    }
}
