//! The two hard-coded triangles and the GLSL that draws them.

use crate::engine::mesh::Vertex;

/// Passes positions straight through to clip space.
pub const VERTEX_SHADER_SOURCE: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
void main()
{
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

pub const ORANGE_FRAGMENT_SOURCE: &str = "#version 330 core
out vec4 FragColor;
void main()
{
    FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);
}
";

pub const YELLOW_FRAGMENT_SOURCE: &str = "#version 330 core
out vec4 FragColor;
void main()
{
    FragColor = vec4(1.0f, 1.0f, 0.0f, 1.0f);
}
";

/// One fixed triangle: its vertices, the fragment shader coloring it, and
/// that color as data.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub name: &'static str,
    pub vertices: [Vertex; 3],
    pub fragment_source: &'static str,
    pub color: [f32; 4],
}

pub const ORANGE_TRIANGLE: Triangle = Triangle {
    name: "orange",
    vertices: [
        Vertex::new(0.0, 0.0, 0.0),   // top middle
        Vertex::new(0.2, -0.2, 0.0),  // bottom right
        Vertex::new(-0.2, -0.2, 0.0), // bottom left
    ],
    fragment_source: ORANGE_FRAGMENT_SOURCE,
    color: [1.0, 0.5, 0.2, 1.0],
};

pub const YELLOW_TRIANGLE: Triangle = Triangle {
    name: "yellow",
    vertices: [
        Vertex::new(0.5, 0.0, 0.0),  // top middle
        Vertex::new(0.7, -0.2, 0.0), // bottom right
        Vertex::new(0.3, -0.2, 0.0), // bottom left
    ],
    fragment_source: YELLOW_FRAGMENT_SOURCE,
    color: [1.0, 1.0, 0.0, 1.0],
};

/// Draw order: the orange triangle first, then the yellow one.
pub const TRIANGLES: [Triangle; 2] = [ORANGE_TRIANGLE, YELLOW_TRIANGLE];

impl Triangle {
    pub fn centroid(&self) -> [f32; 3] {
        let mut sum = [0.0f32; 3];
        for vertex in &self.vertices {
            for (acc, c) in sum.iter_mut().zip(vertex.position) {
                *acc += c;
            }
        }
        sum.map(|c| c / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Axis-aligned `[min_x, min_y, max_x, max_y]` of a triangle.
    fn bounds(triangle: &Triangle) -> [f32; 4] {
        let mut bounds = [f32::MAX, f32::MAX, f32::MIN, f32::MIN];
        for vertex in &triangle.vertices {
            let [x, y, _] = vertex.position;
            bounds[0] = bounds[0].min(x);
            bounds[1] = bounds[1].min(y);
            bounds[2] = bounds[2].max(x);
            bounds[3] = bounds[3].max(y);
        }
        bounds
    }

    fn assert_near(a: [f32; 3], b: [f32; 3]) {
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn orange_triangle_sits_near_origin() {
        assert_near(ORANGE_TRIANGLE.centroid(), [0.0, -0.4 / 3.0, 0.0]);
    }

    #[test]
    fn yellow_triangle_sits_near_half_x() {
        assert_near(YELLOW_TRIANGLE.centroid(), [0.5, -0.4 / 3.0, 0.0]);
    }

    #[test]
    fn triangles_do_not_overlap() {
        let left = bounds(&ORANGE_TRIANGLE);
        let right = bounds(&YELLOW_TRIANGLE);
        assert!(left[2] < right[0], "{left:?} overlaps {right:?}");
    }

    #[test]
    fn every_vertex_lies_in_the_z0_plane() {
        for triangle in TRIANGLES {
            assert!(triangle.vertices.iter().all(|v| v.position[2] == 0.0));
        }
    }

    #[test]
    fn fragment_sources_emit_their_colors() {
        assert!(ORANGE_FRAGMENT_SOURCE.contains("vec4(1.0f, 0.5f, 0.2f, 1.0f)"));
        assert!(YELLOW_FRAGMENT_SOURCE.contains("vec4(1.0f, 1.0f, 0.0f, 1.0f)"));
        assert_eq!(ORANGE_TRIANGLE.color, [1.0, 0.5, 0.2, 1.0]);
        assert_eq!(YELLOW_TRIANGLE.color, [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn shaders_target_glsl_330_core() {
        for source in [VERTEX_SHADER_SOURCE, ORANGE_FRAGMENT_SOURCE, YELLOW_FRAGMENT_SOURCE] {
            assert!(source.starts_with("#version 330 core\n"));
            assert!(!source.contains('\0'));
        }
        assert!(VERTEX_SHADER_SOURCE.contains("layout (location = 0) in vec3 aPos;"));
    }

    #[test]
    fn orange_is_drawn_first() {
        assert_eq!(TRIANGLES.map(|t| t.name), ["orange", "yellow"]);
    }
}
