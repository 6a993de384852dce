use std::mem;

use gl::types::{GLsizei, GLsizeiptr, GLuint};

/// Vertex format: a bare model-space position.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3], // x, y, z
}

impl Vertex {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }
}

/// Attribute location the vertex shader reads positions from.
pub const POSITION_LOCATION: GLuint = 0;

/// Byte distance between consecutive vertices in a buffer.
pub const VERTEX_STRIDE: GLsizei = mem::size_of::<Vertex>() as GLsizei;

/// GPU-side array buffer holding vertex data.
#[derive(Debug)]
pub struct VertexBuffer {
    id: GLuint,
}

impl VertexBuffer {
    /// Creates a buffer and uploads `vertices` with `STATIC_DRAW` usage.
    ///
    /// Leaves the buffer bound to `ARRAY_BUFFER`.
    pub fn with_vertices(vertices: &[Vertex]) -> Self {
        let mut id = 0;
        unsafe {
            gl::GenBuffers(1, &mut id);
            gl::BindBuffer(gl::ARRAY_BUFFER, id);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                mem::size_of_val(vertices) as GLsizeiptr,
                vertices.as_ptr() as *const _,
                gl::STATIC_DRAW,
            );
        }
        Self { id }
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.id);
        }
    }
}

/// Vertex array object describing how a buffer maps to shader inputs.
#[derive(Debug)]
pub struct VertexArray {
    id: GLuint,
}

impl VertexArray {
    /// Creates a vertex array and leaves it bound.
    pub fn new() -> Self {
        let mut id = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut id);
            gl::BindVertexArray(id);
        }
        Self { id }
    }

    pub fn bind(&self) {
        unsafe {
            gl::BindVertexArray(self.id);
        }
    }
}

impl Default for VertexArray {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.id);
        }
    }
}

/// A vertex array plus the buffer it reads from, drawn as plain triangles.
#[derive(Debug)]
pub struct TriangleMesh {
    // The array references the buffer, so release it first.
    vao: VertexArray,
    #[allow(dead_code)] // held only so it lives as long as the array
    vbo: VertexBuffer,
    vertex_count: usize,
}

impl TriangleMesh {
    /// Uploads `vertices` and records a single position attribute
    /// (3 floats, tightly packed) at [`POSITION_LOCATION`].
    pub fn upload(vertices: &[Vertex]) -> Self {
        let vao = VertexArray::new();
        let vbo = VertexBuffer::with_vertices(vertices);
        unsafe {
            gl::VertexAttribPointer(
                POSITION_LOCATION,
                3,
                gl::FLOAT,
                gl::FALSE,
                VERTEX_STRIDE,
                std::ptr::null(),
            );
            gl::EnableVertexAttribArray(POSITION_LOCATION);
            gl::BindVertexArray(0);
        }
        log::debug!("uploaded {} vertices into buffer {}", vertices.len(), vbo.id);

        Self {
            vao,
            vbo,
            vertex_count: vertices.len(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Binds the vertex array and issues a `TRIANGLES` draw over every vertex.
    ///
    /// The program to draw with must already be bound.
    pub fn draw(&self) {
        self.vao.bind();
        unsafe {
            gl::DrawArrays(gl::TRIANGLES, 0, self.vertex_count as GLsizei);
        }
    }
}
