pub mod frame_loop;
pub mod mesh;
pub mod renderer;
pub mod settings;
pub mod shader;
pub mod triangles;
