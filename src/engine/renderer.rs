use std::ffi::CStr;
use std::panic;

use gl::types::GLenum;
use glutin::{
    dpi::PhysicalSize,
    event::{Event, KeyboardInput, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    platform::run_return::EventLoopExtRunReturn,
    window::{Window, WindowBuilder},
    Api,
    ContextBuilder,
    ContextError,
    ContextWrapper,
    CreationError,
    GlProfile,
    GlRequest,
    PossiblyCurrent,
};
use thiserror::Error;

use crate::engine::frame_loop::{FrameLoop, InputState, Viewport};
use crate::engine::mesh::TriangleMesh;
use crate::engine::settings::WindowSettings;
use crate::engine::shader::{self, Shader, ShaderError, ShaderProgram, ShaderStage};
use crate::engine::triangles::{TRIANGLES, VERTEX_SHADER_SOURCE};

#[derive(Error, Debug)]
pub enum RendererError {
    /// The platform has no usable display connection.
    #[error("Failed to create GLFW window")]
    NoDisplay,
    #[error("Failed to create GLFW window")]
    WindowCreation(#[source] CreationError),
    #[error("Failed to create GLFW window")]
    MakeCurrent(#[source] ContextError),
    #[error("Failed to initialize GLAD")]
    FunctionLoading { missing: Vec<&'static str> },
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("failed to present frame")]
    Present(#[source] ContextError),
}

impl RendererError {
    /// Shader failures print their own diagnostic when they happen.
    pub fn already_reported(&self) -> bool {
        matches!(self, RendererError::Shader(_))
    }
}

/// One triangle ready to draw: the program coloring it and its geometry.
#[derive(Debug)]
struct DrawPass {
    name: &'static str,
    program: ShaderProgram,
    mesh: TriangleMesh,
}

/// `Renderer` owns the window, its OpenGL context and the GPU objects for the
/// two triangles, and runs the frame loop until the window closes.
///
/// # Design Notes
///
/// - Uses `glutin::EventLoop` for window events; the loop is driven with
///   `run_return` so the caller gets control back and picks the exit code.
/// - The context is requested as OpenGL 3.3 core and made current once, on
///   the thread that created it; every GL call happens on that thread.
/// - GL objects (`DrawPass`) are declared before the context so they are
///   released while it is still current.
///
/// # Example Usage
///
/// ```no_run
/// let renderer = Renderer::new(&WindowSettings::default())?;
/// renderer.run()?;
/// ```
pub struct Renderer {
    /// Orange pass first, yellow pass second.
    passes: Vec<DrawPass>,

    /// The OpenGL context tied to the window, current on this thread.
    windowed_context: ContextWrapper<PossiblyCurrent, Window>,

    /// Color the framebuffer is cleared to each frame.
    clear_color: [f32; 4],

    event_loop: EventLoop<()>,
}

impl Renderer {
    /// Opens the window described by `settings`, loads the GL entry points
    /// and uploads both triangles with their shader programs.
    ///
    /// # Errors
    /// - window or context creation fails (no display, unsupported GL version);
    /// - an entry point the renderer uses could not be loaded;
    /// - a shader source cannot be handed to the driver at all.
    ///
    /// Shader compile and link failures are printed but not fatal: the pass is
    /// kept and draws with whatever the driver made of it.
    ///
    /// Everything created before a failure is released on the way out.
    pub fn new(settings: &WindowSettings) -> Result<Self, RendererError> {
        // Create the event loop; winit panics when no display backend can be reached
        let event_loop =
            panic::catch_unwind(EventLoop::<()>::new).map_err(|_| RendererError::NoDisplay)?;

        // Build a window with the requested title and inner size (content area size)
        let wb = WindowBuilder::new()
            .with_title(settings.title.as_str())
            .with_inner_size(PhysicalSize::new(settings.width, settings.height));

        // Ask for a core-profile context of the requested version, vsync'd swaps
        let windowed_context = ContextBuilder::new()
            .with_gl(GlRequest::Specific(Api::OpenGl, settings.gl_version))
            .with_gl_profile(GlProfile::Core)
            .with_vsync(settings.vsync)
            .build_windowed(wb, &event_loop)
            .map_err(RendererError::WindowCreation)?;

        // Make the context current on this thread; required before issuing GL calls
        let windowed_context = unsafe { windowed_context.make_current() }
            .map_err(|(_, err)| RendererError::MakeCurrent(err))?;

        // Load the GL function pointers through the context, then make sure
        // every one we call actually resolved
        gl::load_with(|symbol| windowed_context.get_proc_address(symbol) as *const _);
        check_entry_points()?;
        log::info!(
            "OpenGL {} on {}",
            gl_string(gl::VERSION).unwrap_or_default(),
            gl_string(gl::RENDERER).unwrap_or_default()
        );

        // Start with the viewport covering the whole framebuffer
        let size = windowed_context.window().inner_size();
        Viewport::covering(size).apply();
        log::info!("window \"{}\" {}x{}", settings.title, size.width, size.height);

        // Compile, link and upload both triangles
        let passes = build_passes()?;

        Ok(Self {
            passes,
            windowed_context,
            clear_color: settings.clear_color,
            event_loop,
        })
    }

    /// Runs the frame loop until Escape is pressed or the window is closed.
    ///
    /// The loop polls: every iteration handles pending events, then samples
    /// input, clears, draws every pass in order and swaps. Input that requests
    /// a close still lets the current frame finish; the loop exits right after.
    pub fn run(self) -> Result<(), RendererError> {
        let Renderer {
            passes,
            windowed_context,
            clear_color,
            mut event_loop,
        } = self;

        let mut frame_loop = FrameLoop::new();
        let mut input = InputState::default();
        let mut failure = None;

        event_loop.run_return(|event, _, control_flow| {
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => frame_loop.request_close(),
                    WindowEvent::Resized(size) => resize(&windowed_context, size),
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        resize(&windowed_context, *new_inner_size)
                    }
                    WindowEvent::KeyboardInput {
                        input: KeyboardInput { virtual_keycode, state, .. },
                        ..
                    } => input.key_event(virtual_keycode, state),
                    _ => {}
                },

                Event::MainEventsCleared => {
                    // Top of the iteration: stop here if the last frame asked to close
                    *control_flow = frame_loop.control_flow();
                    if !frame_loop.should_close() {
                        windowed_context.window().request_redraw();
                    }
                }

                Event::RedrawRequested(_) => {
                    frame_loop.process_input(&input);
                    draw_frame(clear_color, &passes);

                    match windowed_context.swap_buffers() {
                        Ok(()) => frame_loop.frame_finished(),
                        Err(err) => {
                            log::error!("swap_buffers failed: {err}");
                            failure = Some(RendererError::Present(err));
                            *control_flow = ControlFlow::Exit;
                        }
                    }
                }

                Event::RedrawEventsCleared => {
                    if failure.is_none() {
                        *control_flow = frame_loop.control_flow();
                    }
                }

                _ => {}
            }
        });

        log::info!(
            "frame loop {:?} after {} frames",
            frame_loop.state(),
            frame_loop.frames()
        );

        // Release GL objects while the context is still current.
        drop(passes);
        drop(windowed_context);

        failure.map_or(Ok(()), Err)
    }
}

/// Compiles the shared vertex shader, then links it with each triangle's
/// fragment shader and uploads the triangle's vertices.
///
/// Fragment shaders are released as soon as their program is linked; the
/// vertex shader once every program has linked against it.
fn build_passes() -> Result<Vec<DrawPass>, RendererError> {
    let vertex = compile(ShaderStage::Vertex, VERTEX_SHADER_SOURCE)?;

    let mut passes = Vec::with_capacity(TRIANGLES.len());
    for triangle in &TRIANGLES {
        let fragment = compile(ShaderStage::Fragment, triangle.fragment_source)?;
        let program = ShaderProgram::link(&[&vertex, &fragment]);
        if shader::report(program.check()).is_err() {
            log::warn!("{} program failed to link, drawing with it anyway", triangle.name);
        }

        let mesh = TriangleMesh::upload(&triangle.vertices);
        log::debug!(
            "{} triangle: program {}, {} vertices around {:?}, color {:?}",
            triangle.name,
            program.id(),
            mesh.vertex_count(),
            triangle.centroid(),
            triangle.color
        );

        passes.push(DrawPass {
            name: triangle.name,
            program,
            mesh,
        });
    }

    log::info!(
        "uploaded passes: {}",
        passes.iter().map(|pass| pass.name).collect::<Vec<_>>().join(", ")
    );
    Ok(passes)
}

/// Compiles one stage. A failed compile is printed and the shader kept.
fn compile(stage: ShaderStage, source: &str) -> Result<Shader, ShaderError> {
    let shader = Shader::compile(stage, source)?;
    if shader::report(shader.check()).is_err() {
        log::warn!("{stage} shader {} failed to compile, linking it anyway", shader.id());
    } else {
        log::debug!("{} shader {} ready", shader.stage(), shader.id());
    }
    Ok(shader)
}

fn draw_frame(clear_color: [f32; 4], passes: &[DrawPass]) {
    unsafe {
        gl::ClearColor(clear_color[0], clear_color[1], clear_color[2], clear_color[3]);
        gl::Clear(gl::COLOR_BUFFER_BIT);
    }

    for pass in passes {
        pass.program.bind();
        pass.mesh.draw();
    }
}

/// Forwards a new framebuffer size to the surface and the viewport.
fn resize(windowed_context: &ContextWrapper<PossiblyCurrent, Window>, size: PhysicalSize<u32>) {
    windowed_context.resize(size);
    Viewport::covering(size).apply();
    log::debug!("viewport resized to {}x{}", size.width, size.height);
}

/// Fails when any entry point the renderer calls did not load.
fn check_entry_points() -> Result<(), RendererError> {
    let entry_points = [
        ("glClearColor", gl::ClearColor::is_loaded()),
        ("glClear", gl::Clear::is_loaded()),
        ("glViewport", gl::Viewport::is_loaded()),
        ("glGetString", gl::GetString::is_loaded()),
        ("glCreateShader", gl::CreateShader::is_loaded()),
        ("glShaderSource", gl::ShaderSource::is_loaded()),
        ("glCompileShader", gl::CompileShader::is_loaded()),
        ("glGetShaderiv", gl::GetShaderiv::is_loaded()),
        ("glGetShaderInfoLog", gl::GetShaderInfoLog::is_loaded()),
        ("glDeleteShader", gl::DeleteShader::is_loaded()),
        ("glCreateProgram", gl::CreateProgram::is_loaded()),
        ("glAttachShader", gl::AttachShader::is_loaded()),
        ("glDetachShader", gl::DetachShader::is_loaded()),
        ("glLinkProgram", gl::LinkProgram::is_loaded()),
        ("glGetProgramiv", gl::GetProgramiv::is_loaded()),
        ("glGetProgramInfoLog", gl::GetProgramInfoLog::is_loaded()),
        ("glUseProgram", gl::UseProgram::is_loaded()),
        ("glDeleteProgram", gl::DeleteProgram::is_loaded()),
        ("glGenBuffers", gl::GenBuffers::is_loaded()),
        ("glBindBuffer", gl::BindBuffer::is_loaded()),
        ("glBufferData", gl::BufferData::is_loaded()),
        ("glDeleteBuffers", gl::DeleteBuffers::is_loaded()),
        ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
        ("glBindVertexArray", gl::BindVertexArray::is_loaded()),
        ("glDeleteVertexArrays", gl::DeleteVertexArrays::is_loaded()),
        ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded()),
        ("glEnableVertexAttribArray", gl::EnableVertexAttribArray::is_loaded()),
        ("glDrawArrays", gl::DrawArrays::is_loaded()),
    ];

    let missing = missing_entry_points(&entry_points);
    if missing.is_empty() {
        Ok(())
    } else {
        log::error!("unloaded GL entry points: {}", missing.join(", "));
        Err(RendererError::FunctionLoading { missing })
    }
}

fn missing_entry_points(entry_points: &[(&'static str, bool)]) -> Vec<&'static str> {
    entry_points
        .iter()
        .filter(|(_, loaded)| !loaded)
        .map(|(name, _)| *name)
        .collect()
}

fn gl_string(name: GLenum) -> Option<String> {
    let ptr = unsafe { gl::GetString(name) };
    if ptr.is_null() {
        return None;
    }
    let text = unsafe { CStr::from_ptr(ptr as *const _) };
    Some(text.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_print_the_expected_messages() {
        assert_eq!(RendererError::NoDisplay.to_string(), "Failed to create GLFW window");
        assert_eq!(
            RendererError::FunctionLoading { missing: vec!["glClear"] }.to_string(),
            "Failed to initialize GLAD"
        );
    }

    #[test]
    fn shader_errors_pass_their_diagnostic_through() {
        let err = RendererError::from(ShaderError::Link { log: "oops".to_owned() });
        assert_eq!(err.to_string(), "ERROR::PROGRAM::LINKING::COMPILATION_FAILED\noops");
        assert!(err.already_reported());
        assert!(!RendererError::NoDisplay.already_reported());
    }

    #[test]
    fn missing_entry_points_are_listed_in_order() {
        let entry_points = [("glClear", true), ("glDrawArrays", false), ("glViewport", false)];
        assert_eq!(missing_entry_points(&entry_points), vec!["glDrawArrays", "glViewport"]);
        assert!(missing_entry_points(&[("glClear", true)]).is_empty());
    }
}
