//! Shader compilation and program linking.
//!
//! `Shader` and `ShaderProgram` own their GL objects and release them on drop.
//! Compiling or linking always hands back the object; the driver's verdict is
//! read separately with `check()` so the caller decides whether a failure is
//! fatal.

use std::ffi::CString;
use std::fmt;
use std::ptr;

use gl::types::{GLchar, GLenum, GLint, GLuint};
use thiserror::Error;

/// Pipeline stage a shader is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_kind(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("VERTEX"),
            ShaderStage::Fragment => f.write_str("FRAGMENT"),
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ShaderError {
    #[error("ERROR::SHADER::{stage}::INVALID_SOURCE\nsource contains a NUL byte at offset {offset}")]
    InvalidSource { stage: ShaderStage, offset: usize },
    #[error("ERROR::SHADER::{stage}::COMPILATION_FAILED\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("ERROR::PROGRAM::LINKING::COMPILATION_FAILED\n{log}")]
    Link { log: String },
}

/// Prints the diagnostic of a failed compile/link step to stdout and hands
/// the result back unchanged.
pub fn report(result: Result<(), ShaderError>) -> Result<(), ShaderError> {
    if let Err(err) = &result {
        println!("{err}");
    }
    result
}

/// A compiled (or failed-to-compile) shader object.
#[derive(Debug)]
pub struct Shader {
    id: GLuint,
    stage: ShaderStage,
}

impl Shader {
    /// Creates a shader object for `stage`, uploads `source` and compiles it.
    ///
    /// Only a source the driver cannot receive at all (interior NUL) is an
    /// error here; compile failures are reported by [`Shader::check`].
    pub fn compile(stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let c_source = CString::new(source).map_err(|err| ShaderError::InvalidSource {
            stage,
            offset: err.nul_position(),
        })?;

        let id = unsafe {
            let id = gl::CreateShader(stage.gl_kind());
            gl::ShaderSource(id, 1, &c_source.as_ptr(), ptr::null());
            gl::CompileShader(id);
            id
        };
        log::debug!("compiled {stage} shader {id}");

        Ok(Self { id, stage })
    }

    /// Reads the compile status, returning the driver log on failure.
    pub fn check(&self) -> Result<(), ShaderError> {
        let mut status: GLint = 0;
        unsafe {
            gl::GetShaderiv(self.id, gl::COMPILE_STATUS, &mut status);
        }
        if status != 0 {
            return Ok(());
        }

        let mut len: GLint = 0;
        unsafe {
            gl::GetShaderiv(self.id, gl::INFO_LOG_LENGTH, &mut len);
        }
        let mut buf = vec![0u8; len.max(1) as usize];
        unsafe {
            gl::GetShaderInfoLog(
                self.id,
                buf.len() as GLint,
                ptr::null_mut(),
                buf.as_mut_ptr() as *mut GLchar,
            );
        }

        Err(ShaderError::Compile {
            stage: self.stage,
            log: info_log_to_string(&buf),
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn id(&self) -> GLuint {
        self.id
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        // Deleting a shader still attached to a program only flags it; the
        // programs here detach right after linking.
        unsafe {
            gl::DeleteShader(self.id);
        }
    }
}

/// A linked shader program, bound with [`ShaderProgram::bind`] before drawing.
#[derive(Debug)]
pub struct ShaderProgram {
    id: GLuint,
}

impl ShaderProgram {
    /// Links `shaders` into a new program. Failures are reported by [`ShaderProgram::check`].
    pub fn link(shaders: &[&Shader]) -> Self {
        let id = unsafe {
            let id = gl::CreateProgram();
            for shader in shaders {
                gl::AttachShader(id, shader.id);
            }
            gl::LinkProgram(id);
            for shader in shaders {
                gl::DetachShader(id, shader.id);
            }
            id
        };
        log::debug!("linked program {id} from {} shaders", shaders.len());

        Self { id }
    }

    /// Reads the link status, returning the driver log on failure.
    pub fn check(&self) -> Result<(), ShaderError> {
        let mut status: GLint = 0;
        unsafe {
            gl::GetProgramiv(self.id, gl::LINK_STATUS, &mut status);
        }
        if status != 0 {
            return Ok(());
        }

        let mut len: GLint = 0;
        unsafe {
            gl::GetProgramiv(self.id, gl::INFO_LOG_LENGTH, &mut len);
        }
        let mut buf = vec![0u8; len.max(1) as usize];
        unsafe {
            gl::GetProgramInfoLog(
                self.id,
                buf.len() as GLint,
                ptr::null_mut(),
                buf.as_mut_ptr() as *mut GLchar,
            );
        }

        Err(ShaderError::Link {
            log: info_log_to_string(&buf),
        })
    }

    pub fn bind(&self) {
        unsafe {
            gl::UseProgram(self.id);
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

/// Converts a driver info log buffer into text, dropping the NUL terminator
/// and trailing whitespace.
fn info_log_to_string(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim_end().to_owned()
}
