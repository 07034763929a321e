//! Structures shared by all of the rendering code: shader program loading,
//! texture loading and the uniforms combinator.

use std::{
    fs::File,
    io::{self, prelude::*, BufReader},
    path::{Path, PathBuf},
};

use glium::{
    backend::Facade,
    glutin::{dpi::PhysicalSize, event_loop::EventLoop, window::WindowBuilder, ContextBuilder},
    texture::{RawImage2d, Texture2d},
    uniforms::{EmptyUniforms, UniformValue, Uniforms},
    Display, Program, ProgramCreationError,
};
use log::{debug, error, info};
use thiserror::Error;

pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 960;

/// Errors produced while creating GPU resources from files.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read \"{path}\"")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to compile shader \"{name}\"")]
    Compile {
        name: String,
        #[source]
        source: ProgramCreationError,
    },

    #[error("failed to create a device resource")]
    Device(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to import mesh \"{path}\"")]
    Mesh {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}

/// Combines multiple `Uniforms` values into one.
pub struct UniformsSet<H, T>(H, T);

impl<H: Uniforms> UniformsSet<H, EmptyUniforms> {
    pub fn new(head: H) -> Self {
        UniformsSet(head, EmptyUniforms)
    }
}

impl<H: Uniforms, T: Uniforms> UniformsSet<H, T> {
    /// Chains another `Uniforms` in front of this set.
    pub fn add<NH: Uniforms>(self, new_head: NH) -> UniformsSet<NH, UniformsSet<H, T>> {
        UniformsSet(new_head, self)
    }
}

impl<H: Uniforms, T: Uniforms> Uniforms for UniformsSet<H, T> {
    fn visit_values<'a, F: FnMut(&str, UniformValue<'a>)>(&'a self, mut callback: F) {
        self.0.visit_values(&mut callback);
        self.1.visit_values(&mut callback);
    }
}

/// Creates the window and the OpenGL context. The context gets a depth
/// buffer; the scene is forward-rendered straight into the default
/// framebuffer.
pub fn initialize_window() -> (EventLoop<()>, Display) {
    let event_loop = EventLoop::new();
    let wb = WindowBuilder::new()
        .with_title("Sheeny")
        .with_resizable(false)
        .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
    let cb = ContextBuilder::new().with_depth_buffer(24);
    let display = Display::new(wb, cb, &event_loop).expect("Failed to create display");
    info!(
        "Supported OpenGL version: {}",
        display.get_opengl_version_string()
    );

    (event_loop, display)
}

/// Loads and compiles a vertex/fragment shader pair from
/// `shaders/<basename>.vert` and `shaders/<basename>.frag`.
pub fn load_program(facade: &impl Facade, basename: &str) -> Result<Program, AssetError> {
    let vertex_shader = read_shader_source(&format!("shaders/{}.vert", basename))?;
    let fragment_shader = read_shader_source(&format!("shaders/{}.frag", basename))?;

    let program = Program::from_source(facade, &vertex_shader, &fragment_shader, None).map_err(
        |source| {
            error!("Failed to compile the shader \"{}\": {}", basename, source);
            AssetError::Compile {
                name: basename.to_string(),
                source,
            }
        },
    )?;
    debug!("Compiled shader \"{}\"", basename);
    Ok(program)
}

fn read_shader_source(path: &str) -> Result<String, AssetError> {
    let open = |p: &str| -> io::Result<String> {
        let mut file = BufReader::new(File::open(p)?);
        let mut source = String::with_capacity(1024);
        file.read_to_string(&mut source)?;
        Ok(source)
    };
    open(path).map_err(|source| AssetError::Io {
        path: PathBuf::from(path),
        source,
    })
}

/// Loads an LDR image file (PNG, JPEG, DDS) into a `Texture2d`.
pub fn load_texture(
    facade: &impl Facade,
    filename: impl AsRef<Path>,
) -> Result<Texture2d, AssetError> {
    let filename = filename.as_ref();

    debug!("Loading texture {:?}", filename);
    let original_image = image::open(filename)
        .map_err(|e| AssetError::Io {
            path: filename.to_owned(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?
        .into_rgba();
    let dimensions = original_image.dimensions();

    let raw_image = RawImage2d::from_raw_rgba_reversed(&original_image.into_raw(), dimensions);
    let texture =
        Texture2d::new(facade, raw_image).map_err(|e| AssetError::Device(Box::new(e)))?;

    info!("Loaded {:?}; dimensions are {:?}", filename, dimensions);
    Ok(texture)
}
