//! Shader source loading and bootstrap errors.
//!
//! Shader source arrives through the [`ShaderProvider`] collaborator: the
//! layer asks for a named resource and gets WGSL text back. Both pipeline
//! stages are compiled from the same source text (`vs_main` / `fs_main`
//! entry points). A failed fetch or a validation error leaves the layer
//! non-renderable; neither is fatal to the process.

use std::fmt;
use std::path::PathBuf;

/// Resource name of the built-in line shader.
pub const LINE_SHADER: &str = "line.wgsl";

/// Supplies WGSL source text for a named shader resource.
pub trait ShaderProvider {
    fn load(&self, name: &str) -> Result<String, ShaderLoadError>;
}

/// A shader resource could not be fetched.
#[derive(Debug)]
pub struct ShaderLoadError {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for ShaderLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load shader {:?}: {}", self.name, self.reason)
    }
}

impl std::error::Error for ShaderLoadError {}

/// Why a bootstrap attempt failed. The layer stays inert until a later
/// attempt succeeds; render calls in the meantime are no-ops.
#[derive(Debug)]
pub enum BootstrapError {
    /// The shader source could not be fetched.
    Load(ShaderLoadError),
    /// The device rejected the shader module or pipeline; carries the full
    /// diagnostic text.
    Validation(String),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "bootstrap failed: {e}"),
            Self::Validation(msg) => write!(f, "shader validation failed: {msg}"),
        }
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl From<ShaderLoadError> for BootstrapError {
    fn from(e: ShaderLoadError) -> Self {
        Self::Load(e)
    }
}

/// Serves the shader sources embedded in the crate. The default provider.
pub struct BuiltinShaders;

impl ShaderProvider for BuiltinShaders {
    fn load(&self, name: &str) -> Result<String, ShaderLoadError> {
        if name == LINE_SHADER {
            Ok(super::pipeline::LINE_SHADER_SRC.to_owned())
        } else {
            Err(ShaderLoadError {
                name: name.to_owned(),
                reason: "no such built-in shader".to_owned(),
            })
        }
    }
}

/// Loads shader sources from a directory, for overriding the built-in
/// shader during development without rebuilding.
pub struct FileShaderProvider {
    root: PathBuf,
}

impl FileShaderProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShaderProvider for FileShaderProvider {
    fn load(&self, name: &str) -> Result<String, ShaderLoadError> {
        std::fs::read_to_string(self.root.join(name)).map_err(|e| ShaderLoadError {
            name: name.to_owned(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_provider_serves_line_shader() {
        let src = BuiltinShaders.load(LINE_SHADER).expect("built-in shader");
        assert!(src.contains("vs_main"));
        assert!(src.contains("fs_main"));
    }

    #[test]
    fn builtin_provider_rejects_unknown_names() {
        let err = BuiltinShaders.load("nope.wgsl").unwrap_err();
        assert_eq!(err.name, "nope.wgsl");
    }

    #[test]
    fn file_provider_reports_fetch_failures() {
        let provider = FileShaderProvider::new("/nonexistent/shaders");
        let err = provider.load(LINE_SHADER).unwrap_err();
        assert_eq!(err.name, LINE_SHADER);
        assert!(!err.reason.is_empty());
    }
}
