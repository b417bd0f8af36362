//! Compiler boundary: the external collaborator that turns user-authored
//! module source into an executable class artifact plus a type declaration.
//! The studio core only orchestrates validate → compile → install; how the
//! body becomes executable is the implementation's business.

pub mod class;
pub mod native;

use std::sync::Arc;

use class::CompiledClass;

/// An ambient type declaration made visible to every compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub uri: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticPosition {
    pub line: u32,
    pub column: u32,
}

/// One compiler message, fatal or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub position: DiagnosticPosition,
    pub message: String,
}

/// Result of one compilation.
///
/// Non-empty diagnostics with no usable output mean a fatal failure;
/// diagnostics alongside a usable body/class are warnings and the registry
/// treats the compilation as a success.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub diagnostics: Vec<Diagnostic>,
    /// Lowered source text of the module body.
    pub body: Option<String>,
    /// Declaration text describing the module's public surface.
    pub declaration: Option<String>,
    /// The instantiable artifact bound to the body.
    pub class: Option<Arc<CompiledClass>>,
}

impl CompileOutput {
    /// Fatal ⇔ diagnostics present and nothing usable came out.
    pub fn is_fatal(&self) -> bool {
        !self.diagnostics.is_empty()
            && self.body.is_none()
            && self.declaration.is_none()
            && self.class.is_none()
    }

    pub fn failure(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }
}

/// The compiler boundary. One compilation is in flight at a time per
/// machine; the registry holds the machine behind `&mut self`, which
/// serializes compilations against its ambient declaration state.
pub trait CompileMachine {
    /// Replace the ambient declaration set visible to subsequent compiles.
    fn set_declarations(&mut self, declarations: Vec<TypeDeclaration>);

    /// Stage the source text to compile.
    fn set_code(&mut self, source: &str);

    /// The currently staged source text.
    fn code(&self) -> &str;

    /// Compile the staged source against the ambient declarations.
    fn compile(&mut self) -> CompileOutput;
}
