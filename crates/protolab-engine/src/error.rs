use crate::compile::Diagnostic;

/// Every fallible studio operation resolves to one of these kinds.
/// Lookup misses, uniqueness violations and lifecycle violations are all
/// surfaced as errors rather than sentinel values; lenient no-op cases
/// (removing something already gone) return `Ok` instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StudioError {
    /// Authored or compiled text fails the structural class-shape check.
    #[error("module source is not valid")]
    SourceInvalid,

    /// The compiler boundary reported fatal diagnostics and no usable output.
    #[error("compile failed:\n{}", format_diagnostics(.0))]
    CompileFailed(Vec<Diagnostic>),

    #[error("game module name duplicated")]
    NameDuplicated,

    #[error("game module id duplicated")]
    IdDuplicated,

    #[error("game module not found")]
    ModuleNotFound,

    #[error("scene name is empty")]
    SceneNameEmpty,

    #[error("scene name or id duplicated")]
    SceneDuplicated,

    #[error("scene not found")]
    SceneNotFound,

    #[error("no scene is currently running")]
    CurrentSceneNotExists,

    #[error("cannot start a scene: no target scene and no default scene")]
    CannotStartScene,

    #[error("game object not found")]
    GameObjectNotFound,

    #[error("game object id duplicated")]
    GameObjectDuplicated,

    #[error("game is not running")]
    GameNotRunning,

    /// An injection or value read referenced a member that does not exist
    /// on the live instance.
    #[error("failed to resolve expose data: {0}")]
    FailedToResolveExposeData(String),

    #[error("engine is already running")]
    AlreadyRunning,

    /// A project snapshot could not be encoded or decoded.
    #[error("project snapshot invalid: {0}")]
    SnapshotInvalid(String),
}

pub type StudioResult<T> = Result<T, StudioError>;

fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for d in diagnostics {
        out.push_str(&format!(
            "{}:{} {}\n",
            d.position.line, d.position.column, d.message
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::DiagnosticPosition;

    #[test]
    fn compile_failed_lists_diagnostics() {
        let err = StudioError::CompileFailed(vec![Diagnostic {
            position: DiagnosticPosition { line: 3, column: 7 },
            message: "unexpected token".into(),
        }]);
        let text = err.to_string();
        assert!(text.contains("3:7"));
        assert!(text.contains("unexpected token"));
    }
}
