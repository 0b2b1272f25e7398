//! Delimiters and the runtime feature flags that shape a render call.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// Feature flags for a render call. Plain runtime fields rather than
/// const generics: the engine decides per render, not per monomorphized
/// type, matching how these flags are consulted at every tag rather
/// than compiled away.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub lambdas: bool,
    pub preserve_line_breaks_and_indentation: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            lambdas: true,
            preserve_line_breaks_and_indentation: true,
        }
    }
}
