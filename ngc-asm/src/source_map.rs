//! Maps each emitted instruction word back to the source line that
//! produced it, for diagnostics and downstream tooling (debuggers, linters)
//! that want to relate an assembled word back to where it came from.

/// One emitted word's provenance: the 1-based source line of the `Line`
/// that produced it (the call-site line for a macro reference's first
/// word, the body line for words emitted while expanding it).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceMapItem {
    pub line: u32,
}

pub type SourceMap = Vec<SourceMapItem>;
