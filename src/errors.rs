use thiserror::Error;

/// Structural failures that abort a pipeline invocation.
///
/// Per-sample anomalies (degenerate rings, unrepairable polygons, hierarchy
/// cycles, velocity underflow) are handled where they occur and never show
/// up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// The drawing contained no usable entities at all.
    #[error("drawing contains no usable entities")]
    EmptyDrawing,
    /// Classification left the CUT class empty.
    #[error("no cuttable strokes after classification")]
    NoCuttable,
    /// A configuration value was rejected before processing started.
    #[error("invalid parameter: {0}")]
    ParameterInvalid(String),
    /// A text stream being imported did not match the expected layout.
    #[error("malformed trajectory stream: {0}")]
    MalformedStream(String),
}
