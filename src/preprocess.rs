//! Template preprocessing: find fun-dsl calls between markers, dispatch them
//! and leave `{{placeholder}}` references behind.
//!
//! ```text
//! "Sales %$ line(y=[1, 2]) $% rose."
//!        ^^^^^^^^^^^^^^^^^^^^^^^^^^ marked span
//!
//! text:     "Sales {{fundsl_3f2a...}} rose."
//! segments: [fundsl_3f2a... => <canvas ...> + chart.js]
//! ```
//!
//! A failing span does not stop the pass. Its error is collected, the span
//! is kept verbatim, and processing moves on to the next span.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::fundsl::{Call, CallError, Context, DslError, KwArgs};
use crate::render::Fragment;

/// Default start marker.
pub const DEFAULT_START: &str = "%$";
/// Default end marker.
pub const DEFAULT_END: &str = "$%";
/// Prefix of generated placeholder names.
pub const PLACEHOLDER_PREFIX: &str = "fundsl_";

// ============================================================================
// Function table
// ============================================================================

/// A host function callable from fun-dsl.
pub type Callable<'a> = Box<dyn Fn(&KwArgs) -> Result<Fragment, CallError> + 'a>;

/// Name → callable mapping, optionally layered over a parent table.
///
/// Lookups try this layer first, then the parent. A page-local table uses
/// this to add `link` on top of the shared builtins without copying them.
#[derive(Default)]
pub struct FunctionTable<'a> {
    entries: BTreeMap<String, Callable<'a>>,
    parent: Option<&'a FunctionTable<'a>>,
}

impl<'a> FunctionTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layered(parent: &'a FunctionTable<'a>) -> Self {
        Self {
            entries: BTreeMap::new(),
            parent: Some(parent),
        }
    }

    /// Register `function` under `name`, shadowing any existing entry.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&KwArgs) -> Result<Fragment, CallError> + 'a,
    {
        self.entries.insert(name.into(), Box::new(function));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Callable<'a>> {
        self.entries
            .get(name)
            .or_else(|| self.parent.and_then(|parent| parent.get(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All visible names, sorted and deduplicated.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        if let Some(parent) = self.parent {
            names.extend(parent.names());
        }
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl fmt::Debug for FunctionTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("names", &self.names())
            .finish()
    }
}

// ============================================================================
// Markers
// ============================================================================

#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("markers must not be empty")]
    Empty,

    #[error("start and end markers must differ, both are `{0}`")]
    Identical(String),

    #[error("invalid marker pattern")]
    Pattern(#[from] regex::Error),
}

/// Start/end delimiters of a fun-dsl span.
#[derive(Debug, Clone)]
pub struct Markers {
    start: String,
    end: String,
    pattern: Regex,
}

impl Markers {
    pub fn new(start: &str, end: &str) -> Result<Self, MarkerError> {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return Err(MarkerError::Empty);
        }
        if start == end {
            return Err(MarkerError::Identical(start.to_owned()));
        }
        let pattern = Regex::new(&span_pattern(start, end))?;
        Ok(Self {
            start: start.to_owned(),
            end: end.to_owned(),
            pattern,
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

impl Default for Markers {
    fn default() -> Self {
        static DEFAULT: LazyLock<Markers> = LazyLock::new(|| Markers {
            start: DEFAULT_START.to_owned(),
            end: DEFAULT_END.to_owned(),
            pattern: Regex::new(&span_pattern(DEFAULT_START, DEFAULT_END)).unwrap(),
        });
        DEFAULT.clone()
    }
}

/// Non-greedy, dot-matches-newline span between two literal markers.
fn span_pattern(start: &str, end: &str) -> String {
    format!(
        r"(?s){}\s*(.*?)\s*{}",
        regex::escape(start),
        regex::escape(end)
    )
}

// ============================================================================
// Results
// ============================================================================

/// A dispatched span and the placeholder that stands in for it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedSegment {
    pub result: Fragment,
    /// The span as written, markers included.
    pub original_text: String,
    pub placeholder: String,
}

/// Failure of one marked span.
#[derive(Debug, Error)]
#[error("in `{segment}`: {error}")]
pub struct SegmentError {
    #[source]
    pub error: DslError,
    /// Call source between the markers.
    pub segment: String,
}

/// Every segment failure of one preprocessing pass.
#[derive(Debug, Error)]
pub struct PreprocessError {
    pub errors: Vec<SegmentError>,
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fun-dsl segment(s) failed", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

/// Output of [`Preprocessor::process`].
#[derive(Debug, Default)]
pub struct Preprocessed {
    /// Template with every successful span replaced by `{{placeholder}}`.
    pub text: String,
    pub segments: Vec<EvaluatedSegment>,
    pub errors: Vec<SegmentError>,
}

impl Preprocessed {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail with every collected error if any span failed.
    pub fn into_result(self) -> Result<Self, PreprocessError> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(PreprocessError {
                errors: self.errors,
            })
        }
    }

    /// Placeholder name → rendered markup.
    pub fn placeholder_vars(&self) -> BTreeMap<String, String> {
        self.segments
            .iter()
            .map(|s| (s.placeholder.clone(), s.result.markup.clone()))
            .collect()
    }

    /// Resources of every segment, in span order.
    pub fn resources(&self) -> Vec<String> {
        self.segments
            .iter()
            .flat_map(|s| s.result.resources.iter().cloned())
            .collect()
    }
}

// ============================================================================
// Preprocessor
// ============================================================================

pub struct Preprocessor<'t> {
    functions: &'t FunctionTable<'t>,
    context: &'t Context,
    markers: Markers,
}

impl<'t> Preprocessor<'t> {
    pub fn new(functions: &'t FunctionTable<'t>, context: &'t Context) -> Self {
        Self {
            functions,
            context,
            markers: Markers::default(),
        }
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn process(&self, template: &str) -> Preprocessed {
        let mut out = Preprocessed {
            text: String::with_capacity(template.len()),
            ..Default::default()
        };
        let mut last = 0;

        for caps in self.markers.pattern.captures_iter(template) {
            let (Some(span), Some(source)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.text.push_str(&template[last..span.start()]);
            last = span.end();

            match self.dispatch(source.as_str()) {
                Ok(result) => {
                    let placeholder = new_placeholder();
                    out.text.push_str("{{");
                    out.text.push_str(&placeholder);
                    out.text.push_str("}}");
                    out.segments.push(EvaluatedSegment {
                        result,
                        original_text: span.as_str().to_owned(),
                        placeholder,
                    });
                }
                Err(error) => {
                    out.text.push_str(span.as_str());
                    out.errors.push(SegmentError {
                        error,
                        segment: source.as_str().to_owned(),
                    });
                }
            }
        }

        out.text.push_str(&template[last..]);
        out
    }

    fn dispatch(&self, source: &str) -> Result<Fragment, DslError> {
        let call = Call::from_source(source, self.context)?;
        let function = self
            .functions
            .get(&call.function_name)
            .ok_or_else(|| DslError::FunctionNotFound(call.function_name.clone()))?;
        function(&call.parameters).map_err(|source| DslError::Evaluation {
            function: call.function_name,
            source,
        })
    }
}

fn new_placeholder() -> String {
    format!("{PLACEHOLDER_PREFIX}{}", uuid::Uuid::new_v4().simple())
}
