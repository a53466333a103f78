//! Text-level helpers for pulling JSON out of free-form model output.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Summary used when nothing readable is left after stripping fences.
pub const FALLBACK_SUMMARY: &str = "추천 정보를 구성하는 중 오류가 발생했습니다.";

static FENCED_JSON: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?i:json)\s*(.*?)\s*```").ok());

static FENCE_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"```[A-Za-z]*").ok());

/// A JSON candidate found in free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSpan<'a> {
    /// Byte range of the whole candidate in the source text, fences included.
    pub span: Range<usize>,
    /// What should be handed to the JSON parser.
    pub body: &'a str,
}

/// First ```json fenced block. `None` if there is no closed block.
pub fn fenced_json_block(text: &str) -> Option<JsonSpan<'_>> {
    let cap = FENCED_JSON.as_ref()?.captures(text)?;
    let whole = cap.get(0)?;
    let body = cap.get(1)?;
    Some(JsonSpan {
        span: whole.range(),
        body: body.as_str().trim(),
    })
}

/// Slice between the first `{` and the last `}` (inclusive).
///
/// Only an outermost-brace heuristic; the caller still has to parse it.
pub fn bare_json_object(text: &str) -> Option<JsonSpan<'_>> {
    let start = text.find('{')?;
    let end = text.rfind('}')? + 1;
    (start < end).then(|| JsonSpan {
        span: start..end,
        body: &text[start..end],
    })
}

/// Readable summary from text whose JSON could not be used.
///
/// Prefers the prose before the first code fence; if that is empty, the whole
/// text with fence markers removed; if still empty, [`FALLBACK_SUMMARY`].
pub fn plain_summary(text: &str) -> String {
    let before_fence = text.split("```").next().unwrap_or_default().trim();
    if !before_fence.is_empty() {
        return before_fence.to_string();
    }

    let stripped = match FENCE_MARKER.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.replace("```", ""),
    };
    let stripped = stripped.trim();
    if stripped.is_empty() {
        FALLBACK_SUMMARY.to_string()
    } else {
        stripped.to_string()
    }
}

/// Summary from the text around an unusable JSON span: the prose before it,
/// else the prose after it, else [`FALLBACK_SUMMARY`].
pub fn summary_outside(text: &str, span: Range<usize>) -> String {
    let before = text.get(..span.start).unwrap_or_default().trim();
    if !before.is_empty() {
        return plain_summary(before);
    }
    plain_summary(text.get(span.end..).unwrap_or_default())
}
