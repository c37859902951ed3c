//! Normalising the model's reply text into an [`Analysis`].

use relsync_core::analysis::Analysis;

/// Remove Markdown code-fence markers anywhere in `text`.
///
/// An opening ```` ```json ```` marker takes one following newline with it; a
/// bare ```` ``` ```` marker takes one preceding newline.
pub fn strip_code_fences(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut rest = text;

  while !rest.is_empty() {
    if let Some(after) = rest.strip_prefix("```json") {
      rest = after.strip_prefix('\n').unwrap_or(after);
    } else if let Some(after) = rest
      .strip_prefix("\n```")
      .filter(|after| !after.starts_with("json"))
    {
      rest = after;
    } else if let Some(after) = rest.strip_prefix("```") {
      rest = after;
    } else {
      let mut chars = rest.chars();
      if let Some(ch) = chars.next() {
        out.push(ch);
      }
      rest = chars.as_str();
    }
  }

  out
}

/// Parse the model's reply. A JSON object with all five keys (optionally
/// fenced) is returned as-is; anything else degrades to
/// [`Analysis::from_unstructured`] over the raw text.
pub fn parse_reply(raw: &str) -> Analysis {
  let cleaned = strip_code_fences(raw);
  match serde_json::from_str::<Analysis>(cleaned.trim()) {
    Ok(analysis) => analysis,
    Err(e) => {
      tracing::debug!(error = %e, "model reply is not structured JSON");
      Analysis::from_unstructured(raw)
    }
  }
}
