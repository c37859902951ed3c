//! The five-part analysis returned for a situation, and the [`Analyzer`]
//! abstraction over whatever produces it.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::situation::SituationInput;

// ─── Analysis ────────────────────────────────────────────────────────────────

/// Structured commentary on a situation. Field names are the JSON keys the
/// language model is asked to produce and the analysis endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
  pub analysis:         String,
  pub verdict:          String,
  pub solution:         String,
  pub person1_insights: String,
  pub person2_insights: String,
}

pub const UNSTRUCTURED_VERDICT: &str = "Please review the full analysis above";
pub const UNSTRUCTURED_SOLUTION: &str = "See the recommendations in the analysis";
pub const UNSTRUCTURED_INSIGHTS: &str = "See analysis";

impl Analysis {
  /// Placeholder analysis built from the submission alone, used whenever the
  /// analyzer cannot be reached or fails.
  pub fn fallback(input: &SituationInput) -> Self {
    Self {
      analysis:         format!(
        "Analysis of \"{}\": This situation involves different perspectives \
         from both partners. Person 1 sees: \"{}\". Person 2 sees: \"{}\". \
         Both perspectives are valid and deserve understanding.",
        input.title, input.person1_pov, input.person2_pov,
      ),
      verdict:          "Both partners have valid concerns that need to be \
                         addressed with empathy and communication."
        .to_owned(),
      solution:         "Schedule a calm discussion to understand each other's \
                         perspectives. Focus on listening without judgment and \
                         finding common ground."
        .to_owned(),
      person1_insights: "Consider your partner's perspective and communicate \
                         your needs clearly."
        .to_owned(),
      person2_insights: "Share your feelings openly and try to understand your \
                         partner's concerns."
        .to_owned(),
    }
  }

  /// Wrap a model reply that could not be parsed as structured JSON. The raw
  /// text becomes the analysis; the other fields point back at it.
  pub fn from_unstructured(raw: &str) -> Self {
    Self {
      analysis:         raw.to_owned(),
      verdict:          UNSTRUCTURED_VERDICT.to_owned(),
      solution:         UNSTRUCTURED_SOLUTION.to_owned(),
      person1_insights: UNSTRUCTURED_INSIGHTS.to_owned(),
      person2_insights: UNSTRUCTURED_INSIGHTS.to_owned(),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Something that turns two perspectives into an [`Analysis`].
///
/// Implemented by `relsync-gateway` against a hosted chat-completion API.
/// Callers decide what to do on failure; the submission flow substitutes
/// [`Analysis::fallback`].
pub trait Analyzer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn analyze<'a>(
    &'a self,
    input: &'a SituationInput,
  ) -> impl Future<Output = Result<Analysis, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input() -> SituationInput {
    SituationInput {
      title:       "Weekend plans".into(),
      person1_pov: "I wanted to rest".into(),
      person2_pov: "I booked a hike".into(),
    }
  }

  #[test]
  fn fallback_echoes_all_three_inputs() {
    let a = Analysis::fallback(&input());
    assert!(a.analysis.starts_with("Analysis of \"Weekend plans\":"));
    assert!(a.analysis.contains("Person 1 sees: \"I wanted to rest\""));
    assert!(a.analysis.contains("Person 2 sees: \"I booked a hike\""));
    assert!(!a.verdict.is_empty());
    assert!(!a.solution.is_empty());
  }

  #[test]
  fn fallback_text_has_no_line_continuation_gaps() {
    let a = Analysis::fallback(&input());
    for field in [&a.analysis, &a.verdict, &a.solution, &a.person1_insights] {
      assert!(!field.contains("  "), "double space in {field:?}");
    }
  }

  #[test]
  fn unstructured_keeps_raw_text() {
    let a = Analysis::from_unstructured("just some prose");
    assert_eq!(a.analysis, "just some prose");
    assert_eq!(a.verdict, UNSTRUCTURED_VERDICT);
    assert_eq!(a.solution, UNSTRUCTURED_SOLUTION);
    assert_eq!(a.person1_insights, UNSTRUCTURED_INSIGHTS);
    assert_eq!(a.person2_insights, UNSTRUCTURED_INSIGHTS);
  }
}
