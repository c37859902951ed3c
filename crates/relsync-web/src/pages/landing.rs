//! `GET /`

use askama::Template;
use axum::response::Html;

use super::{PageError, Toast, render};

pub struct Feature {
  pub title:       &'static str,
  pub description: &'static str,
}

pub const FEATURES: [Feature; 4] = [
  Feature {
    title:       "Both Perspectives Matter",
    description: "Share your unique viewpoints and let AI provide balanced, empathetic analysis",
  },
  Feature {
    title:       "AI-Powered Insights",
    description: "Get unbiased analysis and practical solutions for better communication",
  },
  Feature {
    title:       "Track Growth Together",
    description: "Weekly and monthly reports show your relationship patterns and progress",
  },
  Feature {
    title:       "Private & Encrypted",
    description: "Your conversations are secure. We can't read your data - it's yours alone",
  },
];

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
  pub features: &'static [Feature],
  pub toast:    Option<Toast>,
}

pub async fn index() -> Result<Html<String>, PageError> {
  render(&IndexPage { features: &FEATURES, toast: None })
}
