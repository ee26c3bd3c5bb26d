// Stage 2: Evaluation → rewritten HTML résumé → PDF.
// Markup is validated here before any rendering service is called.

pub mod document;
pub mod handlers;
pub mod models;
pub mod prompts;
