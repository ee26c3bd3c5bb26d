// Stage 1: résumé + role → structured Evaluation.
// The model call goes through llm_client; parsing never trusts the model.

pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
