//! Document verification: compare an uploaded report against a reference
//! with a text model and read back a one-word verdict.
//!
//! Text extraction from PDFs happens upstream; this module only sees text.

use std::fmt;
use std::sync::Arc;

use greenlens_core::{Collaborator, LensError, LensResult, TextModel};
use tracing::info;

/// Build the comparison instruction for the two documents.
pub fn comparison_prompt(reference: &str, uploaded: &str) -> String {
    format!(
        "Compare the following two solar project reports and determine if the uploaded \
document is legitimate or not.\n\n\
**Reference Document (Correct)**:\n{reference}\n\n\
**Uploaded Document**:\n{uploaded}\n\n\
Examine the uploaded document based on the following verification parameters: technical \
feasibility, financial viability, regulatory compliance, energy generation estimates, and \
project transparency. Provide a final verdict as 'LEGITIMATE' or 'NOT LEGITIMATE' without \
any extra text."
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Legitimate,
    NotLegitimate,
    /// The model answered outside the two allowed words; kept upper-cased.
    Unrecognized(String),
}

impl Verdict {
    /// Normalize a model reply: trim, upper-case, drop wrapping quotes,
    /// emphasis and a trailing period.
    pub fn parse(reply: &str) -> Self {
        let normalized = reply.trim().to_uppercase();
        let word = normalized
            .trim_matches(|c: char| matches!(c, '*' | '"' | '\'' | '`' | '.') || c.is_whitespace());
        match word {
            "NOT LEGITIMATE" => Verdict::NotLegitimate,
            "LEGITIMATE" => Verdict::Legitimate,
            _ => Verdict::Unrecognized(normalized),
        }
    }

    pub fn is_legitimate(&self) -> bool {
        matches!(self, Verdict::Legitimate)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Legitimate => f.write_str("LEGITIMATE"),
            Verdict::NotLegitimate => f.write_str("NOT LEGITIMATE"),
            Verdict::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

pub struct DocumentVerifier {
    model: Arc<dyn TextModel>,
}

impl DocumentVerifier {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub async fn verify(&self, reference: &str, uploaded: &str) -> LensResult<Verdict> {
        if uploaded.trim().is_empty() {
            return Err(LensError::invalid("Uploaded document has no extractable text"));
        }
        let prompt = comparison_prompt(reference, uploaded);
        let reply = self
            .model
            .generate(&prompt)
            .await
            .map_err(|e| LensError::collaborator(Collaborator::Text, e))?;
        let verdict = Verdict::parse(&reply);
        info!(model = self.model.name(), %verdict, "Document verified");
        Ok(verdict)
    }
}
