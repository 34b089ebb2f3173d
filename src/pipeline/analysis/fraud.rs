use serde::{Deserialize, Deserializer, Serialize};

use crate::pipeline::llm::{parse_object, prompt, LlmClient};

/// Lowest fraud gate a deployment may configure.
pub const MIN_FRAUD_THRESHOLD: u8 = 85;

pub const NO_ANALYSIS_RECOMMENDATION: &str = "No analysis available.";

/// Fraud verdict as returned by the model, after confidence normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FraudAnalysis {
    pub fraud_detected: bool,
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
    #[serde(default)]
    pub fraud_reasons: Vec<String>,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub recommendations: String,
}

impl FraudAnalysis {
    /// Safe default used when the model call or its parse fails.
    pub fn unavailable() -> Self {
        Self {
            fraud_detected: false,
            confidence: 0,
            fraud_reasons: vec![],
            missing_fields: vec![],
            recommendations: NO_ANALYSIS_RECOMMENDATION.to_string(),
        }
    }
}

/// Accept a number or numeric string; clamp to 0-100 and round.
pub(crate) fn deserialize_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(serde::de::Error::custom)?,
    };
    if value.is_nan() {
        return Ok(0);
    }
    Ok(value.clamp(0.0, 100.0).round() as u8)
}

/// Deterministic override of the model's verdict: a fraud call below the
/// threshold is withdrawn and its reasons cleared.
pub fn apply_confidence_gate(mut analysis: FraudAnalysis, threshold: u8) -> FraudAnalysis {
    let threshold = threshold.max(MIN_FRAUD_THRESHOLD);
    if analysis.fraud_detected && analysis.confidence < threshold {
        tracing::info!(
            confidence = analysis.confidence,
            threshold,
            "Fraud confidence below gate, overriding verdict"
        );
        analysis.fraud_detected = false;
        analysis.fraud_reasons.clear();
    }
    analysis
}

/// Ask the model for a fraud verdict. Never fails: any call or parse error
/// degrades to [`FraudAnalysis::unavailable`].
pub async fn run_fraud_analysis(llm: &dyn LlmClient, text: &str, threshold: u8) -> FraudAnalysis {
    let reply = match llm.generate(&prompt::build_fraud_prompt(text)).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(model = llm.model_name(), error = %e, "Fraud analysis call failed, using default");
            return FraudAnalysis::unavailable();
        }
    };

    match parse_object::<FraudAnalysis>(&reply) {
        Ok(analysis) => apply_confidence_gate(analysis, threshold),
        Err(e) => {
            tracing::warn!(error = %e, "Fraud analysis reply unparseable, using default");
            FraudAnalysis::unavailable()
        }
    }
}
