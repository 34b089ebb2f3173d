//! Prompt templates for every model call site. Untrusted content is
//! sanitized before it is embedded.

use super::sanitize::sanitize_for_llm;

pub fn build_fraud_prompt(document_text: &str) -> String {
    format!(
        r#"You are an analyst trained to review visa-related documents for fraud.
Assess whether the document is authentic or potentially fraudulent.

1. Document integrity checks
   - Compare the extracted text with the structure of official templates.
   - Check that required sections (signatures, official seals, dates) are present.
   - Check that the document follows a standard structure.

2. Fraud indicators (report only with strong evidence)
   - Manipulated or missing official seals and stamps.
   - Inconsistent structure or formatting.
   - Mismatched details (for example employer name vs. company registry).
   - Irregular transactions in financial statements.
   - Forged supporting letters.
   - Altered or missing signatures on legal documents.

Return ONLY a JSON object, without markdown formatting:
{{
  "fraudDetected": true or false,
  "confidence": 0-100,
  "fraudReasons": ["..."],
  "missingFields": ["Signature", "Official Stamp"],
  "recommendations": "..."
}}

Extracted document text:
"""
{}
""""#,
        sanitize_for_llm(document_text)
    )
}

pub fn build_classification_prompt(document_text: &str) -> String {
    format!(
        r#"You classify visa-related documents. Determine the exact document type from the text below.

Examples of possible document types:
- Passport
- Visa Application Form
- Proof of Funds
- Employment Letter
- Bank Statement
- Travel Itinerary
- Invitation Letter
- Supporting Affidavit
- Other visa-related document (if none of the above match exactly)

If the document does not clearly fit a listed type, infer the most accurate type from its content.

Document text:
"""
{}
"""

Return ONLY a JSON object, without markdown formatting:
{{
  "predictedType": "Detected Document Type",
  "confidence": 0-100,
  "summary": "Short explanation of why this classification was chosen."
}}"#,
        sanitize_for_llm(document_text)
    )
}

pub fn build_requirements_prompt(visa_category: &str) -> String {
    let category = sanitize_for_llm(visa_category);
    format!(
        r#"You are an immigration expert. List the documents an applicant must provide for the visa type below.

Visa type: {category}

Return ONLY a JSON object, without markdown formatting:
{{
  "visaType": "{category}",
  "requiredDocuments": ["..."]
}}"#
    )
}

pub fn build_generation_prompt(
    visa_category: &str,
    required_documents: &[String],
    answers: &serde_json::Value,
    reference_uploads: &[String],
) -> String {
    let required = required_documents
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{}. {}", i + 1, sanitize_for_llm(d)))
        .collect::<Vec<_>>()
        .join("\n");

    let answers_json = serde_json::to_string_pretty(answers).unwrap_or_else(|_| "{}".into());

    let uploads = if reference_uploads.is_empty() {
        "No reference documents were uploaded.".to_string()
    } else {
        let listed = reference_uploads
            .iter()
            .map(|u| format!("- {}", sanitize_for_llm(u)))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Reference documents uploaded by the applicant:\n{listed}")
    };

    format!(
        r#"You prepare visa application documents.
Produce every document on the requirement list that the APPLICANT must write personally.

Do NOT produce documents that must come from an institution (passports, bank statements,
police certificates, university or employer letters).
ONLY produce documents the applicant writes or explains (statement of purpose, personal
explanation, study plan, travel history, cover letter).

Visa type: {category}

Required documents:
{required}

Applicant details:
{answers}

{uploads}

Rules:
- Formal structure with headings, salutations and full paragraphs.
- Professional tone that follows official visa guidelines.
- Realistic, complete content based on the applicant details.

Return ONLY a JSON array, with no text before or after it:
[
  {{
    "documentType": "Statement of Purpose",
    "format": "Letter",
    "pageCount": 2,
    "content": "Full document text..."
  }}
]"#,
        category = sanitize_for_llm(visa_category),
        answers = sanitize_for_llm(&answers_json),
    )
}

pub fn build_recommendation_prompt(answers: &serde_json::Value) -> String {
    let answers_json = serde_json::to_string_pretty(answers).unwrap_or_else(|_| "{}".into());
    format!(
        r#"You are a visa assistant. From the applicant responses below, determine the most suitable visa type without relying on a predefined list.

Applicant responses:
{}

- Consider purpose of travel, financial situation, employment status and other relevant details.
- Choose the best visa category under standard immigration policy.
- If nothing matches exactly, suggest the most relevant alternative.
- Give a confidence score (0-100) for how well the responses fit.

Return ONLY a JSON object, without markdown formatting:
{{
  "bestVisaType": "Visa Type",
  "confidence": 0-100,
  "reasoning": "Why this visa type is the best match."
}}"#,
        sanitize_for_llm(&answers_json)
    )
}
