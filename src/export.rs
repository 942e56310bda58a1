//! Export shapes for scored records.
//!
//! Two sinks: pretty JSON of the full [`ScoredRecord`] and a row-per-record
//! CSV whose column names are the reporting contract. Serde renames carry
//! the header text, so the CSV writer emits it without hand-rolled header
//! rows.

use std::io::Write;

use serde::Serialize;

use crate::error::{ExportError, ExportResult};
use crate::record::ScoredRecord;
use crate::score::ConfidenceBreakdown;

/// One flattened report row.
#[derive(Debug, Clone, Serialize)]
pub struct RecordExport {
    /// Display form; follow-ups carry the `Duplicate/Follow-up` marker.
    #[serde(rename = "SR Number")]
    pub sr_number: String,
    #[serde(rename = "Request Type")]
    pub request_type: String,
    #[serde(rename = "Sub Request Type")]
    pub sub_request_type: String,
    /// Comma-joined into a single cell.
    #[serde(rename = "Key Attributes")]
    pub key_attributes: String,
    #[serde(rename = "Main Intent")]
    pub main_intent: String,
    /// The locally computed score, never the model's.
    #[serde(rename = "Confidence Score")]
    pub confidence_score: f32,
    /// Model explanation when present, else the local term breakdown.
    #[serde(rename = "Confidence Explanation")]
    pub confidence_explanation: String,
}

impl RecordExport {
    pub fn from_scored(scored: &ScoredRecord, breakdown: &ConfidenceBreakdown) -> Self {
        let confidence_explanation = if scored.record.confidence_explanation.is_empty() {
            breakdown.reasoning.clone()
        } else {
            scored.record.confidence_explanation.clone()
        };
        Self {
            sr_number: scored.sr.display_label(),
            request_type: scored.record.request_type.clone(),
            sub_request_type: scored.record.sub_request_type.clone(),
            key_attributes: scored.record.key_attributes_joined(),
            main_intent: scored.record.main_intent.clone(),
            confidence_score: scored.confidence_score,
            confidence_explanation,
        }
    }
}

/// Serialize rows as CSV with a header row, into any writer.
pub fn write_csv<W: Write>(writer: W, rows: &[RecordExport]) -> ExportResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|source| ExportError::Csv { source })?;
    }
    csv_writer
        .flush()
        .map_err(|source| ExportError::Io { source })?;
    Ok(())
}

/// The full scored record as pretty-printed JSON.
pub fn to_json_pretty(scored: &ScoredRecord) -> ExportResult<String> {
    serde_json::to_string_pretty(scored).map_err(|source| ExportError::Json { source })
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ClassificationRecord;
    use crate::score::{confidence, ConfidenceProfile};
    use crate::srnum::SrIdentifier;

    fn scored_fixture(explanation: &str) -> (ScoredRecord, ConfidenceBreakdown) {
        let record = ClassificationRecord {
            request_type: "Fee Payment".to_string(),
            sub_request_type: "Ongoing Fee".to_string(),
            key_attributes: vec!["Deal Name: Apollo".to_string(), "Amount: $5,000".to_string()],
            main_intent: "Pay the ongoing fee for Apollo.".to_string(),
            confidence_explanation: explanation.to_string(),
        };
        let breakdown = confidence(&record, &ConfidenceProfile::strict());
        let scored = ScoredRecord {
            confidence_score: breakdown.score,
            record,
            sr: SrIdentifier::Followup {
                id: "SR-12032025-1430-AB12CD".to_string(),
            },
        };
        (scored, breakdown)
    }

    #[test]
    fn csv_carries_the_reporting_columns() {
        let (scored, breakdown) = scored_fixture("model was sure");
        let row = RecordExport::from_scored(&scored, &breakdown);

        let mut buf = Vec::new();
        write_csv(&mut buf, &[row]).unwrap();
        let written = String::from_utf8(buf).unwrap();

        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "SR Number,Request Type,Sub Request Type,Key Attributes,Main Intent,Confidence Score,Confidence Explanation"
        );
        let data = lines.next().unwrap();
        assert!(data.starts_with("Duplicate/Follow-up - SR-12032025-1430-AB12CD,"));
        assert!(data.contains("Fee Payment"));
        assert!(data.contains("\"Deal Name: Apollo, Amount: $5,000\""));
    }

    #[test]
    fn empty_model_explanation_falls_back_to_breakdown() {
        let (scored, breakdown) = scored_fixture("");
        let row = RecordExport::from_scored(&scored, &breakdown);
        assert_eq!(row.confidence_explanation, breakdown.reasoning);

        let (scored, breakdown) = scored_fixture("model was sure");
        let row = RecordExport::from_scored(&scored, &breakdown);
        assert_eq!(row.confidence_explanation, "model was sure");
    }

    #[test]
    fn json_export_is_the_full_scored_record() {
        let (scored, _) = scored_fixture("model was sure");
        let json = to_json_pretty(&scored).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["request_type"], "Fee Payment");
        assert_eq!(value["sr"]["kind"], "followup");
        assert_eq!(value["confidence_explanation"], "model was sure");
    }
}
