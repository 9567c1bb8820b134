// src/metrics/extract.rs
use crate::llm::TextModel;
use crate::metrics::parse::{coerce_payload, parse_model_reply};
use crate::metrics::payload::MetricPayload;
use crate::metrics::prompt::build_extraction_prompt;
use crate::rag::Chunk;
use crate::utils::error::FilingError;

/// Metric extraction engine: prompt assembly, one model invocation, and
/// parse/coerce of the reply into the canonical payload.
pub struct MetricExtractor<M: TextModel> {
    model: M,
}

impl<M: TextModel> MetricExtractor<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Runs extraction over the retrieved chunks for one filing. The hosted
    /// model is invoked exactly once; there is no re-querying or multi-turn
    /// refinement.
    pub async fn extract(
        &self,
        chunks: &[&Chunk],
        form_type: &str,
    ) -> Result<MetricPayload, FilingError> {
        let prompt = build_extraction_prompt(chunks, form_type);
        tracing::info!(
            "Invoking model over {} chunks ({} prompt characters)",
            chunks.len(),
            prompt.len()
        );

        let reply = self.model.generate(&prompt).await?;
        tracing::debug!("Model replied with {} characters", reply.len());

        let value = parse_model_reply(&reply)?;
        Ok(coerce_payload(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::schema::NOT_FOUND;
    use crate::utils::error::ModelError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic in-memory model returning a canned reply.
    struct MockModel {
        reply: String,
        calls: AtomicUsize,
    }

    impl MockModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextModel for MockModel {
        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            offset: 0,
        }
    }

    #[tokio::test]
    async fn test_extract_invokes_model_exactly_once() {
        let model = MockModel::new(r#"{"quarter": "Q2"}"#);
        let extractor = MetricExtractor::new(model);
        let c = chunk("Oil production was 148.4 MBbl/d");

        let payload = extractor.extract(&[&c], "10-Q").await.unwrap();
        assert_eq!(payload.quarter, "Q2");
        assert_eq!(extractor.model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_extract_recovers_prose_wrapped_reply() {
        let model = MockModel::new(
            "Here is the JSON: {\"production\": {\"oil_production_mbbl_per_day\": \"148.4 MBbl/d\"}} Thanks!",
        );
        let extractor = MetricExtractor::new(model);
        let c = chunk("context");

        let payload = extractor.extract(&[&c], "10-Q").await.unwrap();
        assert_eq!(
            payload.field("production", "oil_production_mbbl_per_day"),
            "148.4 MBbl/d"
        );
    }

    #[tokio::test]
    async fn test_extract_backfills_missing_activity_category() {
        let model =
            MockModel::new(r#"{"revenue": {"total_revenue": "$3,869 million"}}"#);
        let extractor = MetricExtractor::new(model);
        let c = chunk("context");

        let payload = extractor.extract(&[&c], "10-K").await.unwrap();
        assert_eq!(payload.field("revenue", "total_revenue"), "$3,869 million");
        for field in crate::metrics::schema::ACTIVITY_FIELDS {
            assert_eq!(payload.field("activity", field.key), NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_unrecoverable_reply_surfaces_parse_error() {
        let raw = "No structured data could be produced for this filing.";
        let model = MockModel::new(raw);
        let extractor = MetricExtractor::new(model);
        let c = chunk("context");

        let err = extractor.extract(&[&c], "10-Q").await.unwrap_err();
        match err {
            FilingError::Parse(parse_err) => assert_eq!(parse_err.raw_reply, raw),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
