use std::io::Write;

use thiserror::Error;

use crate::answers::Submission;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write submission: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives finished submissions. Transport and persistence live behind it.
pub trait SubmissionSink {
    fn deliver(&mut self, form_id: &str, submission: &Submission) -> Result<(), SinkError>;
}

/// Keeps submissions in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub delivered: Vec<(String, Submission)>,
}

impl SubmissionSink for MemorySink {
    fn deliver(&mut self, form_id: &str, submission: &Submission) -> Result<(), SinkError> {
        self.delivered
            .push((form_id.to_string(), submission.clone()));
        Ok(())
    }
}

/// Writes one JSON object per line: `{"form_id": .., "submission": ..}`.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SubmissionSink for JsonLinesSink<W> {
    fn deliver(&mut self, form_id: &str, submission: &Submission) -> Result<(), SinkError> {
        let line = serde_json::json!({
            "form_id": form_id,
            "submission": submission,
        });
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
