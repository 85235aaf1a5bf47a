#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("Similarity matching unavailable: {0}")]
    MatchingUnavailable(String),

    #[error("Stage '{stage}' received non-conforming model output: {detail}")]
    ParseError { stage: String, detail: String },

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Unsupported transcript format '{0}': expected .txt, .md or .vtt")]
    UnsupportedTranscriptFormat(String),

    #[error("Recipient directory unreadable at '{path}': {detail}")]
    RecipientDirectory { path: String, detail: String },
}
