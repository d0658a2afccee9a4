use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("EDL input is not valid UTF-8 (first invalid byte at offset {offset})")]
    Encoding { offset: usize },

    #[error("Table parse error at line {line}: {message}")]
    TableParse { line: usize, message: String },

    #[error("Previous table is missing the '{column}' column")]
    MissingColumn { column: String },

    #[error("Invalid parser configuration: {message}")]
    InvalidConfig { message: String },

    #[error(transparent)]
    Timecode(#[from] vfxpull_timecode::TimecodeError),

    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
