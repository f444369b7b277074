use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Malformed {record} record: {source}")]
    Malformed {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Revision not found: {0}")]
    RevisionNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}
