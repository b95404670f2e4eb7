use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("no project found at {0}")]
    ProjectNotFound(String),

    #[error("project could not be parsed: {0}")]
    MalformedProject(String),

    #[error("graph error: {0}")]
    Graph(#[from] pbx_graph::GraphError),

    #[error("cross-reference error: {0}")]
    Xref(#[from] pbx_xref::XrefError),

    #[error("merge error: {0}")]
    Merge(#[from] pbx_merge::MergeError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
