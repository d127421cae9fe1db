use thiserror::Error;

pub type PageResult<T> = Result<T, PageError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PageError {
    #[error("no element matches selector `{selector}`")]
    MissingElement { selector: String },

    #[error("attribute `{name}` has non-numeric value `{value}`")]
    MalformedAttribute { name: String, value: String },

    #[error("chart renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("host unavailable: {0}")]
    HostUnavailable(String),

    #[error("invalid content: {0}")]
    InvalidContent(String),

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("invalid root margin: {0}")]
    InvalidMargin(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),
}

impl PageError {
    pub(crate) fn missing(selector: impl Into<String>) -> Self {
        Self::MissingElement {
            selector: selector.into(),
        }
    }
}
