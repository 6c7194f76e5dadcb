use thiserror::Error;

/// Bad local input, rejected before anything goes over the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a prompt")]
    EmptyPrompt,
    #[error("A generation is already in progress")]
    GenerationInProgress,
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("Please select a package or plan first")]
    NothingSelected,
}
