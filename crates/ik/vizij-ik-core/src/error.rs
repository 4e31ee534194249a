use thiserror::Error;

/// Errors produced while building or solving an IK chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IkError {
    /// Not enough joints were available to build the configured chain.
    #[error("invalid chain: {required} joints required, only {available} available")]
    InvalidChain { required: usize, available: usize },
    #[error("invalid ik config: {0}")]
    InvalidConfig(String),
    /// A pose handed to the solver does not match the initialized chain.
    #[error("pose has {actual} joints, chain expects {expected}")]
    PoseLength { expected: usize, actual: usize },
    #[error("{what} contains a non-finite component")]
    NonFinite { what: &'static str },
}

pub type IkResult<T> = Result<T, IkError>;
