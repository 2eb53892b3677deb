use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid method name: {0}")]
    InvalidMethodName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
