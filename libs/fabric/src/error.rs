use fanout_core::Status;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("{0} timeout exceeded")]
    Timeout(&'static str),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Remote error: {0}")]
    Status(Status),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Convert into a wire status, keeping remote statuses as they are
    pub fn into_status(self) -> Status {
        match self {
            Error::Status(status) => status,
            Error::Timeout(_) => Status::new(fanout_core::Code::DeadlineExceeded, self.to_string()),
            Error::Io(_) | Error::ConnectionClosed | Error::Credentials(_) => {
                Status::unavailable(self.to_string())
            }
            Error::Codec(_) | Error::InvalidFrame(_) | Error::Custom(_) => {
                Status::internal(self.to_string())
            }
        }
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::Status(status)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
