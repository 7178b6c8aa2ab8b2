mod reservation;

use crate::domain::{booking::IntervalError, DataAccessError};

pub use self::reservation::*;

impl From<std::io::Error> for DataAccessError {
    fn from(value: std::io::Error) -> Self {
        DataAccessError::ReadError(Box::new(value))
    }
}

impl From<serde_json::Error> for DataAccessError {
    fn from(value: serde_json::Error) -> Self {
        DataAccessError::DecodeError(Box::new(value))
    }
}

impl From<IntervalError> for DataAccessError {
    fn from(value: IntervalError) -> Self {
        DataAccessError::DecodeError(Box::new(value))
    }
}
