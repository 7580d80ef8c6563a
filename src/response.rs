use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub reason: String,
}

impl ErrorBody {
    pub fn new(reason: impl Into<String>) -> Self {
        ErrorBody { reason: reason.into() }
    }
}
