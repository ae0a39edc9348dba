use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperationType {
    Put,
    Get,
    Delete,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Put => "put",
            OperationType::Get => "get",
            OperationType::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Put => write!(f, "PutOperation"),
            OperationType::Get => write!(f, "GetOperation"),
            OperationType::Delete => write!(f, "DeleteOperation"),
        }
    }
}
