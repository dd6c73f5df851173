use serde::{Deserialize, Serialize};

/// The account record kept in the user directory. Upserted wholesale;
/// there is no partial-update path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
}

impl User {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}
