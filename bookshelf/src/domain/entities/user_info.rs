use serde::{Deserialize, Serialize};

/// Identity of the logged in user, as given by the userinfo endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}
