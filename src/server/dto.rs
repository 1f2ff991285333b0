use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
