use serde::{Deserialize, Serialize};

/// Claims carried by a staff bearer token. Token issuance lives in the
/// identity service that fronts this API; this backend only verifies.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub resort_id: String,
    pub role: String,
    pub exp: usize,
}
