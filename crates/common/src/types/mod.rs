use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Query string accepted by every list endpoint.
///
/// `page` stays textual on purpose: garbage input must reach the paginator
/// and fall back to the first page instead of failing extraction.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}
