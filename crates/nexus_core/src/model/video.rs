use super::{Collection, Record};
use serde::{Deserialize, Serialize};

/// Video entry shown on the videos page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl Video {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
        }
    }
}

impl Record for Video {
    const COLLECTION: Collection = Collection::Videos;

    fn key(&self) -> &str {
        &self.id
    }
}
