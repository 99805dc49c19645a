use serde::{Deserialize, Serialize};

/// One displayable project and its optional embeddable target.
///
/// Field names follow the catalog JSON (`hasEmbed`, `embedUrl`, ...), which
/// is a plain array of these records.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub has_embed: bool,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub embed_type: Option<String>,
}

impl ProjectRecord {
    /// The loadable embed URL, present only when the record is embeddable
    /// and actually carries a non-empty URL.
    pub fn embed_target(&self) -> Option<&str> {
        if !self.has_embed {
            return None;
        }
        self.embed_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Parse the catalog JSON (an array of records).
pub fn parse_catalog(text: &str) -> Result<Vec<ProjectRecord>, serde_json::Error> {
    serde_json::from_str(text)
}

/// Look a record up by its stable id.
pub fn find<'a>(records: &'a [ProjectRecord], id: &str) -> Option<&'a ProjectRecord> {
    records.iter().find(|r| r.id == id)
}
