use serde::Deserialize;

pub const PLACEHOLDER_COMMENT_ID: &str = "123456";
pub const PLACEHOLDER_TIMESTAMP: &str = "2022-10-02T08:12:17.961+0200";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentAuthor {
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    pub created: String,
    pub updated: String,
    #[serde(default)]
    pub author: Option<CommentAuthor>,
    #[serde(rename = "updateAuthor", default)]
    pub update_author: Option<CommentAuthor>,
}

impl Comment {
    /// Stand-in returned when dry-run mode suppresses or cannot find a comment.
    pub fn placeholder(body: impl Into<String>) -> Self {
        Self {
            id: PLACEHOLDER_COMMENT_ID.to_string(),
            body: body.into(),
            created: PLACEHOLDER_TIMESTAMP.to_string(),
            updated: PLACEHOLDER_TIMESTAMP.to_string(),
            author: None,
            update_author: None,
        }
    }
}
