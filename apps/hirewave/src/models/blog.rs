use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    pub excerpt: Option<String>,
    /// Either a display name or a nested user object, depending on the endpoint.
    pub author: Option<Value>,
    pub category: Option<Value>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub featured: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl BlogPost {
    pub fn author_name(&self) -> Option<String> {
        display_name(self.author.as_ref()?)
    }

    pub fn category_name(&self) -> Option<String> {
        display_name(self.category.as_ref()?)
    }
}

fn display_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get("name") {
                return Some(name.clone());
            }
            let first = map.get("first_name").and_then(Value::as_str).unwrap_or("");
            let last = map.get("last_name").and_then(Value::as_str).unwrap_or("");
            let full = format!("{first} {last}").trim().to_string();
            if !full.is_empty() {
                return Some(full);
            }
            map.get("email").and_then(Value::as_str).map(str::to_string)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogComment {
    pub id: i64,
    pub post: i64,
    pub content: String,
    pub author: Option<Value>,
    #[serde(default)]
    pub is_approved: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl BlogComment {
    pub fn author_name(&self) -> Option<String> {
        display_name(self.author.as_ref()?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub post: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// The blog endpoints answer either with a bare array or a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Paged { results } => results,
            Listing::Plain(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_name_from_string_or_object() {
        let post: BlogPost = serde_json::from_str(
            r#"{"id": 1, "title": "Hello", "slug": "hello", "author": "Grace"}"#,
        )
        .unwrap();
        assert_eq!(post.author_name().as_deref(), Some("Grace"));

        let post: BlogPost = serde_json::from_str(
            r#"{"id": 1, "title": "Hello", "slug": "hello",
                "author": {"first_name": "Grace", "last_name": "Hopper"},
                "category": {"id": 2, "name": "Careers"}}"#,
        )
        .unwrap();
        assert_eq!(post.author_name().as_deref(), Some("Grace Hopper"));
        assert_eq!(post.category_name().as_deref(), Some("Careers"));
    }

    #[test]
    fn test_listing_accepts_both_shapes() {
        let plain: Listing<BlogCategory> =
            serde_json::from_str(r#"[{"id": 1, "name": "Tech"}]"#).unwrap();
        assert_eq!(plain.into_vec().len(), 1);

        let paged: Listing<BlogCategory> =
            serde_json::from_str(r#"{"count": 1, "results": [{"id": 1, "name": "Tech"}]}"#)
                .unwrap();
        assert_eq!(paged.into_vec()[0].name, "Tech");
    }
}
