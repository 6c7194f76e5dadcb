use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

const TITLE_WORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    Public,
    Personal,
}

/// One displayable image card. The client owns no persistence for these.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub image_url: String,
    pub prompt: String,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
}

impl GalleryItem {
    pub fn new(image_url: impl Into<String>, prompt: impl Into<String>, owner: Owner) -> Self {
        Self {
            image_url: image_url.into(),
            prompt: prompt.into(),
            owner,
            created_at: Utc::now(),
        }
    }

    pub fn title(&self) -> String {
        format_prompt_as_title(&self.prompt)
    }

    pub fn timestamp_label(&self) -> String {
        self.created_at.format("%b %-d, %I:%M %p").to_string()
    }
}

/// Image record as served by `GET /gallery` and `GET /user-images`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryImage {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(alias = "url")]
    pub image_url: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, deserialize_with = "timestamp_from_wire")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl GalleryImage {
    pub fn into_item(self, owner: Owner) -> GalleryItem {
        GalleryItem {
            image_url: self.image_url,
            prompt: self.prompt,
            owner,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Accepts RFC 3339 or an offset-less ISO timestamp read as UTC.
/// Anything else is dropped rather than failing the whole listing.
fn timestamp_from_wire<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let Some(raw) = raw.as_str() else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc()))
}

/// Shortens a prompt to its first five words
pub fn format_prompt_as_title(prompt: &str) -> String {
    let words: Vec<&str> = prompt.split_whitespace().collect();
    if words.len() <= TITLE_WORDS {
        return words.join(" ");
    }
    format!("{}...", words[..TITLE_WORDS].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_prompt_title_unchanged() {
        assert_eq!(format_prompt_as_title("a red fox in snow"), "a red fox in snow");
    }

    #[test]
    fn test_long_prompt_title_truncated() {
        assert_eq!(
            format_prompt_as_title("A beautiful sunset over mountains, digital art style"),
            "A beautiful sunset over mountains,..."
        );
    }

    #[test]
    fn test_gallery_image_accepts_url_alias() {
        let img: GalleryImage = serde_json::from_str(
            r#"{"id":3,"url":"https://cdn/a.png","prompt":"castle","created_at":"2025-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        let item = img.into_item(Owner::Personal);
        assert_eq!(item.image_url, "https://cdn/a.png");
        assert_eq!(item.owner, Owner::Personal);
        assert_eq!(item.timestamp_label(), "Mar 1, 10:00 AM");
    }

    #[test]
    fn test_naive_timestamp_read_as_utc() {
        let images: Vec<GalleryImage> = serde_json::from_str(
            r#"[{"image_url":"https://cdn/a.png","prompt":"a cat","created_at":"2025-03-01T10:00:00.123456"}]"#,
        )
        .unwrap();
        assert_eq!(images.len(), 1);
        let item = images[0].clone().into_item(Owner::Public);
        assert_eq!(item.timestamp_label(), "Mar 1, 10:00 AM");
    }

    #[test]
    fn test_unreadable_timestamp_keeps_image() {
        let images: Vec<GalleryImage> = serde_json::from_str(
            r#"[{"image_url":"https://cdn/a.png","created_at":"yesterday"},{"image_url":"https://cdn/b.png","created_at":null}]"#,
        )
        .unwrap();
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|image| image.created_at.is_none()));
    }
}
