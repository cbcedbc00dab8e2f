use serde::Deserialize;
use url::Url;

use crate::error::ModelError;
use crate::ids::ArtworkId;

/// Title shown for records that arrive without one.
pub const UNTITLED: &str = "Untitled";

/// Identifier as it appears on the wire: sometimes a number, sometimes text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(serde_json::Number),
    Text(String),
}

/// Image field as it appears on the wire.
///
/// Older records carry a single URL, newer ones a list, and some store the
/// list as a JSON-encoded string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawImageField {
    One(String),
    Many(Vec<String>),
}

impl RawImageField {
    /// First non-empty URL candidate.
    pub fn first(&self) -> Option<String> {
        match self {
            RawImageField::One(value) => {
                let value = value.trim();
                if value.starts_with('[') {
                    serde_json::from_str::<Vec<String>>(value)
                        .ok()
                        .and_then(|list| first_non_empty(&list))
                } else if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            RawImageField::Many(list) => first_non_empty(list),
        }
    }
}

fn first_non_empty(list: &[String]) -> Option<String> {
    list.iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Author as it appears on the wire: a bare name or a nested user object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAuthor {
    Name(String),
    User {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        username: Option<String>,
    },
}

impl RawAuthor {
    fn display_name(&self) -> Option<String> {
        let name = match self {
            RawAuthor::Name(name) => Some(name.as_str()),
            RawAuthor::User { name, username } => {
                name.as_deref().or(username.as_deref())
            }
        }?;
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Loose artwork payload exactly as the collaborator API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawArtwork {
    pub id: RawId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub main_image_url: Option<RawImageField>,
    #[serde(default)]
    pub author: Option<RawAuthor>,
}

/// Validated, read-only artwork record consumed by the scene engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkRef {
    pub id: ArtworkId,
    pub title: String,
    /// `None` when the record had no usable image; the scene synthesizes a
    /// texture for those.
    pub main_image_url: Option<Url>,
    pub author: Option<String>,
}

impl ArtworkRef {
    pub fn new(
        id: ArtworkId,
        title: impl Into<String>,
        main_image_url: Option<Url>,
        author: Option<String>,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            title.trim().to_string()
        };
        Self {
            id,
            title,
            main_image_url,
            author,
        }
    }

    pub fn try_from_raw(raw: RawArtwork) -> Result<Self, ModelError> {
        let id = match &raw.id {
            RawId::Number(number) => ArtworkId::parse(number.to_string())?,
            RawId::Text(text) => ArtworkId::parse(text)?,
        };

        let main_image_url = raw
            .main_image_url
            .as_ref()
            .and_then(RawImageField::first)
            .and_then(|candidate| match Url::parse(&candidate) {
                Ok(url) => Some(url),
                Err(err) => {
                    log::debug!(
                        "artwork {id}: discarding unusable image url {candidate:?}: {err}"
                    );
                    None
                }
            });

        let author = raw.author.as_ref().and_then(RawAuthor::display_name);

        Ok(Self::new(
            id,
            raw.title.unwrap_or_default(),
            main_image_url,
            author,
        ))
    }

    /// Route of the detail view for this artwork.
    pub fn detail_route(&self) -> String {
        format!("/art/{}", self.id)
    }

    /// Caption used on synthesized textures.
    pub fn caption(&self) -> String {
        match &self.author {
            Some(author) => format!("{} / {}", self.title, author),
            None => self.title.clone(),
        }
    }
}

impl TryFrom<RawArtwork> for ArtworkRef {
    type Error = ModelError;

    fn try_from(raw: RawArtwork) -> Result<Self, Self::Error> {
        Self::try_from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<ArtworkRef, ModelError> {
        let raw: RawArtwork = serde_json::from_str(json)?;
        ArtworkRef::try_from_raw(raw)
    }

    #[test]
    fn normalizes_numeric_id_and_nested_author() {
        let art = parse(
            r#"{"id": 7, "title": "  Dusk ", "main_image_url": "https://cdn.example/7.jpg",
                "author": {"username": "mira"}}"#,
        )
        .unwrap();
        assert_eq!(art.id.as_str(), "7");
        assert_eq!(art.title, "Dusk");
        assert_eq!(art.author.as_deref(), Some("mira"));
        assert_eq!(art.detail_route(), "/art/7");
    }

    #[test]
    fn takes_first_url_from_list_or_encoded_list() {
        let listed = parse(
            r#"{"id": "a", "main_image_url": ["", "https://cdn.example/a.png"]}"#,
        )
        .unwrap();
        assert_eq!(
            listed.main_image_url.unwrap().as_str(),
            "https://cdn.example/a.png"
        );

        let encoded = parse(
            r#"{"id": "b", "main_image_url": "[\"https://cdn.example/b.png\"]"}"#,
        )
        .unwrap();
        assert_eq!(
            encoded.main_image_url.unwrap().as_str(),
            "https://cdn.example/b.png"
        );
    }

    #[test]
    fn missing_title_and_bad_url_degrade_gracefully() {
        let art = parse(r#"{"id": "c", "main_image_url": "not a url", "author": null}"#)
            .unwrap();
        assert_eq!(art.title, UNTITLED);
        assert!(art.main_image_url.is_none());
        assert!(art.author.is_none());
    }

    #[test]
    fn blank_id_is_rejected() {
        assert!(matches!(
            parse(r#"{"id": "  "}"#),
            Err(ModelError::InvalidId(_))
        ));
    }
}
