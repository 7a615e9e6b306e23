/// Wire model for the planetary/apod endpoint
///
/// Field names mirror the JSON the archive returns. A missing hdurl is
/// valid (videos and some dates ship without one) and maps to None
/// rather than an error.

use serde::Deserialize;

use crate::state::data::{ImageRecord, MediaType};

/// One archive entry as returned by the remote service
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ApodResponse {
    pub date: String,
    pub title: String,
    /// Standard-resolution media URL
    pub url: String,
    /// High-resolution URL, not present for every date
    pub hdurl: Option<String>,
    pub explanation: String,
    pub copyright: Option<String>,
    pub media_type: MediaType,
    /// API version tag, informational only
    pub service_version: Option<String>,
}

impl From<ApodResponse> for ImageRecord {
    fn from(response: ApodResponse) -> Self {
        ImageRecord::new(
            response.date,
            response.title,
            response.url,
            response.hdurl,
            response.explanation,
            response.copyright,
            response.media_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_entry() {
        let json = r#"{
            "copyright": "Alan Smithee",
            "date": "2020-01-01",
            "explanation": "Betelgeuse has been remarkably dim lately.",
            "hdurl": "https://apod.nasa.gov/apod/image/2001/BetelgeuseImagined_big.jpg",
            "media_type": "image",
            "service_version": "v1",
            "title": "Betelgeuse Imagined",
            "url": "https://apod.nasa.gov/apod/image/2001/BetelgeuseImagined_1024.jpg"
        }"#;

        let entry: ApodResponse = serde_json::from_str(json).unwrap();
        assert_eq!(entry.date, "2020-01-01");
        assert_eq!(entry.title, "Betelgeuse Imagined");
        assert_eq!(entry.media_type, MediaType::Image);
        assert_eq!(entry.copyright.as_deref(), Some("Alan Smithee"));
        assert!(entry.hdurl.is_some());
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        // Video entries have no hdurl, and many dates carry no copyright
        let json = r#"{
            "date": "2020-02-02",
            "explanation": "A tour of the lunar surface.",
            "media_type": "video",
            "title": "Moon Tour",
            "url": "https://player.vimeo.com/video/example"
        }"#;

        let entry: ApodResponse = serde_json::from_str(json).unwrap();
        assert_eq!(entry.media_type, MediaType::Video);
        assert_eq!(entry.hdurl, None);
        assert_eq!(entry.copyright, None);
        assert_eq!(entry.service_version, None);
    }

    #[test]
    fn test_unknown_media_type_is_an_error() {
        let json = r#"{
            "date": "2020-03-03",
            "explanation": "x",
            "media_type": "hologram",
            "title": "x",
            "url": "https://example.com/x"
        }"#;

        assert!(serde_json::from_str::<ApodResponse>(json).is_err());
    }

    #[test]
    fn test_conversion_into_record() {
        let entry = ApodResponse {
            date: "2020-01-01".to_string(),
            title: "Betelgeuse Imagined".to_string(),
            url: "https://apod.nasa.gov/a.jpg".to_string(),
            hdurl: Some("https://apod.nasa.gov/a_big.jpg".to_string()),
            explanation: "A dimming red supergiant.".to_string(),
            copyright: None,
            media_type: MediaType::Image,
            service_version: Some("v1".to_string()),
        };

        let record = ImageRecord::from(entry);
        assert_eq!(record.date, "2020-01-01");
        assert_eq!(record.image_url, "https://apod.nasa.gov/a.jpg");
        assert_eq!(record.hd_image_url.as_deref(), Some("https://apod.nasa.gov/a_big.jpg"));
        assert_eq!(record.media_type, MediaType::Image);
        assert!(record.saved_at > 0);
    }
}
