use eframe::egui::ColorImage;
use serde_json::Value;
use tracing::debug;

use crate::model::QueryResult;

/// First preview image advertised by the metadata response, if any.
///
/// Entries may be objects carrying a `url` or bare URL strings; anything else is skipped.
pub fn thumbnail_url(result: &QueryResult) -> Option<&str> {
    result
        .body()
        .get("thumbnails")?
        .as_array()?
        .iter()
        .filter_map(|t| t.as_str().or_else(|| t.get("url").and_then(Value::as_str)))
        .find(|url| !url.is_empty())
}

/// Downloads and decodes a thumbnail. Blocking; run it off the UI thread.
pub fn fetch_thumbnail(url: &str) -> Option<ColorImage> {
    let resp = match reqwest::blocking::get(url).and_then(|r| r.error_for_status()) {
        Ok(resp) => resp.bytes().ok()?,
        Err(err) => {
            debug!(url, error = %err, "thumbnail fetch failed");
            return None;
        }
    };
    let img = image::load_from_memory(&resp).ok()?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, &img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_result;

    #[test]
    fn picks_first_non_empty_thumbnail() {
        let mut body = sample_result();
        body["thumbnails"] = serde_json::json!([
            { "url": "" },
            { "url": "https://i.example/hq.jpg", "width": 480 },
            { "url": "https://i.example/max.jpg" }
        ]);
        let result: QueryResult = serde_json::from_value(body).unwrap();
        assert_eq!(thumbnail_url(&result), Some("https://i.example/hq.jpg"));
    }

    #[test]
    fn accepts_bare_url_strings() {
        let mut body = sample_result();
        body["thumbnails"] = serde_json::json!([42, "https://i.example/1.jpg"]);
        let result: QueryResult = serde_json::from_value(body).unwrap();
        assert_eq!(thumbnail_url(&result), Some("https://i.example/1.jpg"));
    }

    #[test]
    fn null_or_odd_thumbnails_yield_nothing() {
        for thumbs in [serde_json::Value::Null, serde_json::json!({ "url": "x" }), serde_json::json!("x")] {
            let mut body = sample_result();
            body["thumbnails"] = thumbs;
            let result: QueryResult = serde_json::from_value(body).unwrap();
            assert_eq!(thumbnail_url(&result), None);
        }
    }

    #[test]
    fn no_thumbnails() {
        let result: QueryResult = serde_json::from_value(sample_result()).unwrap();
        assert_eq!(thumbnail_url(&result), None);
    }
}
