//! HTML fragments the presentation layer embeds without escaping.

use html_escape::encode_double_quoted_attribute;

/// Width of the thumbnail in `linked_image`
const THUMBNAIL_WIDTH: u32 = 60;

pub fn html_url(url: &str) -> String {
    format!(r#"<a href="{}"></a>"#, encode_double_quoted_attribute(url))
}

pub fn linked_image(url: &str, image_url: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank"><img src="{}" width="{}" ></a>"#,
        encode_double_quoted_attribute(url),
        encode_double_quoted_attribute(image_url),
        THUMBNAIL_WIDTH
    )
}
