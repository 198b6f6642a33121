use crate::store::StoredObject;
use html_escape::encode_text;
use serde_json::Value;
use std::fmt::Write;

/// Pseudo column filled from the object's search distance
pub const DISTANCE_COLUMN: &str = "distance";

/// Render store objects as an HTML table.
///
/// The `index_column` property heads each row and is emitted verbatim: it
/// holds markup built at ingestion time. All other cells are escaped.
pub fn render_table(objects: &[StoredObject], index_column: &str, columns: &[&str]) -> String {
    let mut html = String::new();

    html.push_str("<table class=\"dataframe\">\n  <thead>\n    <tr style=\"text-align: right;\">\n      <th></th>\n");
    for column in columns {
        let _ = writeln!(html, "      <th>{}</th>", encode_text(column));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for object in objects {
        html.push_str("    <tr>\n");
        let index = object
            .properties
            .get(index_column)
            .and_then(Value::as_str)
            .unwrap_or_default();
        let _ = writeln!(html, "      <th>{}</th>", index);

        for column in columns {
            let _ = writeln!(html, "      <td>{}</td>", cell(object, column));
        }
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>\n");
    html
}

fn cell(object: &StoredObject, column: &str) -> String {
    if column == DISTANCE_COLUMN {
        return object.distance.map(|d| format!("{:.4}", d)).unwrap_or_default();
    }

    match object.properties.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => encode_text(text).into_owned(),
        Some(other) => encode_text(&other.to_string()).into_owned(),
    }
}
