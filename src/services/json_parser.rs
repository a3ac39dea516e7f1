// Structured-Data Theme Parser
// Reads JSON/JSONC themes in list, structured or flat form

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Number;

use crate::models::{ParseWarning, ParsedTheme, ThemeFormat};
use crate::services::parse_error::ParseError;
use crate::services::text_scan::strip_jsonc_comments;

const ID_FIELDS: [&str; 2] = ["id", "themeId"];
const TOKENS_FIELD: &str = "tokens";
const THEME_FILENAME_PATTERN: &str = r"^theme\.(.+)\.[^.]+$";

static THEME_FILENAME_REGEX: OnceLock<Regex> = OnceLock::new();

/// JSON document model that keeps every object entry, including repeated keys.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(Vec<(String, Node)>),
}

impl Node {
    fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
        }
    }

    fn field(&self, name: &str) -> Option<&Node> {
        match self {
            // Last entry wins, matching how the token map treats repeats
            Node::Object(entries) => entries.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Number::from_f64(v)
            .map(Node::Number)
            .ok_or_else(|| E::custom("number is not finite"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, Node>()? {
            entries.push((key, value));
        }
        Ok(Node::Object(entries))
    }
}

/// Parses a structured-data file into one or more themes.
///
/// Accepted shapes:
/// * a list of theme objects
/// * `{ "id": "...", "tokens": { ... } }`
/// * a flat map of reserved-prefixed tokens, identified by a `theme.<id>.json` filename
pub fn parse_structured_data(
    content: &str,
    source_path: &str,
    reserved_prefix: &str,
) -> Result<Vec<ParsedTheme>, ParseError> {
    let sanitized = strip_jsonc_comments(content);
    let document: Node = serde_json::from_str(&sanitized)
        .map_err(|e| ParseError::Malformed(format!("Invalid theme JSON: {e}")))?;

    match &document {
        Node::Array(items) => {
            let mut themes = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                if !matches!(item, Node::Object(_)) {
                    return Err(ParseError::Malformed(format!(
                        "Theme list entry {index} is a {}, expected an object",
                        item.kind()
                    )));
                }
                themes.push(parse_theme_object(item, None, source_path, reserved_prefix)?);
            }
            Ok(themes)
        }
        Node::Object(_) => {
            let inferred = theme_id_from_filename(source_path);
            Ok(vec![parse_theme_object(
                &document,
                inferred,
                source_path,
                reserved_prefix,
            )?])
        }
        other => Err(ParseError::Malformed(format!(
            "Expected a theme object or a list of themes, found a {}",
            other.kind()
        ))),
    }
}

fn parse_theme_object(
    object: &Node,
    inferred_id: Option<String>,
    source_path: &str,
    reserved_prefix: &str,
) -> Result<ParsedTheme, ParseError> {
    let Node::Object(entries) = object else {
        return Err(ParseError::Malformed("Theme entry is not an object".to_string()));
    };

    let explicit_id = match ID_FIELDS.iter().find_map(|field| object.field(field)) {
        Some(Node::String(id)) => Some(id.trim().to_string()),
        Some(other) => {
            return Err(ParseError::Malformed(format!(
                "Theme id must be a string, found a {}",
                other.kind()
            )))
        }
        None => None,
    };

    let token_entries: Vec<&(String, Node)> = match object.field(TOKENS_FIELD) {
        Some(Node::Object(tokens)) => tokens.iter().collect(),
        Some(other) => {
            return Err(ParseError::Malformed(format!(
                "'{TOKENS_FIELD}' must be an object, found a {}",
                other.kind()
            )))
        }
        None => entries
            .iter()
            .filter(|(key, _)| key.starts_with(reserved_prefix))
            .collect(),
    };

    if explicit_id.is_none() && object.field(TOKENS_FIELD).is_none() && token_entries.is_empty() {
        return Err(ParseError::Malformed(
            "Object is not a recognized theme shape (no id, tokens or reserved-prefixed keys)"
                .to_string(),
        ));
    }

    let theme_id = explicit_id.or(inferred_id);
    let mut theme = ParsedTheme::new(theme_id, source_path, ThemeFormat::StructuredData);

    for (key, value) in token_entries {
        if !key.starts_with(reserved_prefix) {
            continue;
        }
        match value {
            Node::String(text) => theme.insert_token(key, text),
            Node::Number(number) => theme.insert_token(key, &number.to_string()),
            Node::Bool(flag) => theme.insert_token(key, &flag.to_string()),
            Node::Null | Node::Array(_) | Node::Object(_) => {
                theme.parse_warnings.push(ParseWarning::NonScalarValue {
                    token: key.clone(),
                    kind: value.kind(),
                });
            }
        }
    }

    Ok(theme)
}

/// Infers a theme id from a `theme.<id>.<ext>` filename.
fn theme_id_from_filename(source_path: &str) -> Option<String> {
    let regex = THEME_FILENAME_REGEX
        .get_or_init(|| Regex::new(THEME_FILENAME_PATTERN).expect("theme filename pattern is valid"));
    let file_name = Path::new(source_path).file_name()?.to_str()?;
    regex
        .captures(file_name)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_form() {
        let json = r##"{
            "id": "ocean-light",
            "name": "Ocean Light",
            "mode": "light",
            "tokens": { "--bg-base": "#fff", "--text-primary": "#000", "plain": "x" }
        }"##;
        let themes = parse_structured_data(json, "ocean.json", "--").unwrap();

        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].theme_id.as_deref(), Some("ocean-light"));
        assert_eq!(themes[0].tokens.len(), 2);
        assert_eq!(themes[0].format, ThemeFormat::StructuredData);
    }

    #[test]
    fn test_theme_id_field_alias() {
        let json = r##"{ "themeId": "nord-dark", "tokens": {} }"##;
        let themes = parse_structured_data(json, "nord.json", "--").unwrap();
        assert_eq!(themes[0].theme_id.as_deref(), Some("nord-dark"));
        assert!(themes[0].tokens.is_empty());
    }

    #[test]
    fn test_list_of_themes() {
        let json = r##"[
            { "id": "a-light", "tokens": { "--bg-base": "#fff" } },
            { "id": "a-dark", "tokens": { "--bg-base": "#000", "--accent": "#f0f" } }
        ]"##;
        let themes = parse_structured_data(json, "a.json", "--").unwrap();

        assert_eq!(themes.len(), 2);
        assert_eq!(themes[0].tokens.len(), 1);
        assert_eq!(themes[1].tokens.len(), 2);
        assert_eq!(themes[1].theme_id.as_deref(), Some("a-dark"));
    }

    #[test]
    fn test_flat_form_infers_id_from_filename() {
        let json = r##"{ "--bg-base": "#fff", "--text-primary": "#000" }"##;
        let themes = parse_structured_data(json, "themes/theme.ocean-dark.json", "--").unwrap();

        assert_eq!(themes[0].theme_id.as_deref(), Some("ocean-dark"));
        assert_eq!(themes[0].tokens.len(), 2);
    }

    #[test]
    fn test_flat_form_without_filename_pattern() {
        let json = r##"{ "--bg-base": "#fff" }"##;
        let themes = parse_structured_data(json, "ocean.json", "--").unwrap();
        assert_eq!(themes[0].theme_id, None);
    }

    #[test]
    fn test_jsonc_comments() {
        let json = "{\n  // palette\n  \"id\": \"c-light\",\n  \"tokens\": { /* x */ \"--bg-base\": \"#fff\" }\n}";
        let themes = parse_structured_data(json, "c.jsonc", "--").unwrap();
        assert_eq!(themes[0].tokens.len(), 1);
    }

    #[test]
    fn test_duplicate_keys_detected() {
        let json = r##"{ "id": "d-light", "tokens": { "--accent": "#111", "--accent": "#222" } }"##;
        let themes = parse_structured_data(json, "d.json", "--").unwrap();

        assert_eq!(themes[0].tokens.get("--accent").map(String::as_str), Some("#222"));
        assert_eq!(themes[0].duplicates, vec!["--accent".to_string()]);
    }

    #[test]
    fn test_scalar_and_non_scalar_values() {
        let json = r##"{ "id": "s-light", "tokens": {
            "--radius": 4,
            "--flag": true,
            "--nested": { "a": 1 },
            "--empty": ""
        } }"##;
        let themes = parse_structured_data(json, "s.json", "--").unwrap();
        let theme = &themes[0];

        assert_eq!(theme.tokens.get("--radius").map(String::as_str), Some("4"));
        assert_eq!(theme.tokens.get("--flag").map(String::as_str), Some("true"));
        assert!(!theme.tokens.contains_key("--nested"));
        assert!(theme.parse_warnings.contains(&ParseWarning::NonScalarValue {
            token: "--nested".to_string(),
            kind: "object",
        }));
        assert!(theme.parse_warnings.contains(&ParseWarning::EmptyValue {
            token: "--empty".to_string(),
        }));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let result = parse_structured_data("{ \"id\": ", "broken.json", "--");
        assert!(matches!(result, Err(ParseError::Malformed(message)) if message.contains("Invalid theme JSON")));
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert!(matches!(
            parse_structured_data("\"just a string\"", "x.json", "--"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_structured_data(r#"{ "name": "nothing" }"#, "x.json", "--"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_structured_data(r#"[1, 2]"#, "x.json", "--"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_structured_data(r#"{ "id": "x-light", "tokens": [] }"#, "x.json", "--"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_empty_list_yields_no_themes() {
        let themes = parse_structured_data("[]", "empty.json", "--").unwrap();
        assert!(themes.is_empty());
    }
}
