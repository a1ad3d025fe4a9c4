use mongodb::bson::{Bson, Document};
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::env;

use crate::constants;

#[derive(Clone)]
pub struct Config {
    pub database_name: String,
    pub verify_url: String,
    pub verify_api_key: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_name: env::var("DB_NAME")
                .unwrap_or_else(|_| constants::DEFAULT_DATABASE.to_string()),
            verify_url: env::var("AUTH_VERIFY_URL")
                .unwrap_or_else(|_| constants::DEFAULT_VERIFY_URL.to_string()),
            verify_api_key: env::var("AUTH_API_KEY").unwrap_or_default(),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

pub fn error_response(message: &str) -> Value {
    json!({
        "error": message
    })
}

/// Rewrites a store-assigned ObjectId `_id` as its hex string so response
/// bodies carry plain JSON ids instead of `{"$oid": ...}` objects.
pub fn stringify_id(doc: &mut Document) {
    if let Some(Bson::ObjectId(oid)) = doc.get("_id") {
        let hex = oid.to_hex();
        doc.insert("_id", Bson::String(hex));
    }
}

/// Escapes regex metacharacters so a search term matches as a literal
/// substring inside `$regex`.
pub fn escape_regex(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(
            c,
            '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn plain_terms_pass_through_unescaped() {
        assert_eq!(escape_regex("ramen"), "ramen");
        assert_eq!(escape_regex(""), "");
    }

    #[test]
    fn metacharacters_are_escaped() {
        assert_eq!(escape_regex("mac+cheese (large)"), "mac\\+cheese \\(large\\)");
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
    }

    #[test]
    fn object_id_becomes_hex_string() {
        let oid = ObjectId::new();
        let mut record = doc! { "_id": oid, "foodName": "Ramen" };

        stringify_id(&mut record);

        assert_eq!(record.get_str("_id").expect("_id"), oid.to_hex());
        assert_eq!(record.get_str("foodName").expect("foodName"), "Ramen");
    }

    #[test]
    fn non_object_ids_are_left_alone() {
        let mut no_id = doc! { "foodName": "Ramen" };
        stringify_id(&mut no_id);
        assert!(no_id.get("_id").is_none());

        let mut string_id = doc! { "_id": "custom" };
        stringify_id(&mut string_id);
        assert_eq!(string_id.get_str("_id").expect("_id"), "custom");
    }
}
