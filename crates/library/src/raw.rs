use serde::{Deserialize, Serialize};

/// A serialized library held in memory.
///
/// ```json
/// {
///   "files": [{
///     "name": "widget.kt",
///     "package": "ui",
///     "declarations": [{
///       "name": "Widget",
///       "kind": "class",
///       "exported": true,
///       "members": [{ "name": "render", "kind": "fun", "body": ["fun ui/draw"] }]
///     }]
///   }],
///   "expectActual": [{ "expect": "ui/Widget", "actual": "ui/Widget" }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryLibrary {
    #[serde(default)]
    pub files: Vec<RawFile>,
    #[serde(default)]
    pub expect_actual: Vec<RawExpectActual>,
}

impl MemoryLibrary {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub declarations: Vec<RawDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDecl {
    pub name: String,
    /// One of the keywords of `SymbolKind::from_keyword`.
    pub kind: String,
    #[serde(default)]
    pub hash: Option<u64>,
    #[serde(default)]
    pub expect: bool,
    #[serde(default)]
    pub actual: bool,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub inline: bool,
    #[serde(default)]
    pub fake_override: bool,
    /// Not visible outside of its file.
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub members: Vec<RawDecl>,
    /// References in the `[expect ]<kind> package/Name.member|hash` form.
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub body: Option<Vec<String>>,
}

/// Both sides are signatures in the `package/Name.member|hash` form; the
/// expect side implicitly carries the expect marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawExpectActual {
    pub expect: String,
    pub actual: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let lib = MemoryLibrary::from_json(
            r#"{ "files": [{ "name": "a.kt", "declarations": [{ "name": "A", "kind": "class" }] }] }"#,
        )
        .unwrap();
        assert!(lib.expect_actual.is_empty());
        let file = &lib.files[0];
        assert_eq!(file.package, "");
        let decl = &file.declarations[0];
        assert!(!decl.exported && !decl.fake_override);
        assert_eq!(decl.body, None);
        assert!(decl.members.is_empty());
    }

    #[test]
    fn test_camel_case_fields() {
        let lib = MemoryLibrary::from_json(
            r#"{
                "files": [{ "name": "a.kt", "package": "p", "declarations": [
                    { "name": "f", "kind": "fun", "fakeOverride": true, "hash": 7 }
                ]}],
                "expectActual": [{ "expect": "p/A", "actual": "p/A" }]
            }"#,
        )
        .unwrap();
        let decl = &lib.files[0].declarations[0];
        assert!(decl.fake_override);
        assert_eq!(decl.hash, Some(7));
        assert_eq!(lib.expect_actual[0].actual, "p/A");
    }
}
