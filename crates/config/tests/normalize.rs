use irlink_config::{LinkerFlags, NormalizedLinkerConfig, RawLinkerConfig};

fn normalize(input: &str) -> NormalizedLinkerConfig {
    let raw: RawLinkerConfig = serde_json::from_str(input).unwrap();
    raw.normalize()
}

#[test]
fn test_default_flags() {
    let c = normalize("{}");
    assert!(c.exported_dependencies().is_empty());
    assert_eq!(*c.flags(), LinkerFlags::SKIP_EXPECTS);
    assert!(!c.deserialize_fake_overrides());
    assert!(c.skip_expects());
    assert!(!c.report_unbound_symbols());
}

#[test]
fn test_exported_dependencies() {
    let c = normalize(
        r#"
{
  "exportedDependencies": ["stdlib", "ui"]
}"#,
    );
    assert!(c.is_exported_dependency("stdlib"));
    assert!(c.is_exported_dependency("ui"));
    assert!(!c.is_exported_dependency("app"));
}

#[test]
fn skip_expects_can_be_disabled() {
    let c = normalize(
        r#"
{
  "skipExpects": false,
  "deserializeFakeOverrides": true
}"#,
    );
    assert!(!c.skip_expects());
    assert!(c.deserialize_fake_overrides());
}

#[test]
fn builder_helpers() {
    let c = RawLinkerConfig::default()
        .with_report_unbound_symbols(true)
        .with_skip_expects_if_none(false)
        .config_exported_dependencies(|mut deps| {
            deps.push("stdlib".to_string());
            deps
        })
        .normalize();
    assert!(c.report_unbound_symbols());
    assert!(!c.skip_expects());
    assert_eq!(c.exported_dependencies(), &["stdlib"]);
}
