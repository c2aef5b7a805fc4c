//! End-to-end resolution of style documents on disk.

use plotstyle_core::{
    LoadedStyle, ResolveError, ResolveOptions, ResolvedStyle, StyleLoader, Value, mapping,
};
use std::fs;
use tempfile::TempDir;

/// A documents root populated with YAML files.
struct Styles {
    dir: TempDir,
}

impl Styles {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    fn write(&self, name: &str, content: &str) -> &Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create style folder");
        }
        fs::write(path, content).expect("Failed to write style document");
        self
    }

    fn options(&self) -> ResolveOptions {
        ResolveOptions::default().with_documents_root(self.dir.path())
    }

    fn resolve_with(&self, options: ResolveOptions, name: &str) -> ResolvedStyle {
        let loader = StyleLoader::with_options(options).unwrap();
        match loader.from_path(name).unwrap() {
            LoadedStyle::Single(style) => style,
            LoadedStyle::Template(_) => panic!("{name} unexpectedly declares configs"),
        }
    }

    fn resolve(&self, name: &str) -> ResolvedStyle {
        self.resolve_with(self.options(), name)
    }
}

fn warning_keys(style: &ResolvedStyle) -> Vec<&str> {
    style.warnings().filter_map(|d| d.key.as_deref()).collect()
}

#[test]
fn test_later_document_wins() {
    let styles = Styles::new();
    styles
        .write("a.yaml", "k: from-a\nonly_a: 1\n")
        .write("b.yaml", "k: from-b\n");

    let loader = StyleLoader::with_options(styles.options()).unwrap();
    let style = loader.from_paths(&["a.yaml", "b.yaml"]).unwrap();

    assert_eq!(style.get("k"), Some(&Value::from("from-b")));
    assert_eq!(style.get("only_a"), Some(&Value::Int(1)));
}

#[test]
fn test_reference_target_deleted_by_default() {
    let styles = Styles::new();
    styles.write(
        "style.yaml",
        r#"
base: {value: 10, validator: int}
doubled: {value: base, source: field, validator: int}
"#,
    );

    let style = styles.resolve("style.yaml");

    assert_eq!(style.get("doubled"), Some(&Value::Int(10)));
    assert!(!style.contains_key("base"));
    assert!(style.marked_for_delete().contains("base"));
    assert!(style.diagnostics().is_empty());
}

#[test]
fn test_explicit_keep_overrides_inference() {
    let styles = Styles::new();
    styles.write(
        "style.yaml",
        r#"
base: {value: 10, validator: int, keep: true}
doubled: {value: base, source: field, validator: int}
"#,
    );

    let style = styles.resolve("style.yaml");

    assert_eq!(style.get("base"), Some(&Value::Int(10)));
    assert_eq!(style.get("doubled"), Some(&Value::Int(10)));
    assert!(style.marked_for_delete().is_empty());
}

#[test]
fn test_keep_all_fields_skips_deletion() {
    let styles = Styles::new();
    styles.write(
        "style.yaml",
        r#"
base: {value: 10, validator: int}
doubled: {value: base, source: field, validator: int}
"#,
    );

    let style = styles.resolve_with(styles.options().with_keep_all_fields(true), "style.yaml");

    assert_eq!(style.get("base"), Some(&Value::Int(10)));
    // Still reported, just not applied.
    assert!(style.marked_for_delete().contains("base"));
}

#[test]
fn test_chain_include_follows_declaration_order() {
    let styles = Styles::new();
    styles
        .write("shared/common.yaml", "title: shared\nfooter: x\ncolor: red\n")
        .write(
            "report.yaml",
            r#"
title: local
common: {value: common.yaml, validator: yaml}
footer: mine
"#,
        );

    let style = styles.resolve("report.yaml");

    assert_eq!(style.get("title"), Some(&Value::from("shared")));
    assert_eq!(style.get("footer"), Some(&Value::from("mine")));
    assert_eq!(style.get("color"), Some(&Value::from("red")));
    assert!(!style.contains_key("common"));
    assert_eq!(style.keys().collect::<Vec<_>>(), vec!["title", "footer", "color"]);
}

#[test]
fn test_chain_include_path_from_reference() {
    let styles = Styles::new();
    styles.write("dark.yaml", "background: black\n").write(
        "style.yaml",
        r#"
theme: dark.yaml
include: {value: theme, source: field, validator: yaml}
"#,
    );

    let style = styles.resolve("style.yaml");

    assert_eq!(style.get("background"), Some(&Value::from("black")));
    assert!(!style.contains_key("theme"));
}

#[test]
fn test_chain_include_is_all_or_nothing() {
    let styles = Styles::new();
    styles.write("good.yaml", "x: 1\n").write(
        "style.yaml",
        r#"
x: 0
include: {value: [good.yaml, missing.yaml], validator: yaml}
y: 2
"#,
    );

    let style = styles.resolve("style.yaml");

    assert_eq!(style.get("x"), Some(&Value::Int(0)));
    assert_eq!(style.get("y"), Some(&Value::Int(2)));
    assert_eq!(warning_keys(&style), vec!["include"]);
}

#[test]
fn test_include_cycle_is_reported_not_fatal() {
    let styles = Styles::new();
    styles
        .write("a.yaml", "from_a: 1\nnext: {value: b.yaml, validator: yaml}\n")
        .write("b.yaml", "from_b: 2\nback: {value: a.yaml, validator: yaml}\n");

    let style = styles.resolve("a.yaml");

    assert_eq!(style.get("from_a"), Some(&Value::Int(1)));
    assert_eq!(style.get("from_b"), Some(&Value::Int(2)));
    assert_eq!(warning_keys(&style), vec!["back"]);
    let message = &style.warnings().next().unwrap().message;
    assert!(message.contains("a.yaml"), "{message}");
}

#[test]
fn test_include_depth_limit_is_fatal() {
    let styles = Styles::new();
    styles
        .write("l0.yaml", "next: {value: l1.yaml, validator: yaml}\n")
        .write("l1.yaml", "next: {value: l2.yaml, validator: yaml}\n")
        .write("l2.yaml", "next: {value: l3.yaml, validator: yaml}\n")
        .write("l3.yaml", "leaf: 1\n");

    let shallow = StyleLoader::with_options(styles.options().with_max_depth(2)).unwrap();
    let err = shallow.from_path("l0.yaml").err().unwrap();
    assert!(matches!(err, ResolveError::ResolutionTooDeep { max_depth: 2, .. }));

    let style = styles.resolve_with(styles.options().with_max_depth(3), "l0.yaml");
    assert_eq!(style.get("leaf"), Some(&Value::Int(1)));
}

#[test]
fn test_unknown_validator_isolated_to_its_field() {
    let styles = Styles::new();
    styles.write(
        "style.yaml",
        r#"
title: Report
bad: {value: 1, validator: nope}
fontsize: {value: 12, validator: fontsize}
"#,
    );

    let style = styles.resolve("style.yaml");

    assert_eq!(style.get("title"), Some(&Value::from("Report")));
    assert_eq!(style.get("fontsize"), Some(&Value::Int(12)));
    assert!(!style.contains_key("bad"));
    assert_eq!(warning_keys(&style), vec!["bad"]);
    let message = style.warnings().next().unwrap().message.as_str();
    insta::assert_snapshot!(message, @"unknown validator 'nope'");
}

#[test]
fn test_localization_picks_active_language() {
    let styles = Styles::new();
    styles.write("style.yaml", "label: {en: Hello, pt: Olá}\n");

    let pt = styles.resolve_with(styles.options().with_language("pt"), "style.yaml");
    assert_eq!(pt.get("label"), Some(&Value::from("Olá")));
    assert_eq!(pt.language(), "pt");

    let fr = styles.resolve_with(styles.options().with_language("fr"), "style.yaml");
    assert_eq!(
        fr.get("label"),
        Some(&Value::Mapping(mapping! { "en" => "Hello", "pt" => "Olá" }))
    );
}

#[test]
fn test_language_field_selects_language() {
    let styles = Styles::new();
    styles.write("style.yaml", "language: pt\nlabel: {en: Hello, pt: Olá}\n");

    let style = styles.resolve("style.yaml");
    assert_eq!(style.get("label"), Some(&Value::from("Olá")));

    let forced = styles.resolve_with(styles.options().with_language("en"), "style.yaml");
    assert_eq!(forced.get("label"), Some(&Value::from("Hello")));
}

#[test]
fn test_suffix_and_prefix_compose() {
    let styles = Styles::new();
    styles.write(
        "style.yaml",
        r#"
name: {value: Report, suffix: {value: _v2}}
title:
  value: Results
  prefix: {value: {en: "Fig: ", pt: "Figura: "}}
"#,
    );

    let style = styles.resolve_with(styles.options().with_language("pt"), "style.yaml");

    assert_eq!(style.get("name"), Some(&Value::from("Report_v2")));
    assert_eq!(style.get("title"), Some(&Value::from("Figura: Results")));
}

#[test]
fn test_affix_type_mismatch_leaves_value_undecorated() {
    let styles = Styles::new();
    styles.write("style.yaml", "size: {value: 3, validator: int, suffix: {value: pt}}\n");

    let style = styles.resolve("style.yaml");

    assert_eq!(style.get("size"), Some(&Value::Int(3)));
    assert_eq!(warning_keys(&style), vec!["size.suffix"]);
}

#[test]
fn test_tagged_documents() {
    let styles = Styles::new();
    styles.write(
        "style.yaml",
        r#"
literal: !implicit {value: not-a-descriptor}
sized: !explicit {value: 4, validator: linewidth}
broken: !explicit {validator: int}
"#,
    );

    let style = styles.resolve("style.yaml");

    assert_eq!(
        style.get("literal"),
        Some(&Value::Mapping(mapping! { "value" => "not-a-descriptor" }))
    );
    assert_eq!(style.get("sized"), Some(&Value::Int(4)));
    assert_eq!(warning_keys(&style), vec!["broken"]);
}

#[test]
fn test_resolution_is_repeatable() {
    let styles = Styles::new();
    styles.write("common.yaml", "grid: {value: {alpha: 0.3, visible: true}, validator: dict}\n").write(
        "style.yaml",
        r#"
main: tab:blue
line:
  validator: plotoptions
  value:
    color: {value: main, source: field}
    lw: {value: 1.5, validator: linewidth}
include: {value: common.yaml, validator: yaml}
"#,
    );

    let first = serde_json::to_string(&styles.resolve("style.yaml")).unwrap();
    let second = serde_json::to_string(&styles.resolve("style.yaml")).unwrap();

    assert_eq!(first, second);
    insta::assert_snapshot!(first, @r#"{"line":{"color":"tab:blue","lw":1.5},"grid":{"alpha":0.3,"visible":true}}"#);
}

#[test]
fn test_from_text() {
    let loader = StyleLoader::with_options(ResolveOptions::default()).unwrap();
    let style = loader
        .from_text("width: {value: '6.5', validator: float}\nheight: 4\n")
        .unwrap();

    assert_eq!(style.get("width"), Some(&Value::Float(6.5)));
    assert_eq!(style.get("height"), Some(&Value::Int(4)));
}

#[test]
fn test_missing_top_level_document_is_fatal() {
    let styles = Styles::new();
    let loader = StyleLoader::with_options(styles.options()).unwrap();

    let err = loader.from_path("absent.yaml").err().unwrap();
    assert!(matches!(err, ResolveError::DocumentNotFound { .. }));
}

#[test]
fn test_non_mapping_document_is_fatal() {
    let styles = Styles::new();
    styles.write("list.yaml", "- a\n- b\n");
    let loader = StyleLoader::with_options(styles.options()).unwrap();

    let err = loader.from_path("list.yaml").err().unwrap();
    assert!(matches!(err, ResolveError::Schema { .. }));
}

#[test]
fn test_shallowest_match_wins() {
    let styles = Styles::new();
    styles
        .write("deep/nested/style.yaml", "where: deep\n")
        .write("other/style.yaml", "where: other\n")
        .write("another/style.yaml", "where: another\n");

    let style = styles.resolve("style.yaml");
    assert_eq!(style.get("where"), Some(&Value::from("another")));
}

#[test]
fn test_invalid_options_rejected() {
    let err = StyleLoader::with_options(ResolveOptions::default().with_max_depth(0))
        .err()
        .unwrap();
    assert!(matches!(err, ResolveError::InvalidOptions(_)));
}
