//! Integration tests for the cascade.

use wombat_css::style::{font_size, text_color};
use wombat_css::{
    Color, MAX_FONT_SIZE_PX, default_stylesheet, parse_stylesheet, resolve, serialize_style,
    sort_rules,
};
use wombat_dom::{DomTree, NodeId};
use wombat_html::parse;

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.iter_all()
        .into_iter()
        .find(|&id| tree.is_element(id, tag))
        .expect("element present")
}

fn styled(html: &str, css: &str) -> DomTree {
    let mut tree = parse(html);
    let mut rules = parse_stylesheet(css);
    sort_rules(&mut rules);
    resolve(&mut tree, &rules);
    tree
}

fn property<'a>(tree: &'a DomTree, id: NodeId, name: &str) -> Option<&'a str> {
    tree.style(id)?.get(name).map(String::as_str)
}

#[test]
fn test_higher_priority_wins_regardless_of_order() {
    let tree = styled("<div><p></p></div>", "p { color: red; } div p { color: blue; }");
    assert_eq!(property(&tree, first(&tree, "p"), "color"), Some("blue"));

    let tree = styled("<div><p></p></div>", "div p { color: blue; } p { color: red; }");
    assert_eq!(property(&tree, first(&tree, "p"), "color"), Some("blue"));
}

#[test]
fn test_inline_style_beats_rules() {
    let tree = styled(
        r#"<div><p style="color:green"></p></div>"#,
        "div p { color: blue; }",
    );
    assert_eq!(property(&tree, first(&tree, "p"), "color"), Some("green"));
}

#[test]
fn test_equal_priority_later_rule_wins() {
    let tree = styled("<p></p>", "p { color: red; } p { color: green; }");
    assert_eq!(property(&tree, first(&tree, "p"), "color"), Some("green"));
}

#[test]
fn test_declarations_merge_across_rules() {
    let tree = styled(
        "<div><p></p></div>",
        "p { color: red; font-size: 12px; } div p { color: blue; }",
    );
    let p = first(&tree, "p");
    assert_eq!(property(&tree, p, "color"), Some("blue"));
    assert_eq!(property(&tree, p, "font-size"), Some("12px"));
}

#[test]
fn test_cascade_does_not_inherit() {
    let tree = styled("<div><p>text</p></div>", "div { color: red; }");
    let p = first(&tree, "p");
    assert_eq!(property(&tree, p, "color"), None);
    assert!(tree.style(tree.children(p)[0]).is_some_and(|s| s.is_empty()));

    // Text color is found on the nearest ancestor at paint time instead.
    assert_eq!(text_color(&tree, tree.children(p)[0]), Color::rgb(255, 0, 0));
}

#[test]
fn test_default_stylesheet_applies() {
    let mut tree = parse("<a href=x>link</a><pre>code</pre>");
    let mut rules = default_stylesheet().to_vec();
    sort_rules(&mut rules);
    resolve(&mut tree, &rules);
    assert_eq!(property(&tree, first(&tree, "a"), "color"), Some("blue"));
    assert_eq!(
        property(&tree, first(&tree, "pre"), "background-color"),
        Some("gray")
    );
}

#[test]
fn test_serialized_style_reapplies_to_same_map() {
    let tree = styled(
        r#"<div><p style="font-weight: bold">x</p></div>"#,
        "div p { color: blue; font-size: 150%; }",
    );
    let p = first(&tree, "p");
    let resolved = tree.style(p).cloned().expect("style resolved");
    assert_eq!(resolved.len(), 3);

    let inline = serialize_style(&resolved);
    let mut again = parse(&format!(r#"<p style="{inline}">x</p>"#));
    resolve(&mut again, &[]);
    let q = first(&again, "p");
    assert_eq!(again.style(q), Some(&resolved));
}

#[test]
fn test_font_size_is_clamped_to_a_finite_range() {
    let size_of = |style: &str| {
        let html = format!(r#"<div style="font-size:20px"><p style="{style}">x</p></div>"#);
        let tree = styled(&html, "");
        font_size(&tree, first(&tree, "p"))
    };
    assert!((size_of("font-size:200000px") - MAX_FONT_SIZE_PX).abs() < f32::EPSILON);
    assert!((size_of("font-size:100000%") - MAX_FONT_SIZE_PX).abs() < f32::EPSILON);
    // Negative and non-finite sizes fall back to the parent's size.
    assert!((size_of("font-size:-5px") - 20.0).abs() < f32::EPSILON);
    assert!((size_of("font-size:infpx") - 20.0).abs() < f32::EPSILON);
    assert!((size_of("font-size:NaNpx") - 20.0).abs() < f32::EPSILON);
    assert!((size_of("font-size:12px") - 12.0).abs() < f32::EPSILON);
}
