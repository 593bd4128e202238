//! Integration tests for selector parsing and matching.

use wombat_css::{Selector, parse_selector};
use wombat_dom::{DomTree, NodeId};
use wombat_html::parse;

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.iter_all()
        .into_iter()
        .find(|&id| tree.is_element(id, tag))
        .expect("element present")
}

#[test]
fn test_tag_selector_matches_by_name() {
    let tree = parse("<div><p>x</p></div>");
    let selector = parse_selector("p").expect("valid selector");
    assert!(selector.matches(&tree, first(&tree, "p")));
    assert!(!selector.matches(&tree, first(&tree, "div")));
}

#[test]
fn test_tag_selector_never_matches_text() {
    let tree = parse("<p>x</p>");
    let p = first(&tree, "p");
    let text = tree.children(p)[0];
    assert!(!parse_selector("p").expect("valid").matches(&tree, text));
}

#[test]
fn test_descendant_needs_strict_ancestor() {
    let tree = parse("<div><span><p>x</p></span></div><p>y</p>");
    let selector = parse_selector("div p").expect("valid selector");
    let paragraphs: Vec<NodeId> = tree
        .iter_all()
        .into_iter()
        .filter(|&id| tree.is_element(id, "p"))
        .collect();
    assert_eq!(paragraphs.len(), 2);
    assert!(selector.matches(&tree, paragraphs[0]));
    assert!(!selector.matches(&tree, paragraphs[1]));

    // A node is not its own ancestor.
    let div = first(&tree, "div");
    assert!(!parse_selector("div div").expect("valid").matches(&tree, div));
}

#[test]
fn test_three_part_chain() {
    let tree = parse("<div><ul><li>a</li></ul></div><ul><li>b</li></ul>");
    let selector = parse_selector("div ul li").expect("valid selector");
    let items: Vec<NodeId> = tree
        .iter_all()
        .into_iter()
        .filter(|&id| tree.is_element(id, "li"))
        .collect();
    assert!(selector.matches(&tree, items[0]));
    assert!(!selector.matches(&tree, items[1]));
    assert_eq!(selector.priority(), 3);
}

#[test]
fn test_chain_matches_ancestors_in_any_order() {
    // `span div p` is `span (div p)`: the `p` needs a `div` ancestor and a
    // `span` ancestor, whatever their relative nesting.
    let tree = parse("<div><span><p>x</p></span></div>");
    let p = first(&tree, "p");
    assert!(parse_selector("span div p").expect("valid").matches(&tree, p));
    assert!(parse_selector("div span p").expect("valid").matches(&tree, p));
    assert!(!parse_selector("ul div p").expect("valid").matches(&tree, p));
}

#[test]
fn test_priority_counts_tags() {
    assert_eq!(parse_selector("p").expect("valid").priority(), 1);
    assert_eq!(parse_selector("div p").expect("valid").priority(), 2);
}

#[test]
fn test_selector_is_lowercased_and_displayed() {
    let selector = parse_selector("  DIV   P ").expect("valid selector");
    assert_eq!(selector.to_string(), "div p");
    assert_eq!(
        selector,
        Selector::Descendant {
            ancestor: Box::new(Selector::Tag("div".to_string())),
            descendant: Box::new(Selector::Tag("p".to_string())),
        }
    );
}

#[test]
fn test_invalid_selectors() {
    assert!(parse_selector("").is_err());
    assert!(parse_selector("p:hover").is_err());
    assert!(parse_selector("div { color: red; }").is_err());
}
