//! Integration tests for the painter.

use wombat_css::{
    ApproximateFontMetrics, Color, DisplayCommand, DisplayList, LayoutConfig, Painter,
    default_stylesheet, layout, parse_stylesheet, resolve, sort_rules,
};
use wombat_dom::{DomTree, NodeId};
use wombat_html::parse;

fn styled(html: &str, css: &str) -> DomTree {
    let mut tree = parse(html);
    let mut rules = default_stylesheet().to_vec();
    rules.extend(parse_stylesheet(css));
    sort_rules(&mut rules);
    resolve(&mut tree, &rules);
    tree
}

fn paint(tree: &DomTree) -> DisplayList {
    let metrics = ApproximateFontMetrics;
    let layout_tree = layout(tree, &metrics, &LayoutConfig::default());
    Painter::new(tree, &metrics).paint(&layout_tree)
}

fn first(tree: &DomTree, tag: &str) -> NodeId {
    tree.iter_all()
        .into_iter()
        .find(|&id| tree.is_element(id, tag))
        .expect("element present")
}

#[test]
fn test_background_precedes_text() {
    let list = paint(&styled("<pre>code</pre>", ""));
    let commands = list.commands();
    assert_eq!(commands.len(), 2);
    assert!(matches!(
        commands[0],
        DisplayCommand::FillRect { color, .. } if color == Color::rgb(128, 128, 128)
    ));
    assert!(matches!(&commands[1], DisplayCommand::TextRun { text, .. } if text == "code"));
}

#[test]
fn test_transparent_background_paints_nothing() {
    let list = paint(&styled("<div>x</div>", "div { background-color: transparent; }"));
    assert_eq!(list.len(), 1);
}

#[test]
fn test_border_radius_rounds_background() {
    let list = paint(&styled(
        "<div>x</div>",
        "div { background-color: red; border-radius: 4px; }",
    ));
    assert!(matches!(
        list.commands()[0],
        DisplayCommand::RoundedRect { radius, .. } if (radius - 4.0).abs() < f32::EPSILON
    ));
}

#[test]
fn test_text_uses_ancestor_color() {
    let list = paint(&styled("<div><p>hi <b>there</b></p></div>", "div { color: red; }"));
    let colors: Vec<Color> = list
        .commands()
        .iter()
        .filter_map(|command| match command {
            DisplayCommand::TextRun { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(colors, vec![Color::rgb(255, 0, 0); 2]);
}

#[test]
fn test_focused_input_draws_caret_after_value() {
    let mut tree = styled("<p><input value=abc></p>", "");
    let input = first(&tree, "input");
    tree.set_focused(input, true);
    let list = paint(&tree);

    let caret = list
        .commands()
        .iter()
        .find_map(|command| match command {
            DisplayCommand::Line { x1, .. } => Some(*x1),
            _ => None,
        })
        .expect("caret drawn");
    // Input starts at the page margin; "abc" is 3 * 9.6px wide.
    assert!((caret - (13.0 + 28.8)).abs() < 1e-3);

    assert!(list.commands().iter().any(|command| matches!(
        command,
        DisplayCommand::TextRun { text, .. } if text == "abc"
    )));
}

#[test]
fn test_unfocused_input_and_button_have_no_caret() {
    let list = paint(&styled("<p><input value=a><button>go</button></p>", ""));
    assert!(
        !list
            .commands()
            .iter()
            .any(|command| matches!(command, DisplayCommand::Line { .. }))
    );
    let outlines = list
        .commands()
        .iter()
        .filter(|command| matches!(command, DisplayCommand::Outline { .. }))
        .count();
    assert_eq!(outlines, 2);
    assert!(list.commands().iter().any(|command| matches!(
        command,
        DisplayCommand::TextRun { text, .. } if text == "go"
    )));
}

#[test]
fn test_display_list_serializes_to_json() {
    let list = paint(&styled("<pre>x</pre>", ""));
    let json = serde_json::to_value(&list).expect("serializable");
    let commands = json.as_array().expect("array of commands");
    assert_eq!(commands[0]["command"], "fill_rect");
    assert_eq!(commands[1]["command"], "text_run");
    assert_eq!(commands[1]["text"], "x");
    assert_eq!(commands[1]["font"]["weight"], "normal");
}
