//! Integration tests for the layout engine, using fixed-ratio font metrics.

use wombat_css::{
    ApproximateFontMetrics, LayoutConfig, LayoutId, LayoutKind, LayoutTree, default_stylesheet,
    layout, resolve, sort_rules,
};
use wombat_dom::DomTree;
use wombat_html::parse;

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

fn styled(html: &str) -> DomTree {
    let mut tree = parse(html);
    let mut rules = default_stylesheet().to_vec();
    sort_rules(&mut rules);
    resolve(&mut tree, &rules);
    tree
}

fn lay_out(html: &str, config: &LayoutConfig) -> LayoutTree {
    layout(&styled(html), &ApproximateFontMetrics, config)
}

fn of_kind(tree: &LayoutTree, pred: impl Fn(&LayoutKind) -> bool) -> Vec<LayoutId> {
    tree.preorder()
        .into_iter()
        .filter(|&id| pred(&tree[id].kind))
        .collect()
}

fn lines(tree: &LayoutTree) -> Vec<LayoutId> {
    of_kind(tree, |kind| *kind == LayoutKind::Line)
}

fn words(tree: &LayoutTree, line: LayoutId) -> Vec<String> {
    tree.children(line)
        .iter()
        .filter_map(|&id| match &tree[id].kind {
            LayoutKind::Text { word } => Some(word.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_document_geometry() {
    let tree = lay_out("<p>hello</p>", &LayoutConfig::default());
    let document = &tree[tree.root()];
    assert_eq!(document.kind, LayoutKind::Document);
    assert_close(document.x, 13.0);
    assert_close(document.y, 18.0);
    assert_close(document.width, 774.0);

    // One 16px line: 1.25 * (12.8 + 3.2).
    assert_close(document.height, 20.0 + 2.0 * 18.0);
    assert_close(tree.document_height(), 56.0);
}

#[test]
fn test_empty_document_has_margins_only() {
    let tree = lay_out("", &LayoutConfig::default());
    assert_close(tree.document_height(), 36.0);
    assert!(lines(&tree).is_empty());
}

#[test]
fn test_word_position_and_baseline() {
    let tree = lay_out("<p>hello world</p>", &LayoutConfig::default());
    let line = lines(&tree)[0];
    let children = tree.children(line);
    let (hello, world) = (&tree[children[0]], &tree[children[1]]);

    assert_close(hello.x, 13.0);
    assert_close(hello.width, 48.0);
    // x = previous x + space + previous width.
    assert_close(world.x, 13.0 + 9.6 + 48.0);
    // Baseline at line.y + 1.25 * 12.8; top of each word one ascent above.
    assert_close(hello.y, 18.0 + 16.0 - 12.8);
    assert_close(hello.height, 16.0);
}

#[test]
fn test_mixed_font_sizes_share_a_baseline() {
    let tree = lay_out(
        r#"<p>x <span style="font-size:32px">y</span></p>"#,
        &LayoutConfig::default(),
    );
    let line = lines(&tree)[0];
    let children = tree.children(line);
    let (small, big) = (&tree[children[0]], &tree[children[1]]);

    let baseline = tree[line].y + 1.25 * 25.6;
    assert_close(small.y + 12.8, baseline);
    assert_close(big.y + 25.6, baseline);
    assert_close(tree[line].height, 1.25 * (25.6 + 6.4));
}

#[test]
fn test_long_word_is_not_split() {
    let word = "w".repeat(200);
    let tree = lay_out(&format!("<p>{word}</p>"), &LayoutConfig::default());
    let lines = lines(&tree);
    assert_eq!(lines.len(), 1);
    assert_eq!(words(&tree, lines[0]), vec![word]);
    assert!(tree[tree.children(lines[0])[0]].width > tree[lines[0]].width);
}

#[test]
fn test_words_wrap_at_block_width() {
    // 126 - 2 * 13 leaves a 100px block; each word is 38.4px, a space 9.6px.
    let config = LayoutConfig {
        width: 126.0,
        ..LayoutConfig::default()
    };
    let tree = lay_out("<p>aaaa bbbb cccc</p>", &config);
    let lines = lines(&tree);
    assert_eq!(lines.len(), 2);
    assert_eq!(words(&tree, lines[0]), vec!["aaaa", "bbbb"]);
    assert_eq!(words(&tree, lines[1]), vec!["cccc"]);
    assert_close(tree[lines[1]].y, tree[lines[0]].y + tree[lines[0]].height);
    assert_close(tree[tree.children(lines[1])[0]].x, 13.0);
}

#[test]
fn test_sibling_blocks_stack_without_gaps() {
    let tree = lay_out(
        "<div>one</div><div>two words</div><div><p>a</p><p>b</p></div><div></div>",
        &LayoutConfig::default(),
    );
    let body = of_kind(&tree, |kind| *kind == LayoutKind::Block)
        .into_iter()
        .find(|&id| tree.children(id).len() == 4)
        .expect("body block with four children");
    let children = tree.children(body);
    for pair in children.windows(2) {
        let (first, second) = (&tree[pair[0]], &tree[pair[1]]);
        assert_close(second.y, first.y + first.height);
    }
    let total: f32 = children.iter().map(|&id| tree[id].height).sum();
    assert_close(tree[body].height, total);
    assert_close(tree[children[3]].height, 0.0);
}

#[test]
fn test_br_forces_line_break() {
    let tree = lay_out("<p>a<br>b</p>", &LayoutConfig::default());
    let lines = lines(&tree);
    assert_eq!(lines.len(), 2);
    assert_eq!(words(&tree, lines[0]), vec!["a"]);
    assert_eq!(words(&tree, lines[1]), vec!["b"]);
}

#[test]
fn test_input_is_fixed_width_atomic_box() {
    let tree = lay_out("<p>name <input value=bob> <button>go</button></p>", &LayoutConfig::default());
    let inputs = of_kind(&tree, |kind| *kind == LayoutKind::Input);
    assert_eq!(inputs.len(), 2);
    for &input in &inputs {
        assert_close(tree[input].width, 200.0);
        assert_close(tree[input].height, 16.0);
    }
    // The button's text is drawn by the input box, not laid out as a word.
    assert!(of_kind(&tree, |kind| matches!(kind, LayoutKind::Text { word } if word == "go")).is_empty());
}

#[test]
fn test_heading_font_comes_from_default_stylesheet() {
    let tree = lay_out("<h1>Title</h1>", &LayoutConfig::default());
    let word = of_kind(&tree, |kind| matches!(kind, LayoutKind::Text { .. }))[0];
    let font = tree[word].font.expect("text has a font");
    assert_close(font.size, 32.0);
    assert_eq!(font.weight.to_string(), "bold");
}

#[test]
fn test_hit_test_finds_innermost_box() {
    let styled_tree = styled("<p>hello <a href=x>link</a></p>");
    let tree = layout(&styled_tree, &ApproximateFontMetrics, &LayoutConfig::default());
    let link_word = of_kind(&tree, |kind| matches!(kind, LayoutKind::Text { word } if word == "link"))[0];
    let rect = tree[link_word].rect();

    let hit = tree
        .hit_test(rect.x + 1.0, rect.y + 1.0)
        .expect("point inside a box");
    let parent = styled_tree.parent(hit).expect("text has a parent");
    assert!(styled_tree.is_element(parent, "a"));
    assert!(tree.hit_test(-5.0, -5.0).is_none());
}
