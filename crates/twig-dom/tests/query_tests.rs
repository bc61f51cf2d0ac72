//! Tests for navigation, search and export over hand-built trees.

use std::io::{self, Write};

use twig_dom::{
    AttributesMap, DOCUMENT_TAG_NAME, DomError, DomTree, ElementData, ExportError,
    MAX_RECORD_DEPTH, NodeId, NodeType, to_json, to_json_pretty, to_record, tree_to_string,
    write_json, write_json_to_file, write_tree, write_tree_to_file,
};

fn attrs(pairs: &[(&str, &str)]) -> AttributesMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn element(tree: &mut DomTree, parent: NodeId, tag: &str, pairs: &[(&str, &str)]) -> NodeId {
    tree.create_child(parent, NodeType::Element(ElementData::new(tag, attrs(pairs))))
        .unwrap()
}

/// A chain of `depth` nested `div` elements under the root.
fn deep_chain(depth: usize) -> DomTree {
    let mut tree = DomTree::new();
    let mut cursor = NodeId::ROOT;
    for _ in 0..depth {
        cursor = element(&mut tree, cursor, "div", &[]);
    }
    tree
}

/// Counts what is written without keeping it.
#[derive(Default)]
struct Tally {
    bytes: usize,
    lines: usize,
}

impl Write for Tally {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes += buf.len();
        self.lines += buf.iter().filter(|&&b| b == b'\n').count();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// document > ul#list > (li.item.first, li.item#x), span#x
fn sample() -> (DomTree, [NodeId; 4]) {
    let mut tree = DomTree::new();
    let ul = element(&mut tree, NodeId::ROOT, "ul", &[("id", "list")]);
    let li1 = element(&mut tree, ul, "li", &[("class", "item  first")]);
    let li2 = element(&mut tree, ul, "li", &[("class", "item"), ("id", "x")]);
    let span = element(&mut tree, NodeId::ROOT, "span", &[("id", "x"), ("hidden", "")]);
    (tree, [ul, li1, li2, span])
}

#[test]
fn test_root_is_document() {
    let tree = DomTree::new();
    assert_eq!(tree.root(), NodeId::ROOT);
    assert_eq!(tree.tag_name(NodeId::ROOT), Some(DOCUMENT_TAG_NAME));
    assert_eq!(tree.parent(NodeId::ROOT), None);
    assert!(tree.children(NodeId::ROOT).is_empty());
    assert_eq!(tree.document_element(), None);
}

#[test]
fn test_descendants_pre_order() {
    let (tree, [ul, li1, li2, span]) = sample();
    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![NodeId::ROOT, ul, li1, li2, span]);
    assert_eq!(tree.depth(li2), 2);
    assert_eq!(tree.ancestors(li2).collect::<Vec<_>>(), vec![ul, NodeId::ROOT]);
    assert!(tree.is_descendant_of(li1, NodeId::ROOT));
    assert!(!tree.is_descendant_of(span, ul));
}

#[test]
fn test_find_by_tag_is_case_insensitive() {
    let (tree, [_, li1, li2, _]) = sample();
    assert_eq!(tree.find_by_tag(NodeId::ROOT, "LI"), vec![li1, li2]);
    assert_eq!(tree.find_by_tag(NodeId::ROOT, "document"), vec![NodeId::ROOT]);
    assert!(tree.find_by_tag(NodeId::ROOT, "table").is_empty());
}

#[test]
fn test_find_by_attribute() {
    let (tree, [ul, _, li2, span]) = sample();
    assert_eq!(tree.find_by_attribute(NodeId::ROOT, "id", None), vec![ul, li2, span]);
    assert_eq!(tree.find_by_attribute(NodeId::ROOT, "id", Some("x")), vec![li2, span]);
    assert_eq!(tree.find_by_attribute(NodeId::ROOT, "hidden", Some("")), vec![span]);
    assert!(tree.find_by_attribute(NodeId::ROOT, "ID", None).is_empty());
}

#[test]
fn test_find_by_class_splits_on_whitespace() {
    let (tree, [_, li1, li2, _]) = sample();
    assert_eq!(tree.find_by_class(NodeId::ROOT, "item"), vec![li1, li2]);
    assert_eq!(tree.find_by_class(NodeId::ROOT, "first"), vec![li1]);
    assert!(tree.find_by_class(NodeId::ROOT, "item  first").is_empty());
    let classes = tree.as_element(li1).unwrap().classes();
    assert_eq!(classes.into_iter().collect::<Vec<_>>(), vec!["first", "item"]);
}

#[test]
fn test_id_lookup_and_index() {
    let (tree, [ul, _, li2, span]) = sample();
    assert_eq!(tree.find_by_id(NodeId::ROOT, "x"), Some(li2));
    assert_eq!(tree.find_by_id(span, "x"), Some(span));
    assert_eq!(tree.find_by_id(NodeId::ROOT, "missing"), None);

    let index = tree.id_index(NodeId::ROOT);
    assert_eq!(index.len(), 2);
    assert_eq!(index["list"], ul);
    // Last element carrying a duplicate id wins.
    assert_eq!(index["x"], span);
}

#[test]
fn test_text_content_concatenates() {
    let mut tree = DomTree::new();
    let p = element(&mut tree, NodeId::ROOT, "p", &[]);
    let _ = tree.create_child(p, NodeType::Text("Hello, ".to_string())).unwrap();
    let b = element(&mut tree, p, "b", &[]);
    let _ = tree.create_child(b, NodeType::Text("world".to_string())).unwrap();

    assert_eq!(tree.text_content(p), "Hello, world");
    assert_eq!(tree.tag_name(tree.children(b)[0]), None);
}

#[test]
fn test_tree_to_string_format() {
    let mut tree = DomTree::new();
    let a = element(&mut tree, NodeId::ROOT, "a", &[("href", "x"), ("class", "y z")]);
    let _ = element(&mut tree, a, "img", &[]);

    assert_eq!(
        tree_to_string(&tree, NodeId::ROOT),
        "document\n    a (href=\"x\", class=\"y z\")\n        img\n"
    );
}

#[test]
fn test_find_by_id_with_duplicates_takes_first_in_pre_order() {
    let mut tree = DomTree::new();
    let outer = element(&mut tree, NodeId::ROOT, "div", &[]);
    let nested = element(&mut tree, outer, "p", &[("id", "dup")]);
    let _ = element(&mut tree, NodeId::ROOT, "p", &[("id", "dup")]);

    assert_eq!(tree.find_by_id(NodeId::ROOT, "dup"), Some(nested));
    assert_eq!(tree.find_by_attribute(NodeId::ROOT, "id", Some("dup")).len(), 2);
}

#[test]
fn test_create_child_under_unknown_parent_fails() {
    let mut tree = DomTree::new();
    let result = tree.create_child(NodeId(42), NodeType::Text("x".to_string()));
    assert!(matches!(result, Err(DomError::UnknownNode(NodeId(42)))));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_attribute_edit_shows_in_output() {
    let mut tree = DomTree::new();
    let a = element(&mut tree, NodeId::ROOT, "a", &[("href", "x")]);

    let data = tree.as_element_mut(a).unwrap();
    let _ = data.attrs.insert("rel".to_string(), "next".to_string());
    let _ = data.attrs.insert("href".to_string(), "y".to_string());

    assert_eq!(tree_to_string(&tree, a), "a (href=\"y\", rel=\"next\")\n");
    assert!(tree.as_element_mut(NodeId::ROOT).is_none());
}

#[test]
fn test_record_omits_empty_children() {
    let (tree, [_, li1, _, _]) = sample();
    let json: serde_json::Value =
        serde_json::from_str(&to_json(&tree, li1).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "tagName": "li",
            "attributes": { "class": "item  first" }
        })
    );

    let root = to_record(&tree, NodeId::ROOT).unwrap();
    assert_eq!(root.tag_name, "document");
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[0].children.len(), 2);
    assert!(matches!(
        to_record(&tree, NodeId(99)),
        Err(ExportError::UnknownNode(NodeId(99)))
    ));
    assert!(matches!(
        to_json(&tree, NodeId(99)),
        Err(ExportError::UnknownNode(NodeId(99)))
    ));
}

#[test]
fn test_streamed_json_matches_record_serialization() {
    let (mut tree, [_, li1, _, _]) = sample();
    let _ = tree
        .create_child(li1, NodeType::Text("say \"hi\"\n".to_string()))
        .unwrap();
    let record = to_record(&tree, NodeId::ROOT).unwrap();

    assert_eq!(
        to_json(&tree, NodeId::ROOT).unwrap(),
        serde_json::to_string(&record).unwrap()
    );
    assert_eq!(
        to_json_pretty(&tree, NodeId::ROOT).unwrap(),
        serde_json::to_string_pretty(&record).unwrap()
    );
}

#[test]
fn test_text_record() {
    let mut tree = DomTree::new();
    let p = element(&mut tree, NodeId::ROOT, "p", &[]);
    let _ = tree.create_child(p, NodeType::Text("hi".to_string())).unwrap();

    let json: serde_json::Value = serde_json::from_str(&to_json(&tree, p).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "tagName": "p",
            "attributes": {},
            "children": [{ "tagName": "#text", "attributes": {}, "text": "hi" }]
        })
    );
}

#[test]
fn test_file_output() {
    let (tree, _) = sample();
    let dir = std::env::temp_dir().join(format!("twig-dom-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let text_path = dir.join("tree.txt");
    write_tree_to_file(&tree, NodeId::ROOT, &text_path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&text_path).unwrap(),
        tree_to_string(&tree, NodeId::ROOT)
    );

    let json_path = dir.join("tree.json");
    write_json_to_file(&tree, NodeId::ROOT, &json_path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["children"][1]["tagName"], "span");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_file_output_to_missing_directory_fails() {
    let (tree, _) = sample();
    let path = std::env::temp_dir()
        .join("twig-definitely-missing-dir")
        .join("nested")
        .join("tree.txt");
    assert!(write_tree_to_file(&tree, NodeId::ROOT, path).is_err());
}

// =============================================================================
// Deep nesting
// =============================================================================

#[test]
fn test_deep_tree_renders_as_text() {
    let depth = 20_000;
    let tree = deep_chain(depth);

    let mut tally = Tally::default();
    write_tree(&tree, NodeId::ROOT, &mut tally).unwrap();
    assert_eq!(tally.lines, depth + 1);
    // "document\n", then "div\n" behind 4 spaces per level.
    let indent: usize = (1..=depth).map(|level| level * 4).sum();
    assert_eq!(tally.bytes, "document\n".len() + depth * "div\n".len() + indent);
}

#[test]
fn test_deep_tree_streams_as_json() {
    let depth = 20_000;
    let tree = deep_chain(depth);

    let json = to_json(&tree, NodeId::ROOT).unwrap();
    let head = r#"{"tagName":"document","attributes":{},"children":[{"tagName":"div""#;
    let tail = format!(r#"{{"tagName":"div","attributes":{{}}}}{}"#, "]}".repeat(depth));
    assert!(json.starts_with(head));
    assert!(json.ends_with(&tail));
    assert_eq!(json.matches(r#"{"tagName":"div""#).count(), depth);

    write_json(&tree, NodeId::ROOT, &mut io::sink(), true).unwrap();
}

#[test]
fn test_deep_tree_record_is_refused() {
    let tree = deep_chain(20_000);
    match to_record(&tree, NodeId::ROOT) {
        Err(ExportError::TooDeep { node, limit }) => {
            assert_eq!(limit, MAX_RECORD_DEPTH);
            assert_eq!(tree.depth(node), MAX_RECORD_DEPTH + 1);
        }
        other => panic!("expected TooDeep, got {other:?}"),
    }
}

#[test]
fn test_record_at_depth_limit() {
    let tree = deep_chain(MAX_RECORD_DEPTH);
    let mut record = &to_record(&tree, NodeId::ROOT).unwrap();
    let mut levels = 0;
    while let Some(child) = record.children.first() {
        record = child;
        levels += 1;
    }
    assert_eq!(levels, MAX_RECORD_DEPTH);
}
