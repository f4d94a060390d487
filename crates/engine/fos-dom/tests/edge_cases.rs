//! Edge case and stress tests for fos-dom
//!
//! These tests cover rare scenarios, boundary conditions, and stress testing.

use fos_dom::{ClassList, Document, Rect, StyleMap, TimingRule};

// ============================================================================
// CLASS LIST EDGE CASES
// ============================================================================

#[test]
fn test_class_list_whitespace_only() {
    let list = ClassList::parse("   \t\n ");
    assert!(list.is_empty());
    assert_eq!(list.value(), "");
}

#[test]
fn test_class_list_unicode_tokens() {
    let mut list = ClassList::new();
    list.add("über 世界 🚀");
    assert_eq!(list.len(), 3);
    assert!(list.contains("世界"));
    list.remove("🚀");
    assert_eq!(list.value(), "über 世界");
}

#[test]
fn test_class_list_many_tokens() {
    let mut list = ClassList::new();
    for i in 0..1_000 {
        list.add(&format!("c{}", i));
    }
    list.add("c0 c999");
    assert_eq!(list.len(), 1_000);
}

// ============================================================================
// TREE EDGE CASES
// ============================================================================

#[test]
fn test_tree_deep_nesting() {
    let doc = Document::new();

    let mut parent = doc.body();
    for _ in 0..100 {
        let child = doc.create_element("div");
        parent.append_child(&child).unwrap();
        parent = child;
    }

    assert_eq!(parent.ancestors().len(), 100);
    assert!(doc.body().contains(&parent));
}

#[test]
fn test_reparent_moves_node() {
    let doc = Document::new();
    let a = doc.create_element("section");
    let b = doc.create_element("section");
    let item = doc.create_element("p");
    doc.body().append_child(&a).unwrap();
    doc.body().append_child(&b).unwrap();

    a.append_child(&item).unwrap();
    b.append_child(&item).unwrap();

    assert!(a.children().is_empty());
    assert_eq!(b.children(), vec![item.clone()]);
    assert_eq!(item.parent(), Some(b));
}

#[test]
fn test_remove_detached_is_noop() {
    let doc = Document::new();
    let el = doc.create_element("div");
    el.remove();
    el.remove();
    assert!(!el.has_parent());
}

#[test]
fn test_descendants_with_attribute_document_order() {
    let doc = Document::new();
    let root = doc.create_element("div");
    let first = doc.create_element("span");
    let nested = doc.create_element("em");
    let second = doc.create_element("span");
    first.set_attribute("data-ref", "a");
    nested.set_attribute("data-ref", "b");
    second.set_attribute("data-ref", "c");
    root.append_child(&first).unwrap();
    first.append_child(&nested).unwrap();
    root.append_child(&second).unwrap();

    let refs: Vec<String> = root
        .descendants_with_attribute("data-ref")
        .iter()
        .filter_map(|e| e.attribute("data-ref"))
        .collect();
    assert_eq!(refs, vec!["a", "b", "c"]);
}

// ============================================================================
// STYLE AND TIMING EDGE CASES
// ============================================================================

#[test]
fn test_styles_overlay() {
    let doc = Document::new();
    let el = doc.create_element("div");
    el.set_styles(&StyleMap::from_pairs(&[("top", "0px"), ("left", "0px")]));
    el.set_styles(&StyleMap::from_pairs(&[("top", "10px")]));
    assert_eq!(el.style("top").as_deref(), Some("10px"));
    assert_eq!(el.styles().len(), 2);
}

#[test]
fn test_empty_selector_never_matches() {
    let doc = Document::new();
    doc.add_timing_rule(TimingRule::new("").transition(5.0, 0.0));
    let el = doc.create_element("div");
    el.add_class("anything");
    assert!(!el.computed_timings().has_duration());
}

#[test]
fn test_detached_document_timings_default() {
    let el = {
        let doc = Document::new();
        doc.add_timing_rule(TimingRule::new(".fade").transition(1.0, 0.0));
        let el = doc.create_element("div");
        el.add_class("fade");
        el
    };
    assert_eq!(el.computed_timings().max_duration(), 0.0);
}

#[test]
fn test_rect_roundtrip_on_clone() {
    let doc = Document::new();
    let el = doc.create_element("div");
    el.set_bounding_rect(Rect::new(1.5, 2.5, 30.0, 40.0));
    assert_eq!(el.clone_node(false).bounding_rect(), el.bounding_rect());
}
