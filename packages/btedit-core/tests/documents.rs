use btedit_core::{
    deserialize_tree, layout, serialize_tree, BehaviorLibrary, DocumentNode, Error, LibraryEntry,
    OrderingMode, TemplateKind, Tree,
};

fn library() -> BehaviorLibrary {
    BehaviorLibrary::new(vec![
        LibraryEntry::new("seq-root", "Greeting sequence", TemplateKind::Sequence),
        LibraryEntry::new("sel-0", "Pick greeting", TemplateKind::Selector),
        LibraryEntry::new("b-wave", "Wave hello", TemplateKind::Behavior),
        LibraryEntry::new("b-say", "Say hello", TemplateKind::Behavior),
        LibraryEntry::new("b-bow", "Bow", TemplateKind::Behavior),
    ])
    .unwrap()
}

const GREETING_DOC: &str = r#"{
    "type": "Sequence",
    "name": "Greeting sequence",
    "children": [
        {"type": "Behavior", "name": "Wave hello"},
        {
            "type": "Selector",
            "name": "Pick greeting",
            "children": [{"type": "Behavior", "name": "Say hello"}]
        }
    ]
}"#;

#[test]
fn documents_deserialize_into_the_expected_shape() {
    let doc = DocumentNode::from_json(GREETING_DOC).unwrap();
    let tree = deserialize_tree(&doc, &library()).unwrap();
    assert_eq!(
        layout(&tree),
        "[-] Greeting sequence\n    --> Wave hello\n    [o] Pick greeting\n        --> Say hello"
    );
    tree.validate_invariants().unwrap();
}

#[test]
fn serialize_then_deserialize_is_a_fixpoint() {
    let library = library();
    let doc = DocumentNode::from_json(GREETING_DOC).unwrap();
    let once = serialize_tree(&deserialize_tree(&doc, &library).unwrap()).unwrap();
    let twice = serialize_tree(&deserialize_tree(&once, &library).unwrap()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn deserialization_normalizes_identity_from_the_library() {
    // the document's own identity fields are noise; the library wins
    let doc = DocumentNode::from_json(
        r#"{
            "type": "Sequence",
            "name": "Greeting sequence",
            "display_name": "Greeting sequence (renamed)",
            "id_": "stale-id",
            "children": [{"type": "Behavior", "name": "Bow"}]
        }"#,
    )
    .unwrap();
    let tree = deserialize_tree(&doc, &library()).unwrap();
    let root = tree.root();
    assert_eq!(tree.name(root), Some("Greeting sequence"));
    assert_eq!(tree.display_name(root), Some("Greeting sequence"));
    assert_eq!(
        tree.persistent_id(root).map(|id| id.as_str()),
        Some("seq-root")
    );
    let bow = tree.children(root).unwrap()[0];
    assert_eq!(tree.persistent_id(bow).map(|id| id.as_str()), Some("b-bow"));
}

#[test]
fn nodes_resolve_by_name_not_display_name() {
    // "Say hello" is itself a catalog name; it must still lose to `name`
    let doc = DocumentNode::from_json(
        r#"{"type": "Behavior", "name": "Wave hello", "display_name": "Say hello"}"#,
    )
    .unwrap();
    let tree = deserialize_tree(&doc, &library()).unwrap();
    let root = tree.root();
    assert_eq!(tree.name(root), Some("Wave hello"));
    assert_eq!(
        tree.persistent_id(root).map(|id| id.as_str()),
        Some("b-wave")
    );
}

#[test]
fn unknown_names_fail_the_whole_document() {
    let doc = DocumentNode::from_json(
        r#"{
            "type": "Sequence",
            "name": "Greeting sequence",
            "children": [{"type": "Behavior", "name": "Moonwalk"}]
        }"#,
    )
    .unwrap();
    match deserialize_tree(&doc, &library()) {
        Err(Error::UnknownBehavior(name)) => assert_eq!(name, "Moonwalk"),
        other => panic!("expected an unknown behavior error, got {other:?}"),
    }
}

#[test]
fn behaviors_with_children_are_malformed() {
    let doc = DocumentNode::from_json(
        r#"{
            "type": "Behavior",
            "name": "Wave hello",
            "children": [{"type": "Behavior", "name": "Bow"}]
        }"#,
    )
    .unwrap();
    assert!(matches!(
        deserialize_tree(&doc, &library()),
        Err(Error::MalformedDocument(_))
    ));
}

#[test]
fn unrecognized_node_types_are_malformed() {
    let doc = DocumentNode::from_json(r#"{"type": "Parallel", "name": "P"}"#).unwrap();
    assert!(matches!(
        deserialize_tree(&doc, &library()),
        Err(Error::MalformedDocument(_))
    ));
}

#[test]
fn empty_composites_serialize_without_a_children_key() {
    let tree = Tree::new("Greeting sequence", OrderingMode::Sequence);
    let json = serialize_tree(&tree).unwrap().to_json().unwrap();
    assert!(!json.contains("children"));
}

#[test]
fn composites_without_a_children_key_deserialize_empty() {
    let doc =
        DocumentNode::from_json(r#"{"type": "Sequence", "name": "Greeting sequence"}"#).unwrap();
    let tree = deserialize_tree(&doc, &library()).unwrap();
    assert_eq!(tree.node_count(), 1);
    assert!(tree.is_composite(tree.root()));
}

#[test]
fn a_lone_behavior_is_a_legal_document() {
    let doc = DocumentNode::from_json(r#"{"type": "Behavior", "name": "Bow"}"#).unwrap();
    let tree = deserialize_tree(&doc, &library()).unwrap();
    assert_eq!(tree.node_count(), 1);
    assert!(!tree.is_composite(tree.root()));
    assert_eq!(layout(&tree), "--> Bow");
}

#[test]
fn selector_documents_round_trip() {
    let doc = DocumentNode::from_json(
        r#"{
            "type": "Selector",
            "name": "Pick greeting",
            "children": [
                {"type": "Behavior", "name": "Wave hello"},
                {"type": "Behavior", "name": "Say hello"}
            ]
        }"#,
    )
    .unwrap();
    let library = library();
    let tree = deserialize_tree(&doc, &library).unwrap();
    assert_eq!(tree.kind(tree.root()).map(|k| k.type_name()), Some("Selector"));
    let serialized = serialize_tree(&tree).unwrap();
    assert_eq!(serialized.node_type, "Selector");
    assert_eq!(serialized.children.len(), 2);
    let reloaded = deserialize_tree(&serialized, &library).unwrap();
    assert_eq!(layout(&reloaded), layout(&tree));
}
