use btedit_core::{label_nodes, serialize_tree, NodeId, OrderingMode, Tree};
use proptest::prelude::*;

// root[l0, s1(l1, s2[l2]), l3]
fn seed_tree() -> Tree {
    let mut tree = Tree::new("root", OrderingMode::Sequence);
    let root = tree.root();
    let l0 = tree.create_leaf("l0");
    tree.insert(l0, root, 0).unwrap();
    let s1 = tree.create_composite("s1", OrderingMode::Selector);
    tree.insert(s1, root, 1).unwrap();
    let l1 = tree.create_leaf("l1");
    tree.insert(l1, s1, 0).unwrap();
    let s2 = tree.create_composite("s2", OrderingMode::Sequence);
    tree.insert(s2, s1, 1).unwrap();
    let l2 = tree.create_leaf("l2");
    tree.insert(l2, s2, 0).unwrap();
    let l3 = tree.create_leaf("l3");
    tree.insert(l3, root, 2).unwrap();
    tree
}

proptest! {
    #[test]
    fn random_edit_scripts_preserve_invariants(
        script in prop::collection::vec(
            (0..4usize, 0..16usize, 0..16usize, 0..8usize),
            0..24,
        )
    ) {
        let mut tree = seed_tree();
        let mut detached: Vec<NodeId> = Vec::new();
        for (step, (op, x, y, index)) in script.into_iter().enumerate() {
            let nodes: Vec<NodeId> = tree.iter().collect();
            let node = nodes[x % nodes.len()];
            let target = nodes[y % nodes.len()];
            let before = serialize_tree(&tree).unwrap();
            let generation = tree.generation();
            let outcome = match op {
                0 => tree.remove(node).map(|_| detached.push(node)),
                1 => {
                    let fresh = detached
                        .pop()
                        .unwrap_or_else(|| tree.create_leaf(format!("fresh{step}")));
                    tree.insert(fresh, target, index).map(|_| ()).map_err(|err| {
                        detached.push(fresh);
                        err
                    })
                }
                2 => tree.move_node(node, target, index).map(|_| ()),
                _ => tree.exchange(node, target).map(|_| ()),
            };
            match outcome {
                Ok(()) => prop_assert_eq!(tree.generation(), generation + 1),
                Err(_) => {
                    // a rejected edit must leave no trace
                    prop_assert_eq!(serialize_tree(&tree).unwrap(), before);
                    prop_assert_eq!(tree.generation(), generation);
                }
            }
            prop_assert!(tree.validate_invariants().is_ok());
        }
        let map = label_nodes(&tree);
        prop_assert_eq!(map.len(), tree.node_count());
    }

    #[test]
    fn exchange_twice_restores_the_tree(x in 0..16usize, y in 0..16usize) {
        let mut tree = seed_tree();
        let nodes: Vec<NodeId> = tree.iter().collect();
        let first = nodes[x % nodes.len()];
        let second = nodes[y % nodes.len()];
        let before = serialize_tree(&tree).unwrap();
        if tree.exchange(first, second).is_ok() {
            tree.exchange(first, second).unwrap();
            prop_assert_eq!(serialize_tree(&tree).unwrap(), before);
        }
        prop_assert!(tree.validate_invariants().is_ok());
    }

    #[test]
    fn remove_then_reinsert_is_identity(x in 0..16usize) {
        let mut tree = seed_tree();
        let nodes: Vec<NodeId> = tree.iter().collect();
        let node = nodes[x % nodes.len()];
        let before = serialize_tree(&tree).unwrap();
        if let Some(parent) = tree.parent(node) {
            let index = tree
                .children(parent)
                .unwrap()
                .iter()
                .position(|child| *child == node)
                .unwrap();
            tree.remove(node).unwrap();
            tree.insert(node, parent, index).unwrap();
            prop_assert_eq!(serialize_tree(&tree).unwrap(), before);
        }
    }
}
