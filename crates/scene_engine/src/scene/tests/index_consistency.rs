//! Index membership against node state across tree mutations

use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec2;
use crate::scene::{Dimension, Node, NodeStatus, SceneTree, MAX_CAMERA_GROUP_COUNT};

/// Registered drawables are indexed under their current keys, nothing else is.
fn assert_indices_match_nodes(tree: &SceneTree) {
    for (id, node) in tree.iter() {
        let Some(drawn) = node.drawn() else {
            continue;
        };
        let index = tree.indices().drawn(drawn.dimension());
        let indexed = matches!(node.status(), NodeStatus::Registered | NodeStatus::WaitingRemoved);

        assert_eq!(index.is_registered(id), indexed, "{id:?} in status {:?}", node.status());
        if !indexed {
            continue;
        }
        assert!(index.bucket(None, drawn.z_order()).is_some_and(|b| b.contains(&id)));
        for group in 0..MAX_CAMERA_GROUP_COUNT {
            let expected = (drawn.camera_group() >> group) & 1 == 1;
            assert_eq!(index.contains(id, Some(group)), expected, "{id:?} group {group}");
        }
    }
}

fn sprite(z_order: i32, camera_group: u64) -> Node {
    Node::sprite(None, Vec2::new(1.0, 1.0))
        .with_z_order(z_order)
        .with_camera_group(camera_group)
}

#[test]
fn test_reparenting_keeps_membership() {
    let mut tree = SceneTree::new();
    let root = tree.root();
    let left = tree.insert(Node::group());
    let right = tree.insert(Node::group());
    let leaves: Vec<NodeId> = (0..4).map(|i| tree.insert(sprite(i, 1 << i))).collect();

    tree.add_child(root, left).unwrap();
    tree.add_child(root, right).unwrap();
    for &leaf in &leaves {
        tree.add_child(left, leaf).unwrap();
    }
    tree.flush_queue().unwrap();
    assert_indices_match_nodes(&tree);
    assert_eq!(tree.indices().drawn(Dimension::TwoD).len(), 4);

    // move two leaves across; the detach lands before the re-attach
    for &leaf in &leaves[..2] {
        tree.remove_child(left, leaf).unwrap();
        assert_indices_match_nodes(&tree);
    }
    tree.flush_queue().unwrap();
    for &leaf in &leaves[..2] {
        tree.add_child(right, leaf).unwrap();
    }
    tree.set_z_order(leaves[0], 50).unwrap();
    tree.set_camera_group(leaves[1], 0).unwrap();
    assert_indices_match_nodes(&tree);

    tree.flush_queue().unwrap();
    assert_indices_match_nodes(&tree);
    assert_eq!(tree.get(leaves[0]).unwrap().parent(), Some(right));
    assert_eq!(tree.indices().drawn(Dimension::TwoD).elements(Some(1)).count(), 0);
}

#[test]
fn test_detached_subtree_edits_apply_on_reattach() {
    let mut tree = SceneTree::new();
    let root = tree.root();
    let group = tree.insert(Node::group());
    let a = tree.insert(sprite(0, 0b1));
    let b = tree.insert(Node::mesh(3).with_camera_group(0b10));
    tree.add_child(group, a).unwrap();
    tree.add_child(group, b).unwrap();
    tree.add_child(root, group).unwrap();
    tree.flush_queue().unwrap();

    tree.remove_child(root, group).unwrap();
    tree.flush_queue().unwrap();
    assert_indices_match_nodes(&tree);

    // edits while detached touch only the node
    tree.set_z_order(a, -3).unwrap();
    tree.set_camera_group(b, 0b1000).unwrap();
    assert_indices_match_nodes(&tree);

    tree.add_child(root, group).unwrap();
    tree.flush_queue().unwrap();
    assert_indices_match_nodes(&tree);
    assert!(tree.indices().drawn(Dimension::TwoD).bucket(Some(0), -3).is_some_and(|b| b.contains(&a)));
    assert!(tree.indices().drawn(Dimension::ThreeD).contains(b, Some(3)));
}

#[test]
fn test_attach_then_remove_within_one_flush_window() {
    let mut tree = SceneTree::new();
    let root = tree.root();
    let parent = tree.insert(Node::group());
    tree.add_child(root, parent).unwrap();
    tree.flush_queue().unwrap();

    let child = tree.insert(sprite(1, 0b1));
    tree.add_child(parent, child).unwrap();
    // parent leaves before the child's attach is applied
    tree.remove_child(root, parent).unwrap();
    tree.flush_queue().unwrap();

    assert_indices_match_nodes(&tree);
    assert_eq!(tree.get(child).unwrap().status(), NodeStatus::Free);
    assert!(tree.indices().drawn(Dimension::TwoD).is_empty());

    tree.add_child(root, parent).unwrap();
    tree.flush_queue().unwrap();
    assert!(tree.indices().drawn(Dimension::TwoD).contains(child, Some(0)));
}
