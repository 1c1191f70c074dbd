use approx::assert_relative_eq;
use ovo_scene::{
    Matrix4, SquareMatrix, Vector3, Vector4,
    data_structures::scene_graph::{Node, NodeId, SceneGraph},
};

use crate::common::test_utils::translation;
mod common;

fn origin_of(graph: &SceneGraph, id: NodeId) -> Vector4<f32> {
    graph.world_matrix(id).unwrap() * Vector4::new(0.0, 0.0, 0.0, 1.0)
}

#[test]
fn should_use_local_transform_as_world_for_root() {
    let mut graph = SceneGraph::new();
    let root = graph.insert(Node::group("root").with_transform(translation(1.0, 2.0, 3.0)));
    assert_eq!(graph.world_matrix(root), graph.local_transform(root));
}

#[test]
fn should_compose_world_matrix_through_parents() {
    let mut graph = SceneGraph::new();
    let root = graph.insert(Node::group("root"));
    let child = graph.insert(Node::group("child"));
    assert!(graph.add_child(root, child));

    graph.translate(root, Vector3::new(10.0, 0.0, 0.0));
    graph.translate(child, Vector3::new(0.0, 5.0, 0.0));

    assert_relative_eq!(origin_of(&graph, child), Vector4::new(10.0, 5.0, 0.0, 1.0));
}

#[test]
fn should_see_local_edits_without_caching() {
    let mut graph = SceneGraph::new();
    let root = graph.insert(Node::group("root"));
    let child = graph.insert(Node::group("child").with_transform(translation(0.0, 1.0, 0.0)));
    graph.add_child(root, child);
    assert_relative_eq!(origin_of(&graph, child), Vector4::new(0.0, 1.0, 0.0, 1.0));

    graph.set_local_transform(root, translation(0.0, 0.0, -4.0));
    assert_relative_eq!(origin_of(&graph, child), Vector4::new(0.0, 1.0, -4.0, 1.0));
}

#[test]
fn should_post_multiply_rotate_and_scale() {
    let mut graph = SceneGraph::new();
    let node = graph.insert(Node::group("node"));
    graph.translate(node, Vector3::new(1.0, 0.0, 0.0));
    graph.rotate(node, 90.0, Vector3::new(0.0, 0.0, 1.0));
    graph.scale(node, Vector3::new(2.0, 2.0, 2.0));

    // local x axis: scaled by 2, rotated onto +y, then moved by +1 on x
    let tip = graph.world_matrix(node).unwrap() * Vector4::new(1.0, 0.0, 0.0, 1.0);
    assert_relative_eq!(tip, Vector4::new(1.0, 2.0, 0.0, 1.0), epsilon = 1e-5);
}

#[test]
fn should_ignore_rotation_around_zero_axis() {
    let mut graph = SceneGraph::new();
    let node = graph.insert(Node::group("node"));
    graph.rotate(node, 45.0, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(graph.local_transform(node), Some(Matrix4::identity()));
}

#[test]
fn should_restore_parentless_state_after_remove_child() {
    let mut graph = SceneGraph::new();
    let parent = graph.insert(Node::group("parent"));
    let child = graph.insert(Node::group("child"));

    graph.add_child(parent, child);
    assert_eq!(graph.num_children(parent), 1);
    assert_eq!(graph.parent(child), Some(parent));
    assert_eq!(graph.child(parent, 0), Some(child));

    assert!(graph.remove_child(parent, child));
    assert_eq!(graph.num_children(parent), 0);
    assert_eq!(graph.parent(child), None);
    assert_eq!(graph.child(parent, 0), None);
}

#[test]
fn should_not_fail_when_removing_absent_child() {
    let mut graph = SceneGraph::new();
    let parent = graph.insert(Node::group("parent"));
    let stranger = graph.insert(Node::group("stranger"));
    assert!(!graph.remove_child(parent, stranger));
    assert_eq!(graph.num_children(parent), 0);
}

#[test]
fn should_move_child_to_new_parent() {
    let mut graph = SceneGraph::new();
    let a = graph.insert(Node::group("a"));
    let b = graph.insert(Node::group("b"));
    let child = graph.insert(Node::group("child"));

    graph.add_child(a, child);
    graph.add_child(b, child);

    assert_eq!(graph.num_children(a), 0);
    assert_eq!(graph.children(b), &[child]);
    assert_eq!(graph.parent(child), Some(b));
}

#[test]
fn should_refuse_cycles() {
    let mut graph = SceneGraph::new();
    let a = graph.insert(Node::group("a"));
    let b = graph.insert(Node::group("b"));
    graph.add_child(a, b);

    assert!(!graph.add_child(b, a));
    assert!(!graph.add_child(a, a));
    assert_eq!(graph.parent(a), None);
    assert_eq!(graph.children(b), &[] as &[NodeId]);
}

#[test]
fn should_find_nodes_by_name_in_chain() {
    let mut graph = SceneGraph::new();
    let a = graph.insert(Node::group("A"));
    let b = graph.insert(Node::group("B"));
    let c = graph.insert(Node::group("C"));
    graph.add_child(a, b);
    graph.add_child(b, c);

    assert_eq!(graph.find_by_name(a, "A"), Some(a));
    assert_eq!(graph.find_by_name(a, "B"), Some(b));
    assert_eq!(graph.find_by_name(a, "C"), Some(c));
    assert_eq!(graph.find_by_name(a, "D"), None);
    assert_eq!(graph.find_by_name(b, "A"), None);
}

#[test]
fn should_find_first_match_in_pre_order() {
    let mut graph = SceneGraph::new();
    let root = graph.insert(Node::group("root"));
    let left = graph.insert(Node::group("left"));
    let deep = graph.insert(Node::group("twin"));
    let right = graph.insert(Node::group("twin"));
    graph.add_child(root, left);
    graph.add_child(left, deep);
    graph.add_child(root, right);

    assert_eq!(graph.find_by_name(root, "twin"), Some(deep));
    assert_eq!(graph.walk(root).collect::<Vec<_>>(), vec![root, left, deep, right]);
}

#[test]
fn should_hand_out_increasing_ids() {
    let first = Node::group("first");
    let second = Node::group("second");
    assert!(second.id() > first.id());
    assert_eq!(first.name(), "first");
}

#[test]
fn should_free_whole_subtree() {
    let mut graph = SceneGraph::new();
    let root = graph.insert(Node::group("root"));
    let branch = graph.insert(Node::group("branch"));
    let leaf = graph.insert(Node::group("leaf"));
    graph.add_child(root, branch);
    graph.add_child(branch, leaf);

    assert_eq!(graph.remove_subtree(branch), 2);
    assert_eq!(graph.len(), 1);
    assert!(!graph.contains(leaf));
    assert_eq!(graph.num_children(root), 0);
    assert_eq!(graph.world_matrix(leaf), None);
}

#[test]
fn should_invert_camera_world_matrix() {
    let mut graph = SceneGraph::new();
    let camera = graph.insert(Node::group("camera").with_transform(translation(0.0, 0.0, 5.0)));
    let view = graph.inverse_camera_matrix(camera).unwrap();
    let seen = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_relative_eq!(seen, Vector4::new(0.0, 0.0, -5.0, 1.0));

    graph.set_local_transform(camera, Matrix4::from_scale(0.0));
    assert_eq!(graph.inverse_camera_matrix(camera), None);
}
