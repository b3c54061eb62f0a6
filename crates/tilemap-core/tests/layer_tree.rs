use pretty_assertions::assert_eq;
use tilemap_core::{
    IdAllocator, LayerId, LayerKind, LayerNode, LayerTree, MatrixExtent, ObjectLayer, TileFormat,
    TileLayer, TileMatrix, TilePos,
};

fn tile_node(format: TileFormat) -> LayerNode {
    LayerNode::tile(TileLayer::new(format, MatrixExtent::new(5, 5)).unwrap())
}

fn object_node() -> LayerNode {
    LayerNode::object(ObjectLayer::new())
}

struct Hierarchy {
    tree: LayerTree,
    g1: LayerId,
    g2: LayerId,
    g3: LayerId,
    g4: LayerId,
    t1: LayerId,
    t2: LayerId,
    t3: LayerId,
    t4: LayerId,
    o1: LayerId,
    o2: LayerId,
    o3: LayerId,
    o4: LayerId,
}

/// ```text
/// t1
/// g1
///   g2
///     o1
///     g3
///     o2
///   t2
///   g4
///     o3
///   t3
/// o4
/// t4
/// ```
fn hierarchy() -> Hierarchy {
    let mut tree = LayerTree::new();
    let t1 = tree.insert(None, tile_node(TileFormat::Dense), 0);
    let g1 = tree.insert(None, LayerNode::group(), 1);
    let g2 = tree.insert(Some(g1), LayerNode::group(), 0);
    let o1 = tree.insert(Some(g2), object_node(), 0);
    let g3 = tree.insert(Some(g2), LayerNode::group(), 1);
    let o2 = tree.insert(Some(g2), object_node(), 2);
    let t2 = tree.insert(Some(g1), tile_node(TileFormat::Dense), 1);
    let g4 = tree.insert(Some(g1), LayerNode::group(), 2);
    let o3 = tree.insert(Some(g4), object_node(), 0);
    let t3 = tree.insert(Some(g1), tile_node(TileFormat::Sparse), 3);
    let o4 = tree.insert(None, object_node(), 2);
    let t4 = tree.insert(None, tile_node(TileFormat::Sparse), 3);

    Hierarchy {
        tree,
        g1,
        g2,
        g3,
        g4,
        t1,
        t2,
        t3,
        t4,
        o1,
        o2,
        o3,
        o4,
    }
}

fn global_order(tree: &LayerTree, layers: &[LayerId]) -> Vec<usize> {
    layers.iter().map(|id| tree.global_index(*id)).collect()
}

/// Local indices of every sibling set must be exactly `0..n`.
fn assert_dense_local_indices(tree: &LayerTree) {
    let mut sets: Vec<Vec<LayerId>> = vec![tree.top_level().to_vec()];
    for (id, node) in tree.iter() {
        if node.kind() == LayerKind::Group {
            sets.push(tree.children(id).to_vec());
        }
    }
    for set in sets {
        let locals: Vec<usize> = set.iter().map(|id| tree.local_index(*id)).collect();
        let expected: Vec<usize> = (0..set.len()).collect();
        assert_eq!(locals, expected);
    }
}

#[test]
fn test_hierarchy_global_indices() {
    let h = hierarchy();
    assert_eq!(h.tree.len(), 12);
    assert_eq!(
        global_order(
            &h.tree,
            &[h.t1, h.g1, h.g2, h.o1, h.g3, h.o2, h.t2, h.g4, h.o3, h.t3, h.o4, h.t4]
        ),
        (0..12).collect::<Vec<_>>()
    );
    assert_eq!(
        h.tree.ids(),
        &[h.t1, h.g1, h.g2, h.o1, h.g3, h.o2, h.t2, h.g4, h.o3, h.t3, h.o4, h.t4]
    );
    assert_dense_local_indices(&h.tree);
}

#[test]
fn test_insert_top_level() {
    let mut h = hierarchy();

    let front = h.tree.insert(None, object_node(), 0);
    assert_eq!(h.tree.len(), 13);
    assert_eq!(h.tree.local_index(front), 0);
    assert_eq!(h.tree.global_index(front), 0);

    let middle = h.tree.insert(None, object_node(), 3);
    assert_eq!(h.tree.local_index(middle), 3);
    assert_eq!(h.tree.global_index(middle), 11);

    let back = h.tree.insert(None, object_node(), h.tree.top_level().len());
    assert_eq!(h.tree.global_index(back), h.tree.len() - 1);
    assert_dense_local_indices(&h.tree);
}

#[test]
fn test_insert_into_group() {
    let mut h = hierarchy();
    let layer = h.tree.insert(Some(h.g2), object_node(), 1);

    assert_eq!(h.tree.len(), 13);
    assert_eq!(h.tree.parent(layer), Some(h.g2));
    assert_eq!(h.tree.local_index(layer), 1);
    assert_eq!(h.tree.global_index(layer), 4);
    assert_eq!(h.tree.local_index(h.g3), 2);
    assert_dense_local_indices(&h.tree);
}

#[test]
#[should_panic]
fn test_insert_into_non_group_panics() {
    let mut h = hierarchy();
    h.tree.insert(Some(h.t1), object_node(), 0);
}

#[test]
fn test_remove_layers() {
    let mut h = hierarchy();

    let snapshot = h.tree.remove(h.g2);
    assert_eq!(snapshot.len(), 4);
    assert_eq!(h.tree.len(), 8);
    assert!(!h.tree.contains(h.g2));
    assert!(!h.tree.contains(h.o1));
    assert!(h.tree.find(h.g2).is_none());

    h.tree.remove(h.t3);
    assert_eq!(h.tree.len(), 7);

    h.tree.remove(h.g1);
    assert_eq!(h.tree.len(), 3);

    h.tree.remove(h.t1);
    h.tree.remove(h.o4);
    h.tree.remove(h.t4);
    assert!(h.tree.is_empty());
}

#[test]
fn test_remove_then_restore_is_identical() {
    let mut h = hierarchy();
    let before: Vec<(LayerId, usize, usize)> = h
        .tree
        .iter()
        .map(|(id, _)| (id, h.tree.local_index(id), h.tree.global_index(id)))
        .collect();

    let snapshot = h.tree.remove(h.g1);
    assert_eq!(h.tree.local_index(h.o4), 1);
    let restored = h.tree.restore(snapshot);
    assert_eq!(restored, h.g1);

    let after: Vec<(LayerId, usize, usize)> = h
        .tree
        .iter()
        .map(|(id, _)| (id, h.tree.local_index(id), h.tree.global_index(id)))
        .collect();
    assert_eq!(before, after);
    assert_eq!(h.tree.children(h.g4), &[h.o3]);
}

#[test]
fn test_duplicate_group() {
    let mut h = hierarchy();
    let mut ids = IdAllocator::new();

    let copy = h.tree.duplicate(h.g2, &mut ids);
    assert_eq!(h.tree.len(), 16);
    assert_ne!(copy, h.g2);
    assert_eq!(h.tree.children(copy).len(), h.tree.children(h.g2).len());
    assert_eq!(h.tree.parent(copy), Some(h.g1));
    assert_eq!(h.tree.local_index(copy), h.tree.local_index(h.g2) + 1);
    assert_eq!(h.tree.global_index(copy), h.tree.global_index(h.o2) + 1);
    assert_dense_local_indices(&h.tree);
}

/// (local, global) of every layer, keyed by id.
fn indices(tree: &LayerTree) -> Vec<(LayerId, usize, usize)> {
    tree.iter()
        .map(|(id, _)| (id, tree.local_index(id), tree.global_index(id)))
        .collect()
}

/// Kind, local index and depth of every layer in the subtree rooted at `id`, in pre-order.
fn subtree_shape(
    tree: &LayerTree,
    id: LayerId,
    depth: usize,
    out: &mut Vec<(LayerKind, usize, usize)>,
) {
    let node = tree.find(id).unwrap();
    out.push((node.kind(), tree.local_index(id), depth));
    for child in tree.children(id) {
        subtree_shape(tree, *child, depth + 1, out);
    }
}

/// Duplicate `source` and check that only its later siblings move locally and only layers
/// after the copy move globally, each by the size of the copy.
fn assert_duplicate_shifts_only_later_layers(tree: &mut LayerTree, source: LayerId) {
    let mut ids = IdAllocator::new();
    let before = indices(tree);
    let later_siblings: Vec<LayerId> = {
        let parent = tree.parent(source);
        let siblings = match parent {
            Some(parent) => tree.children(parent),
            None => tree.top_level(),
        };
        siblings[tree.local_index(source) + 1..].to_vec()
    };
    let copy_size = 1 + tree.descendant_count(source);
    let insertion = tree.global_index(source) + copy_size;

    let copy = tree.duplicate(source, &mut ids);
    assert_eq!(tree.global_index(copy), insertion);
    assert_eq!(tree.len(), before.len() + copy_size);

    for (id, local, global) in before {
        let expected_local = if later_siblings.contains(&id) { local + 1 } else { local };
        let expected_global = if global >= insertion { global + copy_size } else { global };
        assert_eq!(
            (tree.local_index(id), tree.global_index(id)),
            (expected_local, expected_global),
            "{id} moved"
        );
    }

    let mut source_shape = Vec::new();
    let mut copy_shape = Vec::new();
    subtree_shape(tree, source, 0, &mut source_shape);
    subtree_shape(tree, copy, 0, &mut copy_shape);
    // Only the roots differ, by one local index.
    assert_eq!(copy_shape[0].1, source_shape[0].1 + 1);
    assert_eq!(&copy_shape[1..], &source_shape[1..]);
    assert_dense_local_indices(tree);
}

#[test]
fn test_duplicate_top_level_group_leaves_other_layers_in_place() {
    let mut h = hierarchy();
    // g1 nests g2, which nests g3.
    assert_eq!(h.tree.descendant_count(h.g1), 8);
    assert_duplicate_shifts_only_later_layers(&mut h.tree, h.g1);
    assert_eq!(h.tree.local_index(h.o4), 3);
    assert_eq!(h.tree.global_index(h.t4), 20);
}

#[test]
fn test_duplicate_nested_group_leaves_other_layers_in_place() {
    let mut h = hierarchy();
    assert_duplicate_shifts_only_later_layers(&mut h.tree, h.g2);
    assert_eq!(h.tree.local_index(h.t2), 2);
    assert_eq!(h.tree.local_index(h.o3), 0);
    assert_eq!(h.tree.local_index(h.o4), 2);
}

#[test]
fn test_duplicate_leaf_leaves_other_layers_in_place() {
    let mut h = hierarchy();
    assert_duplicate_shifts_only_later_layers(&mut h.tree, h.o1);
    assert_duplicate_shifts_only_later_layers(&mut h.tree, h.t4);
}

#[test]
fn test_duplicate_does_not_share_tiles() {
    let mut tree = LayerTree::new();
    let mut ids = IdAllocator::new();
    let source = tree.insert(None, tile_node(TileFormat::Dense), 0);
    tree.find_tile_layer_mut(source)
        .unwrap()
        .set_tile(TilePos::new(1, 1), 4)
        .unwrap();

    let copy = tree.duplicate(source, &mut ids);
    tree.find_tile_layer_mut(copy)
        .unwrap()
        .set_tile(TilePos::new(1, 1), 9)
        .unwrap();

    let source_layer = tree.find_tile_layer(source).unwrap();
    let copy_layer = tree.find_tile_layer(copy).unwrap();
    assert_eq!(source_layer.tile_at(TilePos::new(1, 1)), Some(4));
    assert_eq!(copy_layer.tile_at(TilePos::new(1, 1)), Some(9));
    assert_ne!(
        tree.find(source).unwrap().persistent_id,
        tree.find(copy).unwrap().persistent_id
    );
}

#[test]
fn test_move_layer_up() {
    let mut h = hierarchy();
    assert!(!h.tree.can_move_up(h.t1));
    assert!(!h.tree.can_move_up(h.o3));

    assert!(h.tree.can_move_up(h.g1));
    h.tree.move_up(h.g1);
    assert_eq!(
        global_order(
            &h.tree,
            &[h.g1, h.g2, h.o1, h.g3, h.o2, h.t2, h.g4, h.o3, h.t3, h.t1, h.o4, h.t4]
        ),
        (0..12).collect::<Vec<_>>()
    );

    h.tree.move_up(h.g4);
    assert_eq!(
        global_order(
            &h.tree,
            &[h.g1, h.g2, h.o1, h.g3, h.o2, h.g4, h.o3, h.t2, h.t3, h.t1, h.o4, h.t4]
        ),
        (0..12).collect::<Vec<_>>()
    );
    assert_dense_local_indices(&h.tree);
}

#[test]
fn test_move_layer_down() {
    let mut h = hierarchy();
    assert!(!h.tree.can_move_down(h.t4));
    assert!(!h.tree.can_move_down(h.o2));

    h.tree.move_down(h.g2);
    assert_eq!(
        global_order(
            &h.tree,
            &[h.t1, h.g1, h.t2, h.g2, h.o1, h.g3, h.o2, h.g4, h.o3, h.t3, h.o4, h.t4]
        ),
        (0..12).collect::<Vec<_>>()
    );

    h.tree.move_down(h.g3);
    assert_eq!(
        global_order(
            &h.tree,
            &[h.t1, h.g1, h.t2, h.g2, h.o1, h.o2, h.g3, h.g4, h.o3, h.t3, h.o4, h.t4]
        ),
        (0..12).collect::<Vec<_>>()
    );
    assert_dense_local_indices(&h.tree);
}

#[test]
fn test_move_middle_child_down_keeps_unrelated_layers() {
    let mut tree = LayerTree::new();
    let first = tree.insert(None, tile_node(TileFormat::Dense), 0);
    let group = tree.insert(None, LayerNode::group(), 1);
    let a = tree.insert(Some(group), tile_node(TileFormat::Dense), 0);
    let b = tree.insert(Some(group), tile_node(TileFormat::Dense), 1);
    let c = tree.insert(Some(group), tile_node(TileFormat::Dense), 2);
    let last = tree.insert(None, tile_node(TileFormat::Dense), 2);
    let outside = global_order(&tree, &[first, group, last]);

    tree.move_down(b);
    assert_eq!(tree.children(group), &[a, c, b]);
    assert_eq!([a, c, b].map(|id| tree.local_index(id)), [0, 1, 2]);
    assert_eq!(global_order(&tree, &[first, group, last]), outside);
    assert_dense_local_indices(&tree);
}

#[test]
fn test_move_down_then_up_restores_order() {
    let mut h = hierarchy();
    let before = h.tree.ids().to_vec();

    h.tree.move_down(h.g4);
    assert_ne!(h.tree.ids(), before.as_slice());
    h.tree.move_up(h.g4);
    assert_eq!(h.tree.ids(), before.as_slice());
}

#[test]
fn test_move_groups_down_in_sequence() {
    // g1 { t1, g2 { t2 }, t3 }, t4
    let mut tree = LayerTree::new();
    let g1 = tree.insert(None, LayerNode::group(), 0);
    let t1 = tree.insert(Some(g1), tile_node(TileFormat::Dense), 0);
    let g2 = tree.insert(Some(g1), LayerNode::group(), 1);
    let t2 = tree.insert(Some(g2), tile_node(TileFormat::Dense), 0);
    let t3 = tree.insert(Some(g1), tile_node(TileFormat::Dense), 2);
    let t4 = tree.insert(None, tile_node(TileFormat::Dense), 1);

    tree.move_down(g2);
    tree.move_down(g1);
    assert_eq!(tree.ids(), &[t4, g1, t1, t3, g2, t2]);
}

#[test]
fn test_can_move_at_edges() {
    // a { b { d }, c, f }, e
    let mut tree = LayerTree::new();
    let a = tree.insert(None, LayerNode::group(), 0);
    let b = tree.insert(Some(a), LayerNode::group(), 0);
    let d = tree.insert(Some(b), tile_node(TileFormat::Dense), 0);
    let c = tree.insert(Some(a), tile_node(TileFormat::Dense), 1);
    let f = tree.insert(Some(a), tile_node(TileFormat::Dense), 2);
    let e = tree.insert(None, tile_node(TileFormat::Dense), 1);

    assert_eq!(global_order(&tree, &[a, b, d, c, f, e]), vec![0, 1, 2, 3, 4, 5]);

    let down: Vec<bool> = [a, b, c, d, e, f].iter().map(|id| tree.can_move_down(*id)).collect();
    assert_eq!(down, vec![true, true, true, false, false, false]);
    let up: Vec<bool> = [a, b, c, d, e, f].iter().map(|id| tree.can_move_up(*id)).collect();
    assert_eq!(up, vec![false, false, true, false, true, true]);
}

#[test]
fn test_sibling_queries() {
    let h = hierarchy();
    assert_eq!(h.tree.sibling_count(h.g1), 3);
    assert_eq!(h.tree.sibling_count(h.o3), 0);
    assert_eq!(h.tree.sibling_count(h.g3), 2);
    assert_eq!(h.tree.sibling_above(h.g3), Some(h.o1));
    assert_eq!(h.tree.sibling_below(h.g3), Some(h.o2));
    assert_eq!(h.tree.sibling_above(h.t1), None);
    assert_eq!(h.tree.sibling_below(h.t4), None);
}

#[test]
fn test_descendants() {
    let h = hierarchy();
    assert_eq!(h.tree.descendant_count(h.g1), 8);
    assert_eq!(h.tree.descendant_count(h.g2), 3);
    assert_eq!(h.tree.descendant_count(h.t1), 0);
    assert!(h.tree.is_descendant(h.g1, h.o3));
    assert!(!h.tree.is_descendant(h.g2, h.o3));
    assert!(!h.tree.is_descendant(h.g1, h.g1));
}

#[test]
fn test_find_by_persistent_id() {
    let mut tree = LayerTree::new();
    let layer = tree.insert(None, LayerNode::group().with_persistent_id(7), 0);
    assert_eq!(tree.find_by_persistent_id(7), Some(layer));
    assert_eq!(tree.find_by_persistent_id(8), None);
}
