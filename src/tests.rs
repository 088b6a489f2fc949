extern crate std;

use std::{
    cell::RefCell,
    fmt,
    ops::Range,
    rc::Rc,
    sync::{Arc, Mutex},
};

use proptest::prelude::*;
use tracing::{
    field::{Field, Visit},
    span, Event, Metadata, Subscriber,
};

use crate::{map::Node, model, Order, RankMap};

use super::*;

fn insert_find_all(keys: &[i64]) {
    let mut tree: AvlTree<Node<()>> = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(Node::new(key, ())).is_ok());
        tree.assert_invariants();
    }

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, *key);

        let rank = tree.rank(key).expect("item has no rank");
        assert_eq!(sorted[rank - 1], *key);
        assert_eq!(tree.select(rank).map(|node| node.key()), Some(*key));
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    insert_find_all(&[0, 1, 2, 3]);
    insert_find_all(&[0, 1, 3, 2]);
    insert_find_all(&[0, 2, 1, 3]);
    insert_find_all(&[0, 2, 3, 1]);
    insert_find_all(&[0, 3, 1, 2]);
    insert_find_all(&[0, 3, 2, 1]);

    insert_find_all(&[1, 0, 2, 3]);
    insert_find_all(&[1, 0, 3, 2]);
    insert_find_all(&[1, 2, 0, 3]);
    insert_find_all(&[1, 2, 3, 0]);
    insert_find_all(&[1, 3, 0, 2]);
    insert_find_all(&[1, 3, 2, 0]);

    insert_find_all(&[2, 0, 1, 3]);
    insert_find_all(&[2, 0, 3, 1]);
    insert_find_all(&[2, 1, 0, 3]);
    insert_find_all(&[2, 1, 3, 0]);
    insert_find_all(&[2, 3, 0, 1]);
    insert_find_all(&[2, 3, 1, 0]);

    insert_find_all(&[3, 0, 1, 2]);
    insert_find_all(&[3, 0, 2, 1]);
    insert_find_all(&[3, 1, 0, 2]);
    insert_find_all(&[3, 1, 2, 0]);
    insert_find_all(&[3, 2, 0, 1]);
    insert_find_all(&[3, 2, 1, 0]);
}

fn insert_remove_all(keys: &[i64]) {
    let mut tree: AvlTree<Node<()>> = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(Node::new(key, ())).is_ok());
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        let removed = unsafe { tree.remove_at(node) };
        assert_eq!(removed.key(), *key);
        tree.assert_invariants();
        assert!(tree.get_raw(key).is_none());
    }

    for &key in keys {
        assert!(tree.insert(Node::new(key, ())).is_ok());
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        assert!(tree.remove(key).is_some());
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
    assert!(tree.root.is_none());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

// Heap's algorithm.
fn permutations(keys: &mut [i64], k: usize, f: &mut impl FnMut(&[i64])) {
    if k <= 1 {
        f(keys);
        return;
    }

    permutations(keys, k - 1, f);

    for i in 0..k - 1 {
        if k % 2 == 0 {
            keys.swap(i, k - 1);
        } else {
            keys.swap(0, k - 1);
        }

        permutations(keys, k - 1, f);
    }
}

#[test]
fn every_order_of_six() {
    let mut keys = [0, 1, 2, 3, 4, 5];
    let mut seen = 0;

    permutations(&mut keys, 6, &mut |perm: &[i64]| {
        insert_find_all(perm);
        insert_remove_all(perm);
        seen += 1;
    });

    assert_eq!(seen, 720);
}

#[test]
fn duplicate_insert_hands_item_back() {
    let mut tree: AvlTree<Node<&str>> = AvlTree::new();

    assert!(tree.insert(Node::new(1, "first")).is_ok());
    assert!(tree.insert(Node::new(2, "second")).is_ok());

    let rejected = tree.insert(Node::new(1, "again")).expect_err("duplicate was accepted");
    assert_eq!(*rejected.value(), "again");

    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get(&1).map(|node| *node.get_ref().value()), Some("first"));
    tree.assert_invariants();
}

#[test]
fn rank_and_select_miss() {
    let mut tree: AvlTree<Node<()>> = AvlTree::new();
    assert_eq!(tree.rank(&1), None);
    assert!(tree.select(1).is_none());

    for key in [10, 20, 30] {
        tree.insert(Node::new(key, ())).unwrap();
    }

    assert_eq!(tree.rank(&15), None);
    assert!(tree.select(0).is_none());
    assert!(tree.select(4).is_none());
}

#[test]
fn balanced_five_ranks() {
    let map: RankMap<()> = [30, 20, 40, 10, 25].into_iter().map(|k| (k, ())).collect();
    map.assert_invariants();

    // ceil(log2(5 + 1)) = 3
    assert!(map.height() <= 3);
    assert_eq!(map.rank(&25), Ok(3));
}

#[test]
fn select_median_and_traversals() {
    let map: RankMap<()> = [5, 3, 8, 1, 4, 7, 9].into_iter().map(|k| (k, ())).collect();
    map.assert_invariants();

    assert_eq!(map.select(4).map(Node::key), Ok(5));

    let walk = |order| map.traverse(order).map(Node::key).collect::<Vec<_>>();
    assert_eq!(walk(Order::InOrder), [1, 3, 4, 5, 7, 8, 9]);
    assert_eq!(walk(Order::PreOrder), [5, 3, 1, 4, 8, 7, 9]);
    assert_eq!(walk(Order::PostOrder), [1, 4, 3, 7, 9, 8, 5]);

    // Walks are restartable and know their length.
    let mut walk = map.traverse(Order::PostOrder);
    assert_eq!(walk.len(), 7);
    walk.next();
    assert_eq!(walk.len(), 6);
    assert_eq!(walk.clone().count(), 6);
    assert_eq!(map.traverse(Order::PostOrder).count(), 7);
}

#[test]
fn traversal_of_empty_and_single() {
    let mut map: RankMap<()> = RankMap::new();

    for order in [Order::InOrder, Order::PreOrder, Order::PostOrder] {
        assert_eq!(map.traverse(order).next().map(Node::key), None);
    }

    map.insert(1, ()).unwrap();

    for order in [Order::InOrder, Order::PreOrder, Order::PostOrder] {
        assert_eq!(map.traverse(order).map(Node::key).collect::<Vec<_>>(), [1]);
    }
}

#[test]
fn delete_root_of_seven() {
    let mut map: RankMap<()> = [4, 2, 6, 1, 3, 5, 7].into_iter().map(|k| (k, ())).collect();
    assert_eq!(map.height(), 2);
    assert_eq!(map.select(4).map(Node::key), Ok(4));

    map.delete(&4).unwrap();
    map.assert_invariants();

    assert_eq!(map.len(), 6);
    assert!(map.find(&4).is_err());
    assert_eq!(map.keys().collect::<Vec<_>>(), [1, 2, 3, 5, 6, 7]);
}

#[test]
fn delete_relinks_sole_left_child() {
    let mut map: RankMap<()> = [20, 10, 30, 5].into_iter().map(|k| (k, ())).collect();

    // 10 has only a left child.
    let ten = map.find(&10).unwrap();
    assert!(ten.right().is_none());
    assert_eq!(ten.left().map(Node::key), Some(5));

    map.delete(&10).unwrap();
    map.assert_invariants();

    let five = map.find(&5).unwrap();
    assert_eq!(five.parent().map(Node::key), Some(20));
    assert_eq!(map.keys().collect::<Vec<_>>(), [5, 20, 30]);

    // The root with only a left child.
    let mut map: RankMap<()> = [2, 1].into_iter().map(|k| (k, ())).collect();
    map.delete(&2).unwrap();
    map.assert_invariants();
    assert!(map.find(&1).unwrap().parent().is_none());
}

#[test]
fn delete_splices_successor_with_right_child() {
    //        8
    //      /   \
    //     4     12
    //    / \   /  \
    //   2   6 10   14
    //          \
    //           11
    let keys = [8, 4, 12, 2, 6, 10, 14, 11];
    let mut map: RankMap<()> = keys.into_iter().map(|k| (k, ())).collect();
    map.assert_invariants();
    assert_eq!(map.find(&10).unwrap().right().map(Node::key), Some(11));

    // 10 is the successor of 8 and brings 11 along.
    map.delete(&8).unwrap();
    map.assert_invariants();

    let root = map.select(map.rank(&10).unwrap()).unwrap();
    assert!(root.parent().is_none());
    assert_eq!(map.find(&11).unwrap().parent().map(Node::key), Some(12));
    assert_eq!(map.keys().collect::<Vec<_>>(), [2, 4, 6, 10, 11, 12, 14]);
}

// Checks order, parent links and cached sizes and heights, but not balance.
fn assert_structure(tree: &AvlTree<Node<()>>) {
    for node in tree.traverse(Order::PreOrder) {
        let left = node.left();
        let right = node.right();

        for child in [left, right].into_iter().flatten() {
            assert_eq!(child.parent().map(Node::key), Some(node.key()));
        }

        assert_eq!(
            node.subtree_size(),
            1 + left.map_or(0, Node::subtree_size) + right.map_or(0, Node::subtree_size)
        );
        assert_eq!(
            node.height(),
            1 + left.map_or(-1, Node::height).max(right.map_or(-1, Node::height))
        );
    }
}

#[test]
fn rotations_preserve_order() {
    let mut tree: AvlTree<Node<()>> = AvlTree::new();
    for key in [4, 2, 6, 1, 3, 5, 7] {
        tree.insert(Node::new(key, ())).unwrap();
    }

    let in_order = |tree: &AvlTree<Node<()>>| tree.iter().map(Node::key).collect::<Vec<_>>();
    let expected = in_order(&tree);
    let root = |tree: &AvlTree<Node<()>>| tree.root.expect("tree is empty");

    unsafe {
        let up = tree.rotate_left(root(&tree));
        assert_eq!(up.as_ref().key(), 6);
        assert_eq!(root(&tree), up);
        assert_eq!(in_order(&tree), expected);
        assert_structure(&tree);
        assert_eq!(up.as_ref().subtree_size(), 7);
        assert_eq!(tree.get(&4).map(|n| n.subtree_size()), Some(5));

        let up = tree.rotate_right(root(&tree));
        assert_eq!(up.as_ref().key(), 4);
        assert_eq!(in_order(&tree), expected);
        tree.assert_invariants();

        let up = tree.rotate_left_right(root(&tree));
        assert_eq!(up.as_ref().key(), 3);
        assert_eq!(in_order(&tree), expected);
        assert_structure(&tree);

        // 4 is now right of the root, and its right child 6 has a left child.
        let four = tree.get_raw(&4).expect("4 is missing");
        let up = tree.rotate_right_left(four);
        assert_eq!(up.as_ref().key(), 5);
        assert_eq!(root(&tree).as_ref().key(), 3);
        assert_eq!(up.as_ref().parent().map(Node::key), Some(3));
        assert_eq!(in_order(&tree), expected);
        assert_structure(&tree);
    }
}

// Collects the `form` field of every rotation event.
#[derive(Clone, Default)]
struct RotationForms(Arc<Mutex<Vec<String>>>);

struct FormVisitor(Option<String>);

impl Visit for FormVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "form" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, _: &Field, _: &dyn fmt::Debug) {}
}

impl Subscriber for RotationForms {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(1)
    }

    fn record(&self, _: &span::Id, _: &span::Record<'_>) {}

    fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut visitor = FormVisitor(None);
        event.record(&mut visitor);

        if let Some(form) = visitor.0 {
            self.0.lock().unwrap().push(form);
        }
    }

    fn enter(&self, _: &span::Id) {}

    fn exit(&self, _: &span::Id) {}
}

fn rotation_forms(keys: &[i64]) -> Vec<String> {
    let forms = RotationForms::default();

    tracing::subscriber::with_default(forms.clone(), || {
        let mut map = RankMap::new();
        for &key in keys {
            map.insert(key, ()).unwrap();
        }
        map.assert_invariants();
    });

    let recorded = forms.0.lock().unwrap().clone();
    recorded
}

#[test]
fn rotations_are_traced_by_form() {
    assert_eq!(rotation_forms(&[1, 2, 3]), ["left"]);
    assert_eq!(rotation_forms(&[3, 2, 1]), ["right"]);
    assert_eq!(rotation_forms(&[3, 1, 2]), ["left-right"]);
    assert_eq!(rotation_forms(&[1, 3, 2]), ["right-left"]);
    assert!(rotation_forms(&[2, 1, 3]).is_empty());
}

#[derive(Debug)]
struct DropRecorder {
    key: i64,
    log: Rc<RefCell<Vec<i64>>>,
}

impl Drop for DropRecorder {
    fn drop(&mut self) {
        self.log.borrow_mut().push(self.key);
    }
}

fn recorded_map(keys: &[i64]) -> (RankMap<DropRecorder>, Rc<RefCell<Vec<i64>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut map = RankMap::new();

    for &key in keys {
        let value = DropRecorder {
            key,
            log: log.clone(),
        };
        map.insert(key, value).unwrap();
    }

    (map, log)
}

#[test]
fn clear_drops_in_post_order() {
    let (mut map, log) = recorded_map(&[8, 4, 12, 2, 6, 10, 14, 1, 3]);
    let post_order: Vec<i64> = map.traverse(Order::PostOrder).map(Node::key).collect();

    map.clear();

    assert_eq!(*RefCell::borrow(&log), post_order);
    assert!(map.is_empty());
    assert_eq!(map.height(), -1);
    map.assert_invariants();

    // Clearing an empty map is a no-op.
    map.clear();
    assert_eq!(RefCell::borrow(&log).len(), 9);
}

#[test]
fn drop_releases_every_value() {
    let (mut map, log) = recorded_map(&[5, 3, 8, 1, 4, 7, 9]);

    let rejected = map.insert(
        5,
        DropRecorder {
            key: -5,
            log: log.clone(),
        },
    );
    assert!(rejected.is_err());
    assert_eq!(*RefCell::borrow(&log), [-5]);

    let removed = map.delete(&3).unwrap();
    assert_eq!(removed.key, 3);
    drop(removed);

    drop(map);

    let mut dropped = RefCell::borrow(&log).clone();
    dropped.sort_unstable();
    assert_eq!(dropped, [-5, 1, 3, 4, 5, 7, 8, 9]);
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

#[derive(Clone, Debug)]
enum Mutation {
    Insert(i64),
    Delete(i64),
}

fn mutation_strategy() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        (0i64..64).prop_map(Mutation::Insert),
        (0i64..64).prop_map(Mutation::Delete),
    ]
}

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn invariants_hold_after_every_mutation(
        mutations in proptest::collection::vec(mutation_strategy(), 0..256),
    ) {
        let mut map = RankMap::new();

        for mutation in mutations {
            match mutation {
                Mutation::Insert(key) => {
                    let present = map.contains_key(&key);
                    prop_assert_eq!(map.insert(key, ()).is_err(), present);
                }
                Mutation::Delete(key) => {
                    let present = map.contains_key(&key);
                    prop_assert_eq!(map.delete(&key).is_ok(), present);
                }
            }

            map.assert_invariants();

            let keys: Vec<i64> = map.traverse(Order::InOrder).map(Node::key).collect();
            prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert_eq!(keys.len(), map.len());
        }
    }

    #[test]
    fn rank_select_duality(keys in proptest::collection::btree_set(-1000i64..1000, 0..128)) {
        let map: RankMap<()> = keys.iter().map(|&k| (k, ())).collect();

        for index in 1..=map.len() {
            let key = map.select(index).unwrap().key();
            prop_assert_eq!(map.rank(&key), Ok(index));
        }

        for &key in &keys {
            let rank = map.rank(&key).unwrap();
            prop_assert_eq!(map.select(rank).map(Node::key), Ok(key));
        }
    }

    #[test]
    fn insert_then_delete_all_empties(keys in proptest::collection::vec(any::<i64>(), 0..128)) {
        let mut map = RankMap::new();
        for &key in &keys {
            let _ = map.insert(key, ());
        }

        for &key in &keys {
            let _ = map.delete(&key);
            map.assert_invariants();
        }

        prop_assert!(map.is_empty());
        prop_assert_eq!(map.height(), -1);
        prop_assert!(map.as_tree().root.is_none());

        for key in &keys {
            prop_assert!(map.find(key).is_err());
        }
    }
}
