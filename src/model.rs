//! Model-based equivalence checks against [`BTreeMap`], shared by the tests and the fuzzer.

extern crate std;

use std::{collections::BTreeMap, prelude::v1::*};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{Error, Order, RankMap};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(i64),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in -500i64..500,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Find(ItemValue),
    Delete(ItemValue),
    Rank(ItemValue),
    Select(usize),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn finalize(self, sorted: &[i64]) -> FinalOp {
        // Indices pick an existing key where possible, so that hits are as likely as misses.
        fn get_key(v: &[i64], i: ItemValue) -> i64 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as i64
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(k) => k,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_key(sorted, item)),
            Op::Find(item) => FinalOp::Find(get_key(sorted, item)),
            Op::Delete(item) => FinalOp::Delete(get_key(sorted, item)),
            Op::Rank(item) => FinalOp::Rank(get_key(sorted, item)),
            // Reach one past either end of the valid range.
            Op::Select(index) => FinalOp::Select(index % (sorted.len() + 2)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(i64),
    Find(i64),
    Delete(i64),
    Rank(i64),
    Select(usize),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        4 => value_strategy().prop_map(Op::Insert),
        1 => value_strategy().prop_map(Op::Find),
        2 => value_strategy().prop_map(Op::Delete),
        1 => value_strategy().prop_map(Op::Rank),
        1 => (0usize..1000).prop_map(Op::Select),
        1 => Just(Op::First),
        1 => Just(Op::PopFirst),
        1 => Just(Op::Last),
        1 => Just(Op::PopLast),
    ]
}

/// Applies `ops` to both a [`RankMap`] and a [`BTreeMap`], panicking on the first divergence.
///
/// The tree's invariants and its in-order contents are checked after every operation.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_keys: Vec<i64> = Vec::with_capacity(ops.len());
    let mut btree = BTreeMap::new();
    let mut tree: RankMap<u64> = RankMap::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_keys);
        let value = op_id as u64;

        match final_op {
            FinalOp::Insert(key) => {
                let from_btree = if btree.contains_key(&key) {
                    Err(Error::DuplicateKey(key))
                } else {
                    btree.insert(key, value);
                    Ok(())
                };
                let from_tree = tree.insert(key, value);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Find(key) => {
                let from_btree = btree.get(&key).map(|&v| (key, v));
                let from_tree = tree.find(&key).ok().map(|node| (node.key(), *node.value()));

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Delete(key) => {
                let from_btree = btree.remove(&key).ok_or(Error::NotFound(key));
                let from_tree = tree.delete(&key);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Rank(key) => {
                let from_btree = sorted_keys
                    .binary_search(&key)
                    .map(|idx| idx + 1)
                    .map_err(|_| Error::NotFound(key));
                let from_tree = tree.rank(&key);

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Select(index) => {
                let from_btree = index
                    .checked_sub(1)
                    .and_then(|idx| btree.iter().nth(idx))
                    .map(|(&k, &v)| (k, v))
                    .ok_or(Error::OutOfRange {
                        index,
                        len: btree.len(),
                    });
                let from_tree = tree.select(index).map(|node| (node.key(), *node.value()));

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value().map(|(&k, &v)| (k, v));
                let from_tree = tree.first_key_value().map(|(k, &v)| (k, v));

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_tree = tree.pop_first();

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value().map(|(&k, &v)| (k, v));
                let from_tree = tree.last_key_value().map(|(k, &v)| (k, v));

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_tree = tree.pop_last();

                assert_eq!(from_btree, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        sorted_keys.clear();
        sorted_keys.extend(btree.keys().copied());

        tree.assert_invariants();
        assert_eq!(btree.len(), tree.len());
        assert!(btree.keys().copied().eq(tree.keys()));
        assert!(btree
            .keys()
            .copied()
            .eq(tree.traverse(Order::InOrder).map(|node| node.key())));
    }
}
