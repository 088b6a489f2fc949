use avl_rank::{Order, RankMap};

fn keys(tree: &RankMap<String>, order: Order) -> Vec<i64> {
    tree.traverse(order).map(|node| node.key()).collect()
}

fn main() {
    let mut tree = RankMap::new();

    for key in [5, 3, 8, 1, 4, 7, 9] {
        tree.insert(key, format!("value-{key}")).unwrap();
        tree.assert_invariants();
        println!("{:?}", keys(&tree, Order::InOrder));
    }

    println!("pre-order:  {:?}", keys(&tree, Order::PreOrder));
    println!("post-order: {:?}", keys(&tree, Order::PostOrder));

    if let Err(err) = tree.insert(4, "again".to_string()) {
        println!("{err}");
    }

    let median = tree.select(4).unwrap();
    println!("median: {} => {}", median.key(), median.value());
    println!("rank of 7: {}", tree.rank(&7).unwrap());

    let mut dot = String::new();
    tree.as_tree().dotgraph("demo", &mut dot).unwrap();
    println!("{dot}");

    let removed = tree.delete(&5).unwrap();
    tree.assert_invariants();
    println!("after deleting {removed}: {:?}", keys(&tree, Order::InOrder));

    if let Err(err) = tree.select(tree.len() + 1) {
        println!("{err}");
    }

    let (first, _) = tree.pop_first().unwrap();
    assert_eq!(first, 1);
    tree.assert_invariants();

    drop(tree);
}
