use super::*;

use crate::error::StoreFault;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Store(#[proptest(strategy = "0..300usize")] Key, Value),
    Load(#[proptest(strategy = "0..300usize")] Key),
    Erase(#[proptest(strategy = "0..300usize")] Key),
    // Far-away keys force extra height and extra chunks.
    StoreFar(#[proptest(strategy = "1_000_000..1_000_100usize")] Key, Value),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=1000)
}

fn values_strategy() -> impl Strategy<Value = Vec<Value>> {
    let value = prop_oneof![
        4 => -50i32..50,
        1 => any::<i32>(),
    ];
    prop::collection::vec(value, 0..=400)
}

/// Apply `ops` to `store` and to a `BTreeMap`, with `replace` choosing
/// between overwrite and reject-if-occupied semantics.
fn check_sparse<S: SparseStore<Value>>(
    store: &mut S,
    ops: Vec<Op>,
    replace: bool,
) -> std::result::Result<BTreeMap<Key, Value>, TestCaseError> {
    let mut m: BTreeMap<Key, Value> = BTreeMap::new();
    for op in ops {
        match op {
            Op::Store(key, value) | Op::StoreFar(key, value) => {
                let got = store.store(key, value);
                if replace || !m.contains_key(&key) {
                    let old = m.insert(key, value);
                    prop_assert_eq!(got, Ok(old));
                } else {
                    prop_assert_eq!(
                        got,
                        Err(Error::store(store.kind(), key, StoreFault::Occupied))
                    );
                }
            }
            Op::Load(key) => {
                prop_assert_eq!(store.load(key), m.get(&key));
            }
            Op::Erase(key) => {
                prop_assert_eq!(store.erase(key), m.remove(&key));
            }
        }
        prop_assert_eq!(store.len(), m.len());
    }
    Ok(m)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_radix_equivalence(ops in ops_strategy()) {
        let mut t: RadixTree<Value> = RadixTree::new();
        let m = check_sparse(&mut t, ops, false)?;

        let got: Vec<(Key, Value)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Key, Value)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);

        let cleared = t.clear();
        prop_assert_eq!(cleared, m.len());
        prop_assert_eq!(t.height(), 0);
    }

    #[test]
    fn prop_xarray_equivalence(ops in ops_strategy()) {
        let mut x: XArray<Value> = XArray::new();
        let m = check_sparse(&mut x, ops, true)?;

        let got: Vec<(Key, Value)> = x.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Key, Value)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);

        for key in m.keys().copied().collect::<Vec<_>>() {
            prop_assert!(x.erase(key).is_some());
        }
        prop_assert!(x.is_empty());
        prop_assert_eq!(x.chunk_count(), 0);
    }

    #[test]
    fn prop_rbtree_sorted(values in values_strategy()) {
        let mut t: RbTree<Value> = RbTree::new();
        for (i, &value) in values.iter().enumerate() {
            t.insert(value).unwrap();
            let black_height = t.validate();
            prop_assert!(black_height.is_ok(), "after insert {}: {:?}", i, black_height);
        }

        let mut expected = values.clone();
        expected.sort();
        let got: Vec<Value> = t.iter().copied().collect();
        prop_assert_eq!(got, expected);
        prop_assert!(t.rotations() <= 2 * values.len());
    }

    #[test]
    fn prop_datas_containers_agree(values in values_strategy(), bits in 1u32..=8) {
        let config = Config::default().with_bucket_bits(bits);
        let mut datas = Datas::with_config(config).unwrap();
        prop_assert_eq!(datas.ingest(values.iter().copied()), Ok(values.len()));

        for kind in ContainerKind::ALL {
            prop_assert_eq!(datas.entries(kind), values.len());
        }

        let listed: Vec<Value> = datas.list().iter().copied().collect();
        prop_assert_eq!(&listed, &values);

        for (key, value) in values.iter().enumerate() {
            prop_assert_eq!(datas.radix().load(key), Some(value));
            prop_assert_eq!(datas.xarray().load(key), Some(value));
            let bucket = datas.hash().bucket(datas.hash().bucket_of(key));
            prop_assert!(bucket.contains(&(key, *value)));
        }

        let mut sorted = values.clone();
        sorted.sort();
        let ordered: Vec<Value> = datas.rbtree().iter().copied().collect();
        prop_assert_eq!(ordered, sorted);

        let summary = datas.teardown().unwrap();
        prop_assert_eq!(summary.total(), 5 * values.len());
    }

    #[test]
    fn prop_report_bounded_and_idempotent(
        values in values_strategy(),
        capacity in 8usize..=512,
    ) {
        let config = Config::default().with_report_capacity(capacity);
        let mut datas = Datas::with_config(config).unwrap();
        datas.ingest(values).unwrap();

        let first = datas.report().unwrap();
        let second = datas.report().unwrap();
        prop_assert_eq!(first.as_str(), second.as_str());
        let bytes = first.to_bytes_with_nul();
        prop_assert!(bytes.len() <= capacity);
        prop_assert_eq!(bytes.last(), Some(&0u8));
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let values: Vec<Value> = vec![5, -1, 3, 3, 0, 9, -7];

    for_each_permutation(&values, |perm| {
        let mut t: RbTree<Value> = RbTree::new();
        for &value in &perm {
            t.insert(value).unwrap();
        }
        t.validate().unwrap();
        assert_eq!(
            t.iter().copied().collect::<Vec<_>>(),
            vec![-7, -1, 0, 3, 3, 5, 9]
        );

        let mut datas = Datas::new().unwrap();
        datas.ingest(perm.iter().copied()).unwrap();
        let report = datas.report().unwrap();
        assert!(report
            .as_str()
            .contains("Red-black tree: -7, -1, 0, 3, 3, 5, 9\n"));
    });
}

#[test]
fn exhaustive_sparse_erase_order() {
    let keys: Vec<Key> = vec![0, 1, 63, 64, 4095, 4096];

    for_each_permutation(&keys, |perm| {
        let mut r: RadixTree<Value> = RadixTree::new();
        let mut x: XArray<Value> = XArray::new();
        for &key in &keys {
            r.store(key, key as Value).unwrap();
            x.store(key, key as Value).unwrap();
        }
        for (i, &key) in perm.iter().enumerate() {
            assert_eq!(r.erase(key), Some(key as Value));
            assert_eq!(x.erase(key), Some(key as Value));
            for &rest in &perm[i + 1..] {
                assert_eq!(r.load(rest), Some(&(rest as Value)));
                assert_eq!(x.load(rest), Some(&(rest as Value)));
            }
        }
        assert!(r.is_empty());
        assert_eq!(r.height(), 0);
        assert!(x.is_empty());
    });
}
