//! Existence filter tests
//!
//! 使用进程内位数组，覆盖“无漏报”和误报率两条性质。

use std::sync::Arc;

use tinylink::cache::ExistenceFilter;
use tinylink::cache::existence_filter::bit_array::MemoryBitArray;
use tinylink::cache::existence_filter::{BloomExistenceFilter, BloomParams};
use tinylink::codec::encode;

fn build_filter(expected: u64, fp: f64) -> BloomExistenceFilter {
    let params = BloomParams::new(expected, fp).unwrap();
    BloomExistenceFilter::new(params, Arc::new(MemoryBitArray::new(params.bits)))
}

#[tokio::test]
async fn test_no_false_negatives() {
    let filter = build_filter(5_000, 0.01);
    let codes: Vec<String> = (1..=5_000u64).map(encode).collect();
    filter.add_many(&codes).await.unwrap();

    for code in &codes {
        assert!(filter.exists(code).await.unwrap(), "lost {}", code);
    }
}

#[tokio::test]
async fn test_false_positive_rate_near_target() {
    let p = 0.01;
    let filter = build_filter(10_000, p);
    let members: Vec<String> = (0..10_000u64).map(|i| format!("in-{}", i)).collect();
    filter.add_many(&members).await.unwrap();

    let lookups = 20_000;
    let mut false_positives = 0;
    for i in 0..lookups {
        if filter.exists(&format!("out-{}", i)).await.unwrap() {
            false_positives += 1;
        }
    }

    let rate = false_positives as f64 / lookups as f64;
    assert!(rate < p * 3.0, "false positive rate too high: {}", rate);
}

#[tokio::test]
async fn test_add_then_exists_single() {
    let filter = build_filter(100, 0.01);
    assert!(!filter.exists("abc").await.unwrap());
    filter.add("abc").await.unwrap();
    assert!(filter.exists("abc").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_adds_are_all_visible() {
    let filter = Arc::new(build_filter(4_000, 0.01));
    let tasks: Vec<_> = (0..8u64)
        .map(|t| {
            let filter = Arc::clone(&filter);
            tokio::spawn(async move {
                for i in 0..500u64 {
                    filter.add(&encode(t * 1_000 + i + 1)).await.unwrap();
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    for t in 0..8u64 {
        for i in 0..500u64 {
            assert!(filter.exists(&encode(t * 1_000 + i + 1)).await.unwrap());
        }
    }
}

#[test]
fn test_params_for_one_million_items() {
    let params = BloomParams::new(1_000_000, 0.01).unwrap();
    assert_eq!(params.hashes, 7);
    assert!((9_500_000..9_700_000).contains(&params.bits));
}
