use ratelimit_core::{
    FixedWindowStrategy, MemoryStorage, MovingWindowStrategy, SlidingWindowCounterStrategy,
    Strategy, parse,
};

#[test]
fn fixed_window_end_to_end_via_parsed_limit() {
    let limit = parse("3/second").unwrap();
    let limiter = FixedWindowStrategy::new(MemoryStorage::new());

    let admitted = (0..10).filter(|_| limiter.hit(&limit, &["tenant-a"]).unwrap()).count();
    assert_eq!(admitted, 3);
}

#[test]
fn moving_window_end_to_end_via_parsed_limit() {
    let limit = parse("3/second").unwrap();
    let limiter = MovingWindowStrategy::new(MemoryStorage::new());

    let admitted = (0..10).filter(|_| limiter.hit(&limit, &["tenant-a"]).unwrap()).count();
    assert_eq!(admitted, 3);
}

#[test]
fn sliding_window_counter_end_to_end_via_parsed_limit() {
    let limit = parse("3/second").unwrap();
    let limiter = SlidingWindowCounterStrategy::new(MemoryStorage::new());

    let admitted = (0..10).filter(|_| limiter.hit(&limit, &["tenant-a"]).unwrap()).count();
    assert_eq!(admitted, 3);
}

#[test]
fn strategies_on_the_same_storage_keep_disjoint_limits_isolated() {
    let storage = MemoryStorage::new();
    let per_second = parse("1/second").unwrap();
    let per_minute = parse("1/minute").unwrap();
    let limiter = FixedWindowStrategy::new(storage);

    assert!(limiter.hit(&per_second, &["u"]).unwrap());
    // A different limit shape for the same identity is a different bucket.
    assert!(limiter.hit(&per_minute, &["u"]).unwrap());
}

#[test]
fn each_strategy_can_be_driven_through_the_same_trait_object() {
    let limit = parse("1/second").unwrap();
    let strategies: Vec<Box<dyn Strategy>> = vec![
        Box::new(FixedWindowStrategy::new(MemoryStorage::new())),
        Box::new(MovingWindowStrategy::new(MemoryStorage::new())),
        Box::new(SlidingWindowCounterStrategy::new(MemoryStorage::new())),
    ];

    for strategy in &strategies {
        assert!(strategy.hit(&limit, &["u"]).unwrap());
        assert!(!strategy.hit(&limit, &["u"]).unwrap());
        strategy.clear(&limit, &["u"]).unwrap();
        assert!(strategy.hit(&limit, &["u"]).unwrap());
    }
}
