//! 定位器的并发与监听集成测试
use anyhow::bail;
use di_abstractions::{
    mediator_fn, BeanEntry, BeanLocator, Binding, BindingId, BindingPublisher, Key,
    MutableBeanLocator,
};
use di_impl::{DefaultBeanLocator, DynamicBindingPublisher, StaticBindingPublisher};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

trait Plugin: Send + Sync {
    fn id(&self) -> usize;
}

struct Numbered(usize);

impl Plugin for Numbered {
    fn id(&self) -> usize {
        self.0
    }
}

fn plugin(id: usize) -> Binding<dyn Plugin> {
    let instance: Arc<dyn Plugin> = Arc::new(Numbered(id));
    Binding::instance(instance)
}

fn module(name: &str, bindings: Vec<Binding<dyn Plugin>>) -> Arc<dyn BindingPublisher> {
    let mut builder = StaticBindingPublisher::builder(name);
    for binding in bindings {
        builder = builder.bind(binding);
    }
    Arc::new(builder.build())
}

/// 记录每个绑定的 add/remove 交替情况
#[derive(Default)]
struct Ledger {
    live: Mutex<HashMap<BindingId, i32>>,
    adds: AtomicUsize,
    removes: AtomicUsize,
    violated: AtomicBool,
}

impl Ledger {
    fn added(&self, entry: &BeanEntry<dyn Plugin>) {
        self.adds.fetch_add(1, Ordering::SeqCst);
        let mut live = self.live.lock();
        let count = live.entry(entry.binding_id()).or_insert(0);
        if *count != 0 {
            self.violated.store(true, Ordering::SeqCst);
        }
        *count += 1;
    }

    fn removed(&self, entry: &BeanEntry<dyn Plugin>) {
        self.removes.fetch_add(1, Ordering::SeqCst);
        let mut live = self.live.lock();
        let count = live.entry(entry.binding_id()).or_insert(0);
        if *count != 1 {
            self.violated.store(true, Ordering::SeqCst);
        }
        *count -= 1;
    }

    fn live_count(&self) -> usize {
        self.live.lock().values().filter(|count| **count == 1).count()
    }
}

fn watch_ledger(
    locator: &DefaultBeanLocator,
    ledger: &Arc<Ledger>,
) -> di_abstractions::WatchHandle {
    locator.watch(
        Key::<dyn Plugin>::unrestricted(),
        mediator_fn(
            |entry: &BeanEntry<dyn Plugin>, ledger: &Arc<Ledger>| {
                ledger.added(entry);
                Ok(())
            },
            |entry: &BeanEntry<dyn Plugin>, ledger: &Arc<Ledger>| {
                ledger.removed(entry);
                Ok(())
            },
        ),
        ledger.clone(),
    )
}

#[test]
fn test_concurrent_iterators_share_positions_until_removal() {
    let locator = DefaultBeanLocator::new();
    let low = module("low", vec![plugin(1)]);
    let mid = module("mid", vec![plugin(2)]);
    let high = module("high", vec![plugin(3)]);
    locator.add(low, 0);
    locator.add(mid.clone(), 5);
    locator.add(high, 10);

    let mut first = locator.locate(Key::<dyn Plugin>::unrestricted()).into_iter();
    let mut second = locator.locate(Key::<dyn Plugin>::unrestricted()).into_iter();

    let a = first.next().unwrap();
    let b = second.next().unwrap();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.value().unwrap().id(), 3);

    assert_eq!(first.next().unwrap().value().unwrap().id(), 2);

    locator.remove(mid.id());

    assert_eq!(first.next().unwrap().value().unwrap().id(), 1);
    assert_eq!(second.next().unwrap().value().unwrap().id(), 1);
    assert!(first.next().is_none());
    assert!(second.next().is_none());
}

#[test]
fn test_iteration_during_concurrent_churn_stays_sorted() {
    let locator = DefaultBeanLocator::new();
    locator.add(module("anchor", vec![plugin(0)]), 0);

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let locator = locator.clone();
            scope.spawn(move || {
                for round in 0..50 {
                    let publisher = module("churn", vec![plugin(worker * 100 + round)]);
                    let rank = i32::try_from(round % 7).unwrap() - 3;
                    locator.add(publisher.clone(), rank);
                    locator.remove(publisher.id());
                }
            });
        }

        for _ in 0..4 {
            let locator = locator.clone();
            scope.spawn(move || {
                for _ in 0..200 {
                    let ranks: Vec<i32> = locator
                        .locate(Key::<dyn Plugin>::unrestricted())
                        .into_iter()
                        .map(|entry| entry.rank())
                        .collect();
                    assert!(ranks.windows(2).all(|pair| pair[0] >= pair[1]));
                }
            });
        }
    });

    let remaining: Vec<usize> = locator
        .locate(Key::<dyn Plugin>::unrestricted())
        .into_iter()
        .map(|entry| entry.value().unwrap().id())
        .collect();
    assert_eq!(remaining, vec![0]);
    assert_eq!(locator.snapshot().cached_types[0].bindings, 1);
}

#[test]
fn test_racing_first_access_creates_one_cache() {
    let locator = DefaultBeanLocator::new();
    locator.add(module("module", vec![plugin(1)]), 0);

    let beans: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locator = locator.clone();
                scope.spawn(move || locator.locate(Key::<dyn Plugin>::unrestricted()))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(beans.windows(2).all(|pair| pair[0].shares_bindings(&pair[1])));
    assert_eq!(locator.snapshot().cached_types.len(), 1);
}

#[test]
fn test_watch_catch_up_and_liveness() {
    let locator = DefaultBeanLocator::new();
    locator.add(module("a", vec![plugin(1), plugin(2)]), 0);
    locator.add(module("b", vec![plugin(3)]), 1);

    let ledger = Arc::new(Ledger::default());
    let handle = watch_ledger(&locator, &ledger);
    assert_eq!(ledger.adds.load(Ordering::SeqCst), 3);

    let extra = module("extra", vec![plugin(4)]);
    locator.add(extra.clone(), 2);
    assert_eq!(ledger.adds.load(Ordering::SeqCst), 4);

    assert!(!locator.add(extra.clone(), 2));
    assert_eq!(ledger.adds.load(Ordering::SeqCst), 4);

    locator.remove(extra.id());
    assert_eq!(ledger.removes.load(Ordering::SeqCst), 1);
    locator.remove(extra.id());
    assert_eq!(ledger.removes.load(Ordering::SeqCst), 1);

    locator.clear();
    assert_eq!(ledger.removes.load(Ordering::SeqCst), 4);
    locator.clear();
    assert_eq!(ledger.removes.load(Ordering::SeqCst), 4);

    assert!(!ledger.violated.load(Ordering::SeqCst));
    handle.cancel();
}

#[test]
fn test_catch_up_delivers_in_rank_order() {
    let locator = DefaultBeanLocator::new();
    locator.add(module("low", vec![plugin(1)]), -1);
    locator.add(module("high", vec![plugin(2)]), 9);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let handle = locator.watch(
        Key::<dyn Plugin>::unrestricted(),
        mediator_fn(
            |entry: &BeanEntry<dyn Plugin>, seen: &Arc<Mutex<Vec<usize>>>| {
                seen.lock().push(entry.value()?.id());
                Ok(())
            },
            |_: &BeanEntry<dyn Plugin>, _: &Arc<Mutex<Vec<usize>>>| Ok(()),
        ),
        seen.clone(),
    );

    assert_eq!(*seen.lock(), vec![2, 1]);
    handle.cancel();
}

#[test]
fn test_cancelled_watch_receives_nothing() {
    let locator = DefaultBeanLocator::new();
    let ledger = Arc::new(Ledger::default());
    let handle = watch_ledger(&locator, &ledger);
    assert_eq!(locator.watch_count(), 1);

    handle.cancel();
    handle.cancel();
    assert_eq!(locator.watch_count(), 0);

    locator.add(module("late", vec![plugin(1)]), 0);
    assert_eq!(ledger.adds.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failing_mediators_are_isolated() {
    let locator = DefaultBeanLocator::new();
    locator.add(module("a", vec![plugin(1)]), 0);

    let failing = locator.watch(
        Key::<dyn Plugin>::unrestricted(),
        mediator_fn(
            |_: &BeanEntry<dyn Plugin>, _: &()| bail!("rejected"),
            |_: &BeanEntry<dyn Plugin>, _: &()| bail!("rejected"),
        ),
        (),
    );
    let panicking = locator.watch(
        Key::<dyn Plugin>::unrestricted(),
        mediator_fn(
            |_: &BeanEntry<dyn Plugin>, _: &()| -> anyhow::Result<()> { panic!("mediator panic") },
            |_: &BeanEntry<dyn Plugin>, _: &()| -> anyhow::Result<()> { panic!("mediator panic") },
        ),
        (),
    );
    let ledger = Arc::new(Ledger::default());
    let healthy = watch_ledger(&locator, &ledger);

    let extra = module("b", vec![plugin(2)]);
    locator.add(extra.clone(), 1);
    locator.remove(extra.id());

    assert_eq!(ledger.adds.load(Ordering::SeqCst), 2);
    assert_eq!(ledger.removes.load(Ordering::SeqCst), 1);
    assert!(!ledger.violated.load(Ordering::SeqCst));

    let ids: Vec<usize> = locator
        .locate(Key::<dyn Plugin>::unrestricted())
        .into_iter()
        .map(|entry| entry.value().unwrap().id())
        .collect();
    assert_eq!(ids, vec![1]);

    failing.cancel();
    panicking.cancel();
    healthy.cancel();
}

#[test]
fn test_mediator_may_call_back_into_locator() {
    let locator = DefaultBeanLocator::new();
    let extensions = Arc::new(DynamicBindingPublisher::new("extensions"));
    locator.add(extensions.clone(), 0);

    let follow_up = Arc::new(AtomicUsize::new(0));
    let counter = follow_up.clone();
    let handle = locator.watch(
        Key::<dyn Plugin>::unrestricted(),
        mediator_fn(
            move |entry: &BeanEntry<dyn Plugin>, locator: &DefaultBeanLocator| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = locator.locate(Key::<String>::unrestricted());
                if entry.value()?.id() == 1 {
                    locator.add(
                        Arc::new(
                            StaticBindingPublisher::builder("follow-up")
                                .bind(plugin(2))
                                .build(),
                        ),
                        -1,
                    );
                }
                Ok(())
            },
            |_: &BeanEntry<dyn Plugin>, _: &DefaultBeanLocator| Ok(()),
        ),
        locator.clone(),
    );

    extensions.publish(plugin(1));
    assert_eq!(follow_up.load(Ordering::SeqCst), 2);
    assert_eq!(locator.publishers().len(), 2);
    handle.cancel();
}

#[test]
fn test_concurrent_watch_notifications_never_duplicate() {
    let locator = DefaultBeanLocator::new();
    let extensions = Arc::new(DynamicBindingPublisher::new("extensions"));
    locator.add(extensions.clone(), 0);

    let ledger = Arc::new(Ledger::default());
    let handle = watch_ledger(&locator, &ledger);

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let extensions = extensions.clone();
            let locator = locator.clone();
            scope.spawn(move || {
                for round in 0..25 {
                    let id = extensions.publish(plugin(worker * 1000 + round));
                    if round % 2 == 0 {
                        extensions.retract(id);
                    }
                    let publisher = module("transient", vec![plugin(worker * 1000 + 500 + round)]);
                    locator.add(publisher.clone(), 1);
                    locator.remove(publisher.id());
                }
            });
        }
    });

    assert!(!ledger.violated.load(Ordering::SeqCst));
    assert_eq!(ledger.live_count(), extensions.binding_count());
    assert_eq!(
        ledger.adds.load(Ordering::SeqCst) - ledger.removes.load(Ordering::SeqCst),
        extensions.binding_count()
    );
    handle.cancel();
}
