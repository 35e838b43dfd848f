//! End-to-end release scenarios: ordering, idempotence, weak targets, and
//! scoped ownership.

use std::sync::Arc;

use parking_lot::Mutex;
use releasable::{
    ActionResource, DisposalTracker, OnceGuard, Releasable, ReleaseResult, ScopedOwner,
    WeakResource,
};

type Log = Arc<Mutex<Vec<String>>>;

/// A releasable resource that records its name when released, at most once.
struct NamedResource {
    name: String,
    log: Log,
    released: OnceGuard,
}

impl NamedResource {
    fn new(name: &str, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            log: Arc::clone(log),
            released: OnceGuard::new(),
        })
    }
}

impl Releasable for NamedResource {
    fn release(&self) -> ReleaseResult {
        if self.released.set() {
            return Ok(());
        }
        self.log.lock().push(self.name.clone());
        Ok(())
    }
}

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn logged(log: &Log) -> Vec<String> {
    log.lock().clone()
}

#[test]
fn callbacks_release_in_reverse_registration_order() {
    let log = new_log();
    let tracker = DisposalTracker::new();

    let entry = Arc::clone(&log);
    tracker.add_fn(move || entry.lock().push("a".to_owned()));
    let entry = Arc::clone(&log);
    tracker.add_fn(move || entry.lock().push("b".to_owned()));

    tracker.release().unwrap();
    assert_eq!(logged(&log), ["b", "a"]);

    // Releasing again leaves the log unchanged.
    tracker.release().unwrap();
    assert_eq!(logged(&log), ["b", "a"]);
}

#[test]
fn mixed_entry_kinds_keep_strict_reverse_order() {
    let log = new_log();
    let tracker = DisposalTracker::new();

    let first = tracker.add(NamedResource::new("custom", &log));
    let entry = Arc::clone(&log);
    tracker.add_fn(move || entry.lock().push("callback".to_owned()));
    let observed = NamedResource::new("observed", &log);
    tracker.add_weak(&observed);
    tracker.add(NamedResource::new("last", &log));

    tracker.release().unwrap();
    assert_eq!(logged(&log), ["last", "observed", "callback", "custom"]);

    // The handle returned by add is the tracked resource itself and is
    // already spent.
    first.release().unwrap();
    assert_eq!(logged(&log), ["last", "observed", "callback", "custom"]);
}

#[test]
fn weak_entry_skips_a_reclaimed_target_without_error() {
    let log = new_log();
    let tracker = DisposalTracker::new();

    tracker.add(NamedResource::new("kept", &log));
    let dropped = NamedResource::new("dropped", &log);
    tracker.add_weak(&dropped);
    drop(dropped);

    tracker.release().unwrap();
    assert_eq!(logged(&log), ["kept"], "the reclaimed target must not appear");
}

#[test]
fn weak_entry_releases_a_target_that_is_still_alive() {
    let log = new_log();
    let tracker = DisposalTracker::new();

    let target = NamedResource::new("still-alive", &log);
    let wrapper: Arc<WeakResource> = tracker.add_weak(&target);

    tracker.release().unwrap();
    assert_eq!(logged(&log), ["still-alive"]);
    assert!(wrapper.is_released());

    // The target's own guard makes a later direct release a no-op.
    target.release().unwrap();
    assert_eq!(logged(&log), ["still-alive"]);
}

#[test]
fn tracker_nests_inside_another_tracker() {
    let log = new_log();
    let inner = Arc::new(DisposalTracker::new());
    inner.add(NamedResource::new("inner-resource", &log));

    let outer = DisposalTracker::new();
    outer.add(Arc::clone(&inner));
    outer.add(NamedResource::new("outer-resource", &log));

    outer.release().unwrap();
    assert_eq!(logged(&log), ["outer-resource", "inner-resource"]);
    assert!(inner.is_released());
}

#[test]
fn scoped_owner_tears_down_children_registered_through_it() {
    let log = new_log();
    let owner = ScopedOwner::new();

    owner.track(NamedResource::new("tracked", &log));
    let entry = Arc::clone(&log);
    owner.track_fn(move || entry.lock().push("callback".to_owned()));
    let observed = NamedResource::new("observed", &log);
    owner.tracker().add_weak(&observed);

    owner.close().unwrap();
    assert_eq!(logged(&log), ["observed", "callback", "tracked"]);

    owner.close().unwrap();
    assert_eq!(logged(&log), ["observed", "callback", "tracked"]);
}

#[test]
fn handles_returned_by_every_add_flavor_stay_usable() {
    let log = new_log();
    let tracker = DisposalTracker::new();

    let strong = NamedResource::new("strong", &log);
    let kept = tracker.add_maybe_weak(Arc::clone(&strong), false);
    let observed = NamedResource::new("observed", &log);
    let wrapper = tracker.add_maybe_weak(Arc::clone(&observed), true);

    tracker.release().unwrap();
    assert_eq!(logged(&log), ["observed", "strong"]);

    // Both returned handles are already spent; releasing through them is a
    // no-op whichever concrete adapter sits behind the shared handle.
    kept.release().unwrap();
    wrapper.release().unwrap();
    tracker.release().unwrap();
    assert_eq!(logged(&log), ["observed", "strong"]);
}

#[test]
fn action_resource_spent_by_hand_is_quiet_during_tracker_release() {
    let log = new_log();
    let tracker = DisposalTracker::new();

    let entry = Arc::clone(&log);
    let handle: Arc<ActionResource> =
        tracker.add_fn(move || entry.lock().push("once".to_owned()));

    handle.release().unwrap();
    tracker.release().unwrap();

    assert_eq!(logged(&log), ["once"]);
}
