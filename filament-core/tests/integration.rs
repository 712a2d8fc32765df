//! Integration Tests for Reactive System
//!
//! These tests verify that cells, computed cells, effects and watches work
//! together correctly.

use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use filament_core::equality::deep_equal;
use filament_core::{
    computed, effect, effect_with, readonly, state, watch, Cleanup, EffectOptions, Json, Runtime,
    RuntimeConfig,
};
use serde::Serialize;
use serde_json::json;

fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

fn bump(counter: &Rc<Cell<usize>>) {
    counter.set(counter.get() + 1);
}

/// Test that a cell starts with its initial value.
#[test]
fn state_initial_value() {
    let count = state(10);
    assert_eq!(count.get(), 10);
}

/// Test that a write updates the value and re-runs each reader exactly once.
#[test]
fn write_updates_and_notifies_once() {
    let count = state(10);
    let runs = counter();

    let (reader, runs_c) = (count.clone(), runs.clone());
    effect(move || {
        reader.get();
        bump(&runs_c);
    });

    count.set(20);
    assert_eq!(count.get(), 20);
    assert_eq!(runs.get(), 2);
}

/// Test that writing the current value notifies nobody.
#[test]
fn unchanged_write_is_a_no_op() {
    let count = state(10);
    let runs = counter();

    let (reader, runs_c) = (count.clone(), runs.clone());
    effect(move || {
        reader.get();
        bump(&runs_c);
    });

    count.set(10);
    assert_eq!(runs.get(), 1);
}

/// Test that a computed cell tracks its derivation across writes.
#[test]
fn computed_tracks_derivation() {
    let count = state(2);
    let source = count.clone();
    let double = computed(move || source.get() * 2);

    assert_eq!(double.get(), 4);
    for n in 3..8 {
        count.set(n);
        assert_eq!(double.get(), count.get() * 2);
    }
}

/// Test that an effect runs once at creation, before returning.
#[test]
fn effect_runs_once_at_creation() {
    let runs = counter();
    let runs_c = runs.clone();

    effect(move || bump(&runs_c));

    assert_eq!(runs.get(), 1);
}

/// Test the cleanup protocol: released once before the second run, never
/// if there is no second run.
#[test]
fn cleanup_runs_before_rerun_only() {
    let count = state(10);
    let log = Rc::new(RefCell::new(Vec::new()));

    let (reader, log_c) = (count.clone(), log.clone());
    effect(move || {
        reader.get();
        log_c.borrow_mut().push("run");
        let log = log_c.clone();
        Cleanup::new(move || log.borrow_mut().push("cleanup"))
    });

    assert_eq!(*log.borrow(), vec!["run"]);

    count.set(20);
    assert_eq!(*log.borrow(), vec!["run", "cleanup", "run"]);
}

/// Test that a skipped effect never runs, even after its would-be
/// dependencies change.
#[test]
fn skip_option_suppresses_effect() {
    let count = state(10);
    let runs = counter();

    let (reader, runs_c) = (count.clone(), runs.clone());
    effect_with(
        move || {
            reader.get();
            bump(&runs_c);
        },
        EffectOptions::skipped(),
    );

    count.set(20);
    assert_eq!(runs.get(), 0);
    assert_eq!(Runtime::runner_count(), 0);
}

/// Test that a watch fires only when the watched value changes.
#[test]
fn watch_fires_only_on_change() {
    let x = state(10);
    let calls = Rc::new(RefCell::new(Vec::new()));

    let (source, calls_c) = (x.clone(), calls.clone());
    watch(move || source.get(), move |new, old| calls_c.borrow_mut().push((*new, *old)));

    x.set(10);
    assert!(calls.borrow().is_empty());

    x.set(20);
    assert_eq!(*calls.borrow(), vec![(20, 10)]);
}

/// Test structural equality over JSON values.
#[test]
fn deep_equality_over_json() {
    let a = json!({ "a": 1, "nested": { "b": 2 } });
    assert!(deep_equal(&a, &json!({ "a": 1, "nested": { "b": 2 } })));
    assert!(!deep_equal(&a, &json!({ "a": 1, "nested": { "b": 2 }, "c": 3 })));
    assert!(!deep_equal(&a, &json!({ "a": 1 })));
    assert!(!deep_equal(&a, &json!({ "a": 1, "nested": { "b": 9 } })));
    assert!(deep_equal(&json!(null), &json!(null)));
    assert!(!deep_equal(&json!(null), &json!({})));
}

/// Test that a readonly view reflects its live source.
#[test]
fn readonly_reflects_source() {
    let count = state(10);
    let view = readonly(&count);

    assert_eq!(view.get(), 10);
    count.set(20);
    assert_eq!(view.get(), 20);
}

/// Test that a runner stops reacting to cells its latest run did not read.
#[test]
fn stale_dependencies_are_pruned() {
    let use_a = state(true);
    let a = state(0);
    let b = state(0);
    let runs = counter();

    let (flag, a_r, b_r, runs_c) = (use_a.clone(), a.clone(), b.clone(), runs.clone());
    let handle = effect(move || {
        bump(&runs_c);
        if flag.get() {
            a_r.get();
        } else {
            b_r.get();
        }
    });
    assert_eq!(handle.dependency_count(), 2);

    use_a.set(false);
    assert_eq!(runs.get(), 2);
    assert_eq!(a.subscriber_count(), 0);

    a.set(1);
    assert_eq!(runs.get(), 2);

    b.set(1);
    assert_eq!(runs.get(), 3);
}

/// Test that reads inside a nested effect attribute to the inner effect.
#[test]
fn nested_effects_attribute_to_innermost() {
    let outer_dep = state(0);
    let inner_dep = state(0);
    let outer_runs = counter();
    let inner_runs = counter();

    let (od, id, or, ir) = (
        outer_dep.clone(),
        inner_dep.clone(),
        outer_runs.clone(),
        inner_runs.clone(),
    );
    let outer = effect(move || {
        bump(&or);
        od.get();
        let (id, ir) = (id.clone(), ir.clone());
        let inner = effect(move || {
            bump(&ir);
            id.get();
        });
        // Each outer run owns the inner effect it created.
        Cleanup::new(move || inner.dispose())
    });

    assert_eq!(outer.dependency_count(), 1);
    assert_eq!(inner_dep.subscriber_count(), 1);

    inner_dep.set(1);
    assert_eq!(outer_runs.get(), 1);
    assert_eq!(inner_runs.get(), 2);

    outer_dep.set(1);
    assert_eq!(outer_runs.get(), 2);
    assert_eq!(inner_runs.get(), 3);
    assert_eq!(inner_dep.subscriber_count(), 1);
    assert_eq!(Runtime::runner_count(), 2);
}

/// Test that a diamond converges, and that the downstream effect observes
/// each intermediate write.
#[test]
fn diamond_converges_with_visible_intermediate_state() {
    let base = state(1);
    let (b1, b2) = (base.clone(), base.clone());
    let left = computed(move || b1.get() * 2);
    let right = computed(move || b2.get() + 10);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let (l, r, seen_c) = (left.clone(), right.clone(), seen.clone());
    effect(move || seen_c.borrow_mut().push((l.get(), r.get())));

    base.set(2);
    assert_eq!(*seen.borrow(), vec![(2, 11), (4, 11), (4, 12)]);
    assert_eq!((left.get(), right.get()), (4, 12));
}

/// Test that a runner may write to the cell it reads until it converges.
#[test]
fn reentrant_writes_converge() {
    let x = state(0);
    let reader = x.clone();
    effect(move || {
        let v = reader.get();
        if v < 5 {
            reader.set(v + 1);
        }
    });

    assert_eq!(x.get(), 5);
    assert_eq!(Runtime::depth(), 0);
}

/// Test that a runner whose own write re-runs it keeps reacting to what the
/// re-entrant run read.
#[test]
fn reentrant_run_with_new_dependencies_stays_subscribed() {
    let flag = state(true);
    let a = state(0);
    let b = state(0);
    let runs = counter();

    let (flag_r, a_r, b_r, runs_c) = (flag.clone(), a.clone(), b.clone(), runs.clone());
    effect(move || {
        bump(&runs_c);
        if flag_r.get() {
            a_r.get();
            flag_r.set(false);
        } else {
            b_r.get();
        }
    });

    assert_eq!(runs.get(), 2);
    assert_eq!(b.subscriber_count(), 1);

    b.set(1);
    assert_eq!(runs.get(), 3);
    assert_eq!(a.subscriber_count(), 0);

    a.set(1);
    assert_eq!(runs.get(), 3);

    b.set(2);
    assert_eq!(runs.get(), 4);
}

/// Test that two re-entrant runs inside one outer run leave every cell the
/// outer run read subscribed.
#[test]
fn repeated_reentrant_runs_keep_outer_reads() {
    let step = state(0);
    let outer_only = state(0);
    let runs = counter();

    let (step_r, outer_r, runs_c) = (step.clone(), outer_only.clone(), runs.clone());
    effect(move || {
        bump(&runs_c);
        match step_r.get() {
            0 => {
                outer_r.get();
                step_r.set(1);
                // This run skips `outer_only` and prunes it.
                step_r.set(2);
            }
            1 => {
                outer_r.get();
            }
            _ => {}
        }
    });

    assert_eq!(runs.get(), 3);
    assert_eq!(outer_only.subscriber_count(), 1);

    outer_only.set(1);
    assert_eq!(runs.get(), 4);
    assert_eq!(outer_only.subscriber_count(), 0);
}

/// Test that a panicking callback propagates, pops its frame and keeps its
/// subscriptions.
#[test]
fn panicking_callback_leaves_tracking_intact() {
    let count = state(0);
    let unrelated = state(0);

    let reader = count.clone();
    effect(move || {
        if reader.get() == 1 {
            panic!("refusing to render 1");
        }
    });

    let result = catch_unwind(AssertUnwindSafe(|| count.set(1)));
    assert!(result.is_err());
    assert_eq!(Runtime::depth(), 0);
    assert_eq!(count.get(), 1);

    // Reads outside any runner attribute to nobody.
    unrelated.get();
    assert_eq!(unrelated.subscriber_count(), 0);

    // Still subscribed: later writes keep reaching the effect.
    assert_eq!(count.subscriber_count(), 1);
    count.set(2);
    assert_eq!(Runtime::depth(), 0);
}

/// Test that a failing first run still leaves the runner subscribed.
#[test]
fn failing_initial_run_keeps_subscription() {
    let count = state(0);
    let reader = count.clone();

    let result = catch_unwind(AssertUnwindSafe(|| {
        effect::<_, ()>(move || {
            reader.get();
            panic!("first run fails");
        })
    }));

    assert!(result.is_err());
    assert_eq!(count.subscriber_count(), 1);
    assert_eq!(Runtime::runner_count(), 1);
}

/// Test that a non-converging write cycle is stopped as a fatal overflow.
#[test]
fn write_cycle_overflows() {
    Runtime::configure(RuntimeConfig::default().with_max_depth(32));

    let a = state(0);
    let b = state(0);

    let (a1, b1) = (a.clone(), b.clone());
    effect(move || b1.set(a1.get() + 1));

    let (a2, b2) = (a.clone(), b.clone());
    let result = catch_unwind(AssertUnwindSafe(|| {
        effect(move || a2.set(b2.get() + 1));
    }));

    let payload = result.unwrap_err();
    let message = payload.downcast_ref::<String>().cloned().unwrap_or_default();
    assert!(message.contains("never converged"), "unexpected panic: {message}");
    assert_eq!(Runtime::depth(), 0);
}

/// Test that a disposed effect never runs again and releases its cleanup
/// exactly once.
#[test]
fn disposed_effect_does_not_run() {
    let count = state(0);
    let runs = counter();
    let released = counter();

    let (reader, runs_c, released_c) = (count.clone(), runs.clone(), released.clone());
    let handle = effect(move || {
        reader.get();
        bump(&runs_c);
        let released = released_c.clone();
        Cleanup::new(move || bump(&released))
    });

    handle.dispose();
    handle.dispose();
    count.set(1);
    count.set(2);

    assert_eq!(runs.get(), 1);
    assert_eq!(released.get(), 1);
    assert!(!handle.is_active());
}

/// Test that an effect can dispose itself from inside its own run.
#[test]
fn effect_disposes_itself() {
    let count = state(0);
    let runs = counter();
    let slot: Rc<Cell<Option<filament_core::Effect>>> = Rc::new(Cell::new(None));

    let (reader, runs_c, slot_c) = (count.clone(), runs.clone(), slot.clone());
    let handle = effect(move || {
        bump(&runs_c);
        if reader.get() >= 2 {
            if let Some(me) = slot_c.get() {
                me.dispose();
            }
        }
    });
    slot.set(Some(handle));

    count.set(1);
    count.set(2);
    count.set(3);

    assert_eq!(runs.get(), 3);
    assert_eq!(count.subscriber_count(), 0);
    assert!(!handle.is_active());
}

/// Test that identity-distinct but equal values re-run runners but not
/// watch callbacks.
#[test]
fn identity_writes_versus_deep_watch() {
    #[derive(Clone, Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    let point = state(Rc::new(Point { x: 0, y: 0 }));
    let runs = counter();
    let changes = counter();

    let (reader, runs_c) = (point.clone(), runs.clone());
    effect(move || {
        reader.get();
        bump(&runs_c);
    });

    let (source, changes_c) = (point.clone(), changes.clone());
    watch(
        move || {
            let p = source.get();
            Json(Point { x: p.x, y: p.y })
        },
        move |_, _| bump(&changes_c),
    );

    point.set(Rc::new(Point { x: 0, y: 0 }));
    assert_eq!(runs.get(), 2);
    assert_eq!(changes.get(), 0);

    point.set(Rc::new(Point { x: 1, y: 0 }));
    assert_eq!(runs.get(), 3);
    assert_eq!(changes.get(), 1);
}

/// Test that the write hook runs after every value-changing write.
#[test]
fn write_hook_follows_changing_writes() {
    let renders = counter();
    let renders_c = renders.clone();
    Runtime::set_write_hook(move || bump(&renders_c));

    let count = state(0);
    count.set(1);
    count.set(1);
    count.set(2);
    assert_eq!(renders.get(), 2);

    Runtime::clear_write_hook();
    count.set(3);
    assert_eq!(renders.get(), 2);
}

/// Test that runners in one thread are invisible to another.
#[test]
fn runtimes_are_thread_local() {
    let count = state(0);
    let reader = count.clone();
    effect(move || {
        reader.get();
    });
    assert_eq!(Runtime::runner_count(), 1);

    let elsewhere = std::thread::spawn(Runtime::runner_count).join().unwrap();
    assert_eq!(elsewhere, 0);
}
