//! Property-based invariant tests for the tour state machine.
//!
//! These tests verify structural invariants that must hold for any step
//! list and any sequence of host calls:
//!
//! 1. `initialize` never leaves the tour ON.
//! 2. An async optional step without a timeout is always rejected.
//! 3. While ON with a step shown, the current index is in range.
//! 4. `next` followed by `prev` returns to the starting step when every
//!    anchor is mounted.
//! 5. Every StepShow is for a step whose anchor is registered.
//! 6. `end` always leaves OFF with no current step and no visible anchor.
//! 7. The logical clock only moves forward.

use std::time::Duration;

use proptest::prelude::*;
use waypoint_harness::{RecordingAnchor, TourFixture};
use waypoint_runtime::{StepOption, TourEvent, TourStatus};

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StepShape {
    mounted: bool,
    optional: bool,
    delay_ms: u64,
}

fn step_shape() -> impl Strategy<Value = StepShape> {
    (any::<bool>(), any::<bool>(), 0u64..200).prop_map(|(mounted, optional, delay_ms)| StepShape {
        mounted,
        optional,
        delay_ms,
    })
}

fn tour_shapes() -> impl Strategy<Value = Vec<StepShape>> {
    prop::collection::vec(step_shape(), 1..8)
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Next,
    Prev,
    Goto(usize),
    Pause,
    Resume,
    End,
    Advance(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Start),
        3 => Just(Op::Next),
        2 => Just(Op::Prev),
        1 => (0usize..10).prop_map(Op::Goto),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        1 => Just(Op::End),
        4 => (0u64..300).prop_map(Op::Advance),
    ]
}

fn anchor_id(i: usize) -> String {
    format!("step-{i}")
}

fn build(shapes: &[StepShape]) -> (TourFixture, Vec<Option<RecordingAnchor>>) {
    let mut fx = TourFixture::new();
    let anchors = shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| {
            shape.mounted
                .then(|| fx.mount(&anchor_id(i)).expect("unique anchor id"))
        })
        .collect();
    let options: Vec<_> = shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| {
            StepOption::anchored(anchor_id(i))
                .optional(shape.optional)
                .delay_before_step_show(Duration::from_millis(shape.delay_ms))
        })
        .collect();
    fx.tour.initialize(&options, None).expect("valid steps");
    (fx, anchors)
}

fn apply(fx: &mut TourFixture, op: Op) {
    match op {
        Op::Start => fx.tour.start(),
        Op::Next => fx.tour.next(),
        Op::Prev => fx.tour.prev(),
        Op::Goto(i) => fx.tour.goto(i),
        Op::Pause => fx.tour.pause(),
        Op::Resume => fx.tour.resume(),
        Op::End => fx.tour.end(),
        Op::Advance(ms) => fx.advance_ms(ms),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ── 1. Initialize leaves the tour off ───────────────────────────────

    #[test]
    fn initialize_never_turns_the_tour_on(shapes in tour_shapes()) {
        let (fx, _anchors) = build(&shapes);
        prop_assert_eq!(fx.tour.status(), TourStatus::Off);
        prop_assert_eq!(fx.tour.current_index(), None);
        prop_assert_eq!(fx.tour.steps().len(), shapes.len());
    }

    // ── 2. Async optional steps need a timeout ──────────────────────────

    #[test]
    fn async_optional_without_timeout_is_rejected(
        shapes in tour_shapes(),
        bad in any::<prop::sample::Index>(),
    ) {
        let mut fx = TourFixture::new();
        let bad = bad.index(shapes.len());
        let options: Vec<_> = (0..shapes.len())
            .map(|i| {
                let option = StepOption::anchored(anchor_id(i));
                if i == bad {
                    option.optional(true).asynchronous(None)
                } else {
                    option
                }
            })
            .collect();
        prop_assert!(fx.tour.initialize(&options, None).is_err());
        prop_assert!(fx.tour.steps().is_empty());
    }

    // ── 3/5/6/7. Arbitrary call sequences ───────────────────────────────

    #[test]
    fn arbitrary_sequences_keep_invariants(
        shapes in tour_shapes(),
        ops in prop::collection::vec(op(), 0..40),
    ) {
        let (mut fx, anchors) = build(&shapes);
        let mut last_now = fx.tour.now();

        for op in ops {
            apply(&mut fx, op);

            let now = fx.tour.now();
            prop_assert!(now >= last_now);
            last_now = now;

            if let Some(index) = fx.tour.current_index() {
                prop_assert!(index < shapes.len());
            }
            if fx.tour.status() == TourStatus::Off {
                prop_assert_eq!(fx.tour.current_index(), None);
            }
            if matches!(op, Op::End) && !fx.tour.is_waiting_for_scroll() {
                prop_assert_eq!(fx.tour.status(), TourStatus::Off);
                for anchor in anchors.iter().flatten() {
                    prop_assert!(!anchor.is_visible());
                }
            }
        }

        for event in fx.log.events() {
            if let TourEvent::StepShow(change) = event {
                prop_assert!(shapes[change.index].mounted);
            }
        }
    }

    // ── 4. next then prev ───────────────────────────────────────────────

    #[test]
    fn next_then_prev_round_trips(len in 2usize..8, start in any::<prop::sample::Index>()) {
        let shapes: Vec<_> = (0..len)
            .map(|_| StepShape { mounted: true, optional: false, delay_ms: 0 })
            .collect();
        let (mut fx, _anchors) = build(&shapes);
        let start = start.index(len - 1);

        fx.tour.start_at(start);
        fx.advance_ms(1);
        prop_assert_eq!(fx.tour.current_index(), Some(start));

        fx.tour.next();
        fx.advance_ms(1);
        prop_assert_eq!(fx.tour.current_index(), Some(start + 1));

        fx.tour.prev();
        fx.advance_ms(1);
        prop_assert_eq!(fx.tour.current_index(), Some(start));
        prop_assert_eq!(fx.tour.status(), TourStatus::On);
    }
}
