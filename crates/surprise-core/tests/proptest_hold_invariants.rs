//! Property-based invariant tests for the hold gesture.
//!
//! 1. A hold released before the threshold has no visible effect.
//! 2. A hold at or past the threshold hides every flame, then swaps the
//!    heading text, exactly once.
//! 3. Release/re-press cycles never accumulate time across presses.

use std::time::Duration;

use proptest::prelude::*;
use surprise_core::memory::{JournalKind, MemoryScene};
use surprise_core::{HoldState, HoldTrigger, NodeId, TimerQueue};

const FRAME: Duration = Duration::from_millis(10);
const THRESHOLD: Duration = Duration::from_millis(3000);

struct Rig {
    scene: MemoryScene,
    timers: TimerQueue,
    hold: HoldTrigger,
}

impl Rig {
    fn new() -> Self {
        let scene = MemoryScene::new();
        scene.insert_batch(&NodeId::ALL);
        Self {
            scene,
            timers: TimerQueue::new(),
            hold: HoldTrigger::new(THRESHOLD, "Make a wish!"),
        }
    }

    fn frames(&mut self, n: u64) {
        for _ in 0..n {
            self.scene.advance(FRAME);
            for id in self.timers.advance(FRAME) {
                self.hold.on_timer(id, &mut self.timers, &self.scene);
            }
            self.hold.pump(&mut self.timers);
        }
    }

    fn hold_for(&mut self, frames: u64) {
        self.hold.activate_start(&mut self.timers);
        self.frames(frames);
        self.hold.activate_end(&mut self.timers);
    }

    fn text_changes(&self) -> Vec<Duration> {
        self.scene
            .journal_for(NodeId::HeadingWow)
            .into_iter()
            .filter(|e| matches!(e.kind, JournalKind::TextChanged(_)))
            .map(|e| e.at)
            .collect()
    }
}

fn threshold_frames() -> u64 {
    (THRESHOLD.as_millis() / FRAME.as_millis()) as u64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn short_hold_has_no_effect(frames in 0u64..300) {
        let mut rig = Rig::new();
        rig.hold_for(frames);
        rig.frames(400);

        prop_assert_eq!(rig.hold.state(), HoldState::Idle);
        prop_assert_eq!(rig.hold.fire_count(), 0);
        prop_assert!(rig.text_changes().is_empty());
        for flame in NodeId::FLAMES {
            prop_assert!(rig.scene.first(flame, &JournalKind::Hidden).is_none());
        }
    }

    #[test]
    fn long_hold_hides_flames_then_swaps_once(frames in 300u64..600) {
        let mut rig = Rig::new();
        rig.hold_for(frames);
        rig.frames(100);

        prop_assert_eq!(rig.hold.state(), HoldState::Fired);
        prop_assert_eq!(rig.hold.fire_count(), 1);
        let changes = rig.text_changes();
        prop_assert_eq!(changes.len(), 1);
        prop_assert!(changes[0] >= THRESHOLD);
        for flame in NodeId::FLAMES {
            let hidden = rig.scene.first(flame, &JournalKind::Hidden);
            prop_assert!(hidden.is_some_and(|at| at <= changes[0]));
        }
    }

    #[test]
    fn presses_never_accumulate(
        presses in proptest::collection::vec((1u64..299, 0u64..50), 1..8),
    ) {
        let mut rig = Rig::new();
        for (held, gap) in presses {
            rig.hold_for(held);
            rig.frames(gap);
        }
        prop_assert_eq!(rig.hold.fire_count(), 0);
        prop_assert!(rig.text_changes().is_empty());
    }

    #[test]
    fn repeated_full_holds_swap_once(count in 1usize..4) {
        let mut rig = Rig::new();
        for _ in 0..count {
            rig.hold_for(threshold_frames() + 60);
        }
        prop_assert_eq!(rig.hold.fire_count(), count as u32);
        prop_assert_eq!(rig.text_changes().len(), 1);
    }
}
