#![forbid(unsafe_code)]

//! The hand-authored reveal script and the hold swap effect.
//!
//! Timings are in milliseconds of virtual time.
//!
//! | Stage | Nodes | Duration | Easing |
//! |-------|-------|----------|--------|
//! | init  | hide subtext/cake/flames/button, pose cats + heading | immediate | – |
//! | A     | cats-left, cats-right (+150 delay) | 500 | overshoot |
//! | B     | heading-wow | 450 | overshoot |
//! | C     | subtext | 400 | ease-in-out |
//! | D     | cake | 500 | overshoot |
//! | E     | wait, then show flames | 200 | – |
//! | F     | action-button | 350 | overshoot |
//!
//! The full run takes about 2.55 s, under the 3 s hold threshold.

use std::time::Duration;

use crate::easing::Easing;
use crate::node::{Keyframe, Mutation, NodeId, Transform};
use crate::sequencer::Stage;
use crate::transition::TransitionSpec;

pub const CATS_DURATION: Duration = Duration::from_millis(500);
pub const CATS_RIGHT_DELAY: Duration = Duration::from_millis(150);
pub const HEADING_DURATION: Duration = Duration::from_millis(450);
pub const SUBTEXT_DURATION: Duration = Duration::from_millis(400);
pub const CAKE_DURATION: Duration = Duration::from_millis(500);
pub const FLAMES_DELAY: Duration = Duration::from_millis(200);
pub const BUTTON_DURATION: Duration = Duration::from_millis(350);

pub const HEADING_OUT_DURATION: Duration = Duration::from_millis(180);
pub const HEADING_IN_DURATION: Duration = Duration::from_millis(320);

/// Index of the first reveal stage (A) in [`reveal_stages`].
pub const STAGE_A: usize = 1;
pub const STAGE_B: usize = 2;
pub const STAGE_C: usize = 3;
pub const STAGE_D: usize = 4;
/// Stage E is a delay followed by the flame mutation.
pub const STAGE_E_DELAY: usize = 5;
pub const STAGE_E_FLAMES: usize = 6;
pub const STAGE_F: usize = 7;

const CATS_LEFT_POSE: Transform = Transform::translate(-40.0, 0.0);
const CATS_RIGHT_POSE: Transform = Transform::translate(40.0, 0.0);
const HEADING_POSE: Transform = Transform::translate(0.0, -12.0).with_scale(0.9);
const SUBTEXT_POSE: Transform = Transform::translate(0.0, 8.0);
const CAKE_POSE: Transform = Transform::scaled(0.92);
const BUTTON_POSE: Transform = Transform::scaled(0.9);

/// Nodes hidden by the initialize step.
pub const HIDDEN_AT_START: [NodeId; 8] = [
    NodeId::Subtext,
    NodeId::Cake,
    NodeId::Flame1,
    NodeId::Flame2,
    NodeId::Flame3,
    NodeId::Flame4,
    NodeId::Flame5,
    NodeId::ActionButton,
];

fn reveal(node: NodeId, from: Transform, duration: Duration, easing: Easing) -> TransitionSpec {
    TransitionSpec::between(node, Keyframe::new(0.0, from), Keyframe::REST, duration)
        .easing(easing)
        .revealing()
}

/// Initialize mutations: hide the late nodes, pose the early ones.
///
/// Hidden nodes keep whatever transform they already had (or neutral, for a
/// node that never had one), so the hide is a pure visibility change.
#[must_use]
pub fn reveal_initial_state() -> Vec<(NodeId, Mutation)> {
    let mut mutations: Vec<(NodeId, Mutation)> = HIDDEN_AT_START
        .iter()
        .map(|&id| (id, Mutation::Hide))
        .collect();

    for (id, pose) in [
        (NodeId::CatsLeft, CATS_LEFT_POSE),
        (NodeId::CatsRight, CATS_RIGHT_POSE),
        (NodeId::HeadingWow, HEADING_POSE),
    ] {
        mutations.push((id, Mutation::Pose(Keyframe::new(0.0, pose))));
    }
    mutations
}

/// The complete reveal run: initialize, then stages A–F.
#[must_use]
pub fn reveal_stages() -> Vec<Stage> {
    let flames = NodeId::FLAMES
        .iter()
        .map(|&id| (id, Mutation::Show(Keyframe::REST)))
        .collect();

    vec![
        Stage::Mutate(reveal_initial_state()),
        // A
        Stage::Parallel(vec![
            reveal(NodeId::CatsLeft, CATS_LEFT_POSE, CATS_DURATION, Easing::OVERSHOOT),
            reveal(NodeId::CatsRight, CATS_RIGHT_POSE, CATS_DURATION, Easing::OVERSHOOT)
                .delay(CATS_RIGHT_DELAY),
        ]),
        // B
        Stage::Transition(reveal(
            NodeId::HeadingWow,
            HEADING_POSE,
            HEADING_DURATION,
            Easing::OVERSHOOT,
        )),
        // C
        Stage::Transition(reveal(
            NodeId::Subtext,
            SUBTEXT_POSE,
            SUBTEXT_DURATION,
            Easing::EaseInOut,
        )),
        // D
        Stage::Transition(reveal(NodeId::Cake, CAKE_POSE, CAKE_DURATION, Easing::OVERSHOOT)),
        // E
        Stage::Delay(FLAMES_DELAY),
        Stage::Mutate(flames),
        // F
        Stage::Transition(reveal(
            NodeId::ActionButton,
            BUTTON_POSE,
            BUTTON_DURATION,
            Easing::OVERSHOOT,
        )),
    ]
}

/// Swap effect played when a hold completes: flames out, heading out, text
/// swap, heading back in with a small overshoot.
#[must_use]
pub fn hold_swap_stages(replacement_text: &str) -> Vec<Stage> {
    let out = TransitionSpec::between(
        NodeId::HeadingWow,
        Keyframe::REST,
        Keyframe::new(0.0, Transform::scaled(0.95)),
        HEADING_OUT_DURATION,
    )
    .easing(Easing::EaseOut);

    let back_in = TransitionSpec::new(
        NodeId::HeadingWow,
        vec![
            Keyframe::new(0.0, Transform::NEUTRAL),
            Keyframe::new(1.0, Transform::scaled(1.03)),
            Keyframe::REST,
        ],
        HEADING_IN_DURATION,
    )
    .easing(Easing::OVERSHOOT);

    vec![
        Stage::Mutate(NodeId::FLAMES.iter().map(|&id| (id, Mutation::Hide)).collect()),
        Stage::Transition(out),
        Stage::Mutate(vec![(
            NodeId::HeadingWow,
            Mutation::SetText(replacement_text.to_string()),
        )]),
        Stage::Transition(back_in),
    ]
}

/// Nominal length of the reveal run with no faults.
#[must_use]
pub fn reveal_duration() -> Duration {
    CATS_RIGHT_DELAY
        + CATS_DURATION
        + HEADING_DURATION
        + SUBTEXT_DURATION
        + CAKE_DURATION
        + FLAMES_DELAY
        + BUTTON_DURATION
}
