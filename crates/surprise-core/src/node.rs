#![forbid(unsafe_code)]

//! Visual node model: ids, transforms, keyframes, and the mutation interface.
//!
//! Nodes are owned by an external scene. The core never creates or destroys
//! them; it only holds [`NodeRef`] handles and mutates them through the
//! [`VisualNode`] trait. Handles mutate through `&self` the same way a DOM
//! element reference or a retained-mode widget handle would.
//!
//! # Invariants
//!
//! 1. A hidden node has `visible == false`, `interactive == false`, and
//!    `opacity == 0.0`. [`Mutation::Hide`] is the only way the core hides.
//! 2. A shown node has `visible == true` and `interactive == true`.
//! 3. `Transform` round-trips through its string encoding:
//!    `t.to_string().parse::<Transform>() == Ok(t)` for finite components.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::RevealError;
use crate::transition::{TransitionHandle, TransitionSpec};

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Stable identifier of one layer in the reveal scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(try_from = "String", into = "String"))]
pub enum NodeId {
    CatsLeft,
    CatsRight,
    HeadingWow,
    Subtext,
    Cake,
    Flame1,
    Flame2,
    Flame3,
    Flame4,
    Flame5,
    ActionButton,
}

impl NodeId {
    /// Every node the reveal scene requires, in readiness watch order.
    pub const ALL: [NodeId; 11] = [
        NodeId::CatsLeft,
        NodeId::CatsRight,
        NodeId::HeadingWow,
        NodeId::Subtext,
        NodeId::Cake,
        NodeId::Flame1,
        NodeId::Flame2,
        NodeId::Flame3,
        NodeId::Flame4,
        NodeId::Flame5,
        NodeId::ActionButton,
    ];

    /// The five candle flames.
    pub const FLAMES: [NodeId; 5] = [
        NodeId::Flame1,
        NodeId::Flame2,
        NodeId::Flame3,
        NodeId::Flame4,
        NodeId::Flame5,
    ];

    /// Registry name of this node.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CatsLeft => "cats-left",
            Self::CatsRight => "cats-right",
            Self::HeadingWow => "heading-wow",
            Self::Subtext => "subtext",
            Self::Cake => "cake",
            Self::Flame1 => "flame-1",
            Self::Flame2 => "flame-2",
            Self::Flame3 => "flame-3",
            Self::Flame4 => "flame-4",
            Self::Flame5 => "flame-5",
            Self::ActionButton => "action-button",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for NodeId {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| RevealError::UnknownNode {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for NodeId {
    type Error = RevealError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// 2D transform: a translation in pixels followed by a uniform scale.
///
/// Encoded as `translate(<x>px, <y>px) scale(<s>)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl Transform {
    /// Identity transform.
    pub const NEUTRAL: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    /// Pure translation at unit scale.
    #[must_use]
    pub const fn translate(x: f32, y: f32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            scale: 1.0,
        }
    }

    /// Pure scale with no translation.
    #[must_use]
    pub const fn scaled(scale: f32) -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale,
        }
    }

    /// Replace the scale component (builder pattern).
    #[must_use]
    pub const fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Component-wise linear interpolation. `t` is not clamped so overshooting
    /// easings carry through to the transform.
    #[must_use]
    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            translate_x: lerp(self.translate_x, to.translate_x, t),
            translate_y: lerp(self.translate_y, to.translate_y, t),
            scale: lerp(self.scale, to.scale, t),
        }
    }

    /// Whether this transform is (approximately) the identity.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.translate_x.abs() < 1e-4
            && self.translate_y.abs() < 1e-4
            && (self.scale - 1.0).abs() < 1e-4
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

impl FromStr for Transform {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RevealError::InvalidTransform {
            input: s.to_string(),
        };

        let rest = s.trim().strip_prefix("translate(").ok_or_else(invalid)?;
        let (args, rest) = rest.split_once(')').ok_or_else(invalid)?;
        let (x, y) = args.split_once(',').ok_or_else(invalid)?;
        let translate_x = parse_px(x).ok_or_else(invalid)?;
        let translate_y = parse_px(y).ok_or_else(invalid)?;

        let rest = rest.trim();
        let scale = if rest.is_empty() {
            1.0
        } else {
            let inner = rest
                .strip_prefix("scale(")
                .and_then(|r| r.strip_suffix(')'))
                .ok_or_else(invalid)?;
            inner.trim().parse::<f32>().map_err(|_| invalid())?
        };

        Ok(Self {
            translate_x,
            translate_y,
            scale,
        })
    }
}

fn parse_px(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    raw.strip_suffix("px").unwrap_or(raw).trim().parse().ok()
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ---------------------------------------------------------------------------
// Keyframe
// ---------------------------------------------------------------------------

/// The animatable subset of a node's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub opacity: f32,
    pub transform: Transform,
}

impl Keyframe {
    /// Fully opaque at the identity transform.
    pub const REST: Keyframe = Keyframe {
        opacity: 1.0,
        transform: Transform::NEUTRAL,
    };

    #[must_use]
    pub const fn new(opacity: f32, transform: Transform) -> Self {
        Self { opacity, transform }
    }

    /// Interpolate towards `to`. Opacity is clamped to `[0, 1]`; the
    /// transform is not.
    #[must_use]
    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            opacity: lerp(self.opacity, to.opacity, t).clamp(0.0, 1.0),
            transform: self.transform.lerp(to.transform, t),
        }
    }
}

// ---------------------------------------------------------------------------
// NodeState
// ---------------------------------------------------------------------------

/// Snapshot of every attribute the core reads or writes on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub opacity: f32,
    pub transform: Transform,
    pub visible: bool,
    pub interactive: bool,
    pub text: String,
}

impl NodeState {
    /// The animatable part of this state.
    #[must_use]
    pub fn keyframe(&self) -> Keyframe {
        Keyframe::new(self.opacity, self.transform)
    }

    /// Whether the node satisfies the hidden invariant.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        !self.visible && !self.interactive && self.opacity <= f32::EPSILON
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transform: Transform::NEUTRAL,
            visible: true,
            interactive: true,
            text: String::new(),
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "opacity={:.2} transform=\"{}\" visible={} interactive={}",
            self.opacity, self.transform, self.visible, self.interactive
        )?;
        if !self.text.is_empty() {
            write!(f, " text={:?}", self.text)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// VisualNode
// ---------------------------------------------------------------------------

/// Mutable handle to an externally owned visual layer.
pub trait VisualNode {
    /// Current attribute snapshot.
    fn state(&self) -> NodeState;

    fn set_opacity(&self, opacity: f32);

    fn set_transform(&self, transform: Transform);

    fn set_visible(&self, visible: bool);

    fn set_interactive(&self, interactive: bool);

    fn set_text(&self, text: &str);

    /// Start a timed transition and return its completion signal.
    ///
    /// Implementations must eventually settle the handle, either
    /// `Finished` or `Interrupted`, or the owning stage never settles.
    fn animate(&self, spec: &TransitionSpec) -> TransitionHandle;
}

/// Shared handle to a node.
pub type NodeRef = Rc<dyn VisualNode>;

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

/// Immediate (non-animated) change applied to one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Opacity 0, not visible, not interactive. The transform is kept.
    Hide,
    /// Visible and interactive at the given pose.
    Show(Keyframe),
    /// Set the pose without touching visibility or interactivity.
    Pose(Keyframe),
    /// Replace the text content.
    SetText(String),
}

impl Mutation {
    /// Apply this mutation to `node`.
    pub fn apply(&self, node: &dyn VisualNode) {
        match self {
            Self::Hide => {
                node.set_opacity(0.0);
                node.set_interactive(false);
                node.set_visible(false);
            }
            Self::Show(frame) => {
                node.set_transform(frame.transform);
                node.set_opacity(frame.opacity);
                node.set_visible(true);
                node.set_interactive(true);
            }
            Self::Pose(frame) => {
                node.set_transform(frame.transform);
                node.set_opacity(frame.opacity);
            }
            Self::SetText(text) => node.set_text(text),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Show(_) => "show",
            Self::Pose(_) => "pose",
            Self::SetText(_) => "set_text",
        }
    }
}
