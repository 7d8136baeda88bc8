//! Fire-and-forget property tweens on scene nodes.

use std::time::Duration;

use crate::data_structures::scene_graph::{NodeId, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenProperty {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
}

impl TweenProperty {
    pub fn get(self, scene: &Scene, node: NodeId) -> f32 {
        let transform = &scene.node(node).transform;
        match self {
            Self::PositionX => transform.position.x,
            Self::PositionY => transform.position.y,
            Self::PositionZ => transform.position.z,
            Self::RotationX => transform.rotation.x,
            Self::RotationY => transform.rotation.y,
            Self::RotationZ => transform.rotation.z,
        }
    }

    pub fn set(self, scene: &mut Scene, node: NodeId, value: f32) {
        let transform = &mut scene.node_mut(node).transform;
        let slot = match self {
            Self::PositionX => &mut transform.position.x,
            Self::PositionY => &mut transform.position.y,
            Self::PositionZ => &mut transform.position.z,
            Self::RotationX => &mut transform.rotation.x,
            Self::RotationY => &mut transform.rotation.y,
            Self::RotationZ => &mut transform.rotation.z,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// `1 - (1 - t)^2`
    #[default]
    Power1Out,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub node: NodeId,
    pub property: TweenProperty,
    pub to: f32,
    pub duration: Duration,
    pub delay: Duration,
    pub ease: Ease,
    from: Option<f32>,
    elapsed: Duration,
}

impl Tween {
    pub fn new(
        node: NodeId,
        property: TweenProperty,
        to: f32,
        duration: Duration,
        delay: Duration,
    ) -> Self {
        Self {
            node,
            property,
            to,
            duration,
            delay,
            ease: Ease::default(),
            from: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Returns `true` once the tween has written its final value.
    fn advance(&mut self, dt: Duration, scene: &mut Scene) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.delay {
            return false;
        }
        let from = *self
            .from
            .get_or_insert_with(|| self.property.get(scene, self.node));
        let active = self.elapsed - self.delay;
        let t = if self.duration.is_zero() {
            1.0
        } else {
            active.as_secs_f32() / self.duration.as_secs_f32()
        };
        if t >= 1.0 {
            self.property.set(scene, self.node, self.to);
            return true;
        }
        let value = from + (self.to - from) * self.ease.apply(t);
        self.property.set(scene, self.node, value);
        false
    }
}

/// Set of running tweens, advanced once per frame.
#[derive(Debug, Clone, Default)]
pub struct Tweens {
    active: Vec<Tween>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animates `property` of `node` to `to` over `duration`, starting after `delay`.
    pub fn to(
        &mut self,
        node: NodeId,
        property: TweenProperty,
        to: f32,
        duration: Duration,
        delay: Duration,
    ) {
        self.add(Tween::new(node, property, to, duration, delay));
    }

    pub fn add(&mut self, tween: Tween) {
        self.active.push(tween);
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn advance(&mut self, dt: Duration, scene: &mut Scene) {
        self.active.retain_mut(|tween| !tween.advance(dt, scene));
    }
}
