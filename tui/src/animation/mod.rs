//! Spring Animations
//!
//! Scalar transitions under a second-order spring approximation, advanced
//! once per tick at a fixed 60fps timestep. The dispatch loop drives every
//! active handle from the same tick, so per-frame cost stays bounded no
//! matter how many transitions are in flight.
//!
//! A spring settles: once position and velocity are both within
//! [`EPSILON`] of rest, the value snaps exactly to the target and the
//! handle goes inactive. Ticking an inactive spring changes nothing, so
//! the loop can drop to an idle tick rate whenever no handle is active.

use std::time::Duration;

/// Settling threshold for position error and velocity.
pub const EPSILON: f64 = 0.01;

/// Tick period while any animation is active (~60fps).
pub const ACTIVE_TICK: Duration = Duration::from_millis(16);

/// Tick period while nothing is animating.
pub const IDLE_TICK: Duration = Duration::from_millis(250);

/// Integration timestep, matched to [`ACTIVE_TICK`].
const DT: f64 = 1.0 / 60.0;

/// Named stiffness/damping pairs. Fixed per profile, not per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SpringProfile {
    /// Micro-interactions, settles in ~100ms.
    Fast,
    /// General transitions, settles in ~250ms.
    #[default]
    Default,
    /// Deliberate movements, settles in ~500ms.
    Slow,
}

impl SpringProfile {
    fn stiffness(self) -> f64 {
        match self {
            Self::Fast => 320.0,
            Self::Default => 170.0,
            Self::Slow => 60.0,
        }
    }

    fn damping(self) -> f64 {
        match self {
            Self::Fast => 32.0,
            Self::Default => 24.0,
            Self::Slow => 14.0,
        }
    }
}

/// One in-flight scalar transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    profile: SpringProfile,
    position: f64,
    velocity: f64,
    target: f64,
    active: bool,
}

impl Spring {
    /// A settled spring resting at 0.
    pub fn new(profile: SpringProfile) -> Self {
        Self::at(profile, 0.0)
    }

    /// A settled spring resting at `value`.
    pub fn at(profile: SpringProfile, value: f64) -> Self {
        Self {
            profile,
            position: value,
            velocity: 0.0,
            target: value,
            active: false,
        }
    }

    /// Start animating toward `target`.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
        if (self.position - target).abs() >= EPSILON || self.velocity.abs() >= EPSILON {
            self.active = true;
        }
    }

    /// Jump to `value` immediately, no animation.
    pub fn set_current(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
        self.active = false;
    }

    /// Advance one tick. Returns true while still animating.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }

        let accel = self.profile.stiffness() * (self.target - self.position)
            - self.profile.damping() * self.velocity;
        self.velocity += accel * DT;
        self.position += self.velocity * DT;

        if (self.position - self.target).abs() < EPSILON && self.velocity.abs() < EPSILON {
            self.position = self.target;
            self.velocity = 0.0;
            self.active = false;
            return false;
        }
        true
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.position
    }

    /// Where the spring is heading.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whether the spring is still animating.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(spring: &mut Spring) -> usize {
        let mut ticks = 0;
        while spring.tick() {
            ticks += 1;
            assert!(ticks < 10_000, "spring never settled");
        }
        ticks
    }

    #[test]
    fn spring_reaches_its_target_exactly() {
        let mut spring = Spring::new(SpringProfile::Default);
        spring.set_target(1.0);
        settle(&mut spring);
        assert_eq!(spring.value(), 1.0);
        assert!(!spring.is_active());
    }

    #[test]
    fn settled_springs_are_idempotent_under_ticks() {
        let mut spring = Spring::new(SpringProfile::Fast);
        spring.set_target(10.0);
        settle(&mut spring);

        let position = spring.value();
        for _ in 0..100 {
            assert!(!spring.tick());
        }
        assert_eq!(spring.value(), position);
        assert!(!spring.is_active());
    }

    #[test]
    fn profiles_order_by_speed() {
        let mut fast = Spring::new(SpringProfile::Fast);
        let mut default = Spring::new(SpringProfile::Default);
        let mut slow = Spring::new(SpringProfile::Slow);
        fast.set_target(1.0);
        default.set_target(1.0);
        slow.set_target(1.0);

        let fast_ticks = settle(&mut fast);
        let default_ticks = settle(&mut default);
        let slow_ticks = settle(&mut slow);
        assert!(fast_ticks < default_ticks);
        assert!(default_ticks < slow_ticks);
    }

    #[test]
    fn every_profile_settles_promptly() {
        for profile in [SpringProfile::Fast, SpringProfile::Default, SpringProfile::Slow] {
            let mut spring = Spring::new(profile);
            spring.set_target(1.0);
            let ticks = settle(&mut spring);
            assert!(ticks <= 90, "{profile:?} took {ticks} ticks");
        }
    }

    #[test]
    fn set_current_snaps_without_animating() {
        let mut spring = Spring::new(SpringProfile::Slow);
        spring.set_current(5.0);
        assert_eq!(spring.value(), 5.0);
        assert!(!spring.is_active());
    }

    #[test]
    fn targeting_the_current_value_stays_inactive() {
        let mut spring = Spring::at(SpringProfile::Default, 3.0);
        spring.set_target(3.0);
        assert!(!spring.is_active());
        assert!(!spring.tick());
    }
}
