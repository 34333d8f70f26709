//! Slope-aware resting physics for landed projectiles.
//!
//! A ground probe supplies the surface normal. On walkable slopes the
//! tangential pull of gravity is cancelled and tangential velocity is
//! damped; on steep slopes the projectile keeps sliding but may not sink
//! into the surface.

use crater_core::constants::SLIDE_BLEND;
use crater_core::types::{clamp01, Vec2};

/// Inputs that stay fixed for a projectile across ticks.
#[derive(Debug, Clone, Copy)]
pub struct RestingParams {
    pub gravity: Vec2,
    pub mass: f32,
    pub max_walkable_slope_deg: f32,
    /// Tangential damping rate (per second).
    pub damping: f32,
    pub dt: f32,
    /// Below this speed nothing is adjusted.
    pub speed_epsilon: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestingMode {
    Walkable,
    Sliding,
}

/// Adjusted state for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestingStep {
    pub mode: RestingMode,
    pub velocity: Vec2,
    /// Force for the physics substrate to apply this tick.
    pub counter_force: Vec2,
    pub slope_deg: f32,
}

/// Unit tangent perpendicular to `normal`, oriented rightward (x ≥ 0).
pub fn surface_tangent(normal: Vec2) -> Vec2 {
    let tangent = Vec2::new(normal.y, -normal.x).normalize_or_zero();
    if tangent.x < 0.0 {
        -tangent
    } else {
        tangent
    }
}

/// Slope of a rightward tangent relative to horizontal, in [0, 90] degrees.
pub fn slope_degrees(tangent: Vec2) -> f32 {
    tangent.y.atan2(tangent.x).abs().to_degrees()
}

/// Settle on walkable ground: cancel gravity along the tangent and damp
/// tangential velocity. The normal component is left untouched.
pub fn rest_on_walkable(velocity: Vec2, tangent: Vec2, params: &RestingParams) -> (Vec2, Vec2) {
    let counter_force = -params.gravity.dot(tangent) * tangent * params.mass;

    let tangential = velocity.dot(tangent);
    let normal_part = velocity - tangent * tangential;
    let damp = clamp01(params.damping * params.dt);
    let damped = tangent * tangential * (1.0 - damp);

    (normal_part + damped, counter_force)
}

/// Keep sliding on steep ground. The normal component is dropped only
/// when it points into the surface, and the result is blended in.
pub fn slide(velocity: Vec2, normal: Vec2, tangent: Vec2) -> Vec2 {
    let tangential = tangent * velocity.dot(tangent);
    let normal_speed = velocity.dot(normal);
    let normal_part = if normal_speed < 0.0 {
        Vec2::ZERO
    } else {
        normal * normal_speed
    };
    velocity.lerp(tangential + normal_part, SLIDE_BLEND)
}

/// One tick of resting physics, or `None` when the projectile is
/// effectively still or the probe normal is degenerate.
pub fn resting_step(
    velocity: Vec2,
    ground_normal: Vec2,
    params: &RestingParams,
) -> Option<RestingStep> {
    if velocity.length() <= params.speed_epsilon {
        return None;
    }
    let normal = ground_normal.try_normalize()?;
    let tangent = surface_tangent(normal);
    let slope_deg = slope_degrees(tangent);

    if slope_deg <= params.max_walkable_slope_deg {
        let (velocity, counter_force) = rest_on_walkable(velocity, tangent, params);
        Some(RestingStep {
            mode: RestingMode::Walkable,
            velocity,
            counter_force,
            slope_deg,
        })
    } else {
        Some(RestingStep {
            mode: RestingMode::Sliding,
            velocity: slide(velocity, normal, tangent),
            counter_force: Vec2::ZERO,
            slope_deg,
        })
    }
}
