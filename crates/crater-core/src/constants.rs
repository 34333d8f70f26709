//! Simulation constants and fixed tuning guards.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Default gravity (units/s²), pointing down.
pub const GRAVITY: [f32; 2] = [0.0, -9.81];

// --- Explosion sizing guards ---

/// Smallest blast radius a detonation can resolve to (world units).
pub const MIN_BLAST_RADIUS: f32 = 0.25;

/// Smallest crater depth a detonation can resolve to (world units).
pub const MIN_CRATER_DEPTH: f32 = 0.05;

/// Floor applied to radius/depth multipliers before scaling.
pub const MIN_SIZE_MULTIPLIER: f32 = 0.01;

/// Reference height used when neither an entity nor an override resolves.
pub const DEFAULT_REFERENCE_HEIGHT: f32 = 1.0;

// --- Crater carving ---

/// Carved vertices never go lower than the floor reference plus this margin.
pub const FLOOR_SAFETY_MARGIN: f32 = 0.05;

/// Nearest-surface search radius as a multiple of the blast radius.
pub const SURFACE_SNAP_SEARCH_FACTOR: f32 = 2.0;

/// A detonation closer than this to a terrain surface is considered on it.
pub const SURFACE_CONTACT_TOLERANCE: f32 = 0.05;

// --- Resting physics ---

/// Velocity blend factor toward the slide target per tick on steep slopes.
pub const SLIDE_BLEND: f32 = 0.25;

// --- Lifecycle ---

/// Ticks an exploded projectile lingers before removal (visual spawn grace).
pub const DESTROY_GRACE_TICKS: u32 = 1;

/// Default tuning values, used by `config` defaults.
pub mod defaults {
    pub const FUSE_SECS: f32 = 3.0;
    pub const MAX_FLIGHT_SECS: f32 = 8.0;
    pub const SPIN_DEG_PER_SEC: f32 = 540.0;
    pub const GRENADE_RADIUS: f32 = 0.15;
    pub const GRENADE_MASS: f32 = 0.4;
    pub const MAX_WALKABLE_SLOPE_DEG: f32 = 40.0;
    pub const REST_DAMPING: f32 = 6.0;
    pub const PROBE_DISTANCE: f32 = 0.6;
    pub const REST_SPEED_EPSILON: f32 = 0.01;

    pub const GRENADE_RADIUS_MULTIPLIER: f32 = 3.5;
    pub const GRENADE_DEPTH_MULTIPLIER: f32 = 0.5;
    pub const GRENADE_DAMAGE_CAP: f32 = 50.0;
    pub const GRENADE_KNOCKBACK_CAP: f32 = 12.0;

    pub const DEATH_BURST_RADIUS_MULTIPLIER: f32 = 2.0;
    pub const DEATH_BURST_DEPTH_MULTIPLIER: f32 = 0.25;
    pub const DEATH_BURST_DAMAGE_MULTIPLIER: f32 = 0.5;
    pub const DEATH_BURST_KNOCKBACK_MULTIPLIER: f32 = 0.6;

    pub const HEIGHTFIELD_DEPTH_RATIO: f32 = 0.5;
}
