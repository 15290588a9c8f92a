//! Engine-side parts an entity is assembled from
//!
//! These stand in for the engine's visual, physics and collision
//! components. The save system never persists them; it only needs to know
//! whether a recreated entity has what physics requires before state is
//! imported onto it.

/// How the physics engine moves a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Kinematic,
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub body_type: BodyType,
    pub mass: f32,
    pub gravity_scale: f32,
    /// Rotation is locked for characters so they don't tip over
    pub freeze_rotation: bool,
}

impl RigidBody {
    /// Top-down character body: no gravity, no spin
    pub fn character() -> Self {
        RigidBody {
            body_type: BodyType::Dynamic,
            mass: 1.0,
            gravity_scale: 0.0,
            freeze_rotation: true,
        }
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::character()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Box { width: f32, height: f32 },
    Circle { radius: f32 },
}

/// Sprite or flat-colored placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub sprite_path: Option<String>,
    pub color: [u8; 4],
    pub size: (f32, f32),
}

impl Visual {
    /// Solid square used when no sprite is available
    pub fn placeholder(color: [u8; 4], size: f32) -> Self {
        Visual {
            sprite_path: None,
            color,
            size: (size, size),
        }
    }
}

/// The set of engine parts attached to an entity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityParts {
    pub visual: Option<Visual>,
    pub rigid_body: Option<RigidBody>,
    pub collider: Option<Collider>,
}

impl EntityParts {
    pub fn has_physics(&self) -> bool {
        self.rigid_body.is_some()
    }
}
