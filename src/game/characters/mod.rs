// Character system
//
// This module contains the host side of a playable character:
// - Character data and per-frame orchestration of locomotion
// - Attributes (stamina) that gate sprinting and jumping

pub mod attributes;
pub mod character;

// Re-export commonly used types
pub use attributes::{CharacterAttributes, StaminaSettings, BASE_STAMINA};
pub use character::{Character, CharacterId};
