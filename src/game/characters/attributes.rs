// Character attributes - stamina gates sprinting and jumping

use serde::{Deserialize, Serialize};

/// Stamina tuning, shared by every character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaSettings {
    pub max_stamina: f32,
    /// Regeneration per second while not sprinting
    pub restore_velocity: f32,
    /// Drain per second while sprinting
    pub sprint_consumption_velocity: f32,
}

pub const BASE_STAMINA: StaminaSettings = StaminaSettings {
    max_stamina: 100.0,
    restore_velocity: 20.0,
    sprint_consumption_velocity: 10.0,
};

impl Default for StaminaSettings {
    fn default() -> Self {
        BASE_STAMINA
    }
}

/// Runtime attribute values for one character
#[derive(Debug, Clone)]
pub struct CharacterAttributes {
    settings: StaminaSettings,
    stamina: f32,
    out_of_stamina: bool,
}

impl Default for CharacterAttributes {
    fn default() -> Self {
        Self::new(StaminaSettings::default())
    }
}

impl CharacterAttributes {
    pub fn new(settings: StaminaSettings) -> Self {
        Self {
            stamina: settings.max_stamina,
            settings,
            out_of_stamina: false,
        }
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn is_out_of_stamina(&self) -> bool {
        self.out_of_stamina
    }

    /// Drain or restore stamina for one frame.
    ///
    /// Returns the new out-of-stamina state when it changes: `true` once
    /// stamina hits zero, `false` only after it has fully recovered.
    pub fn update(&mut self, dt: f32, sprinting: bool) -> Option<bool> {
        let rate = if sprinting {
            -self.settings.sprint_consumption_velocity
        } else {
            self.settings.restore_velocity
        };
        self.stamina = (self.stamina + rate * dt).clamp(0.0, self.settings.max_stamina);

        if !self.out_of_stamina && self.stamina <= 0.0 {
            self.out_of_stamina = true;
            return Some(true);
        }
        if self.out_of_stamina && self.stamina >= self.settings.max_stamina {
            self.out_of_stamina = false;
            return Some(false);
        }
        None
    }
}
