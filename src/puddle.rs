// Copyright (c) 2026 rezky_nightky

/// Ground water level. The effective ground line rises as it fills.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Puddle {
    height: f32,
    max: f32,
}

impl Puddle {
    pub fn new(max: f32) -> Self {
        Self {
            height: 0.0,
            max: max.max(0.0),
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn deposit(&mut self, amount: f32) {
        self.height = (self.height + amount.max(0.0)).clamp(0.0, self.max);
    }

    pub fn decay(&mut self, amount: f32) {
        self.height = (self.height - amount.max(0.0)).clamp(0.0, self.max);
    }

    pub fn ground_line(&self, viewport_height: f32) -> f32 {
        viewport_height - self.height
    }

    pub fn drain(&mut self) {
        self.height = 0.0;
    }
}
