use rio_command::subsystem::Subsystem;

use crate::constants::leds;

/// An RGB color on the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color { r: 0, g: 0, b: 0 };
    pub const CORAL_WHITE: Color = Color {
        r: 255,
        g: 250,
        b: 240,
    };
    pub const ALGAE_TEAL: Color = Color {
        r: 0,
        g: 200,
        b: 160,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Addressable LED strip along the elevator. Commands paint the buffer; the
/// subsystem would stream it out to the strip each tick.
#[derive(Debug)]
pub struct StatusLeds {
    buffer: [Color; leds::STRIP_LENGTH],
}

impl StatusLeds {
    pub fn new() -> Self {
        Self {
            buffer: [Color::OFF; leds::STRIP_LENGTH],
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn set_solid(&mut self, color: Color) {
        self.buffer.fill(color);
    }

    pub fn set_pixel(&mut self, index: usize, color: Color) {
        if let Some(pixel) = self.buffer.get_mut(index) {
            *pixel = color;
        }
    }

    pub fn colors(&self) -> &[Color] {
        &self.buffer
    }

    pub fn disable(&mut self) {
        self.set_solid(Color::OFF);
    }
}

impl Default for StatusLeds {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsystem for StatusLeds {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_fill_paints_every_pixel() {
        let mut leds = StatusLeds::new();
        leds.set_solid(Color::ALGAE_TEAL);
        assert!(leds.colors().iter().all(|&c| c == Color::ALGAE_TEAL));
    }

    #[test]
    fn out_of_range_pixel_writes_are_ignored() {
        let mut leds = StatusLeds::new();
        leds.set_pixel(leds.len() + 10, Color::CORAL_WHITE);
        assert!(leds.colors().iter().all(|&c| c == Color::OFF));
    }
}
