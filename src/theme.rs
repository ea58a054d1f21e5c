//! Colors for the TUI and the animated accent
//!
//! The accent drifts in HSL space toward a hue derived from the current
//! track's genre, a few percent per frame.

use ratatui::style::Color;

/// Hue of the accent before any genre is known (Spotify green)
pub const DEFAULT_HUE: f32 = 141.0;

/// Fraction of the remaining distance covered per frame
pub const ACCENT_STEP: f32 = 0.08;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    /// Degrees, `[0, 360)`
    pub h: f32,
    /// `[0, 1]`
    pub s: f32,
    /// `[0, 1]`
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 1.0),
            l: l.clamp(0.0, 1.0),
        }
    }

    /// Interpolate toward `other`, taking the shorter way around the hue circle.
    pub fn lerp(self, other: Hsl, t: f32) -> Hsl {
        let t = t.clamp(0.0, 1.0);
        let mut delta = other.h - self.h;
        if delta > 180.0 {
            delta -= 360.0;
        } else if delta < -180.0 {
            delta += 360.0;
        }
        Hsl::new(
            self.h + delta * t,
            self.s + (other.s - self.s) * t,
            self.l + (other.l - self.l) * t,
        )
    }

    pub fn to_rgb(self) -> (u8, u8, u8) {
        let c = (1.0 - (2.0 * self.l - 1.0).abs()) * self.s;
        let h = self.h / 60.0;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = self.l - c / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }

    pub fn to_color(self) -> Color {
        let (r, g, b) = self.to_rgb();
        Color::Rgb(r, g, b)
    }
}

/// Stable hue for a genre name (FNV-1a over the lowercase bytes).
pub fn genre_hue(genre: &str) -> f32 {
    let hash = genre
        .trim()
        .to_lowercase()
        .bytes()
        .fold(0x811c_9dc5_u32, |acc, b| (acc ^ u32::from(b)).wrapping_mul(0x0100_0193));
    (hash % 360) as f32
}

/// The accent color and the hue it is heading for
#[derive(Clone, Copy, Debug)]
pub struct Accent {
    current: Hsl,
    target: Hsl,
}

impl Default for Accent {
    fn default() -> Self {
        let base = Hsl::new(DEFAULT_HUE, 0.65, 0.5);
        Self { current: base, target: base }
    }
}

impl Accent {
    pub fn retarget(&mut self, hue: f32) {
        self.target = Hsl::new(hue, self.target.s, self.target.l);
    }

    /// Advance one frame.
    pub fn tick(&mut self) {
        self.current = self.current.lerp(self.target, ACCENT_STEP);
    }

    pub fn current(&self) -> Hsl {
        self.current
    }

    pub fn target(&self) -> Hsl {
        self.target
    }

    pub fn color(&self) -> Color {
        self.current.to_color()
    }
}
