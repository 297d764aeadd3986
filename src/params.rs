//! User-adjustable parameters.
//!
//! [`Params`] holds the six live values. Only particle count and noise affect
//! the motion kernel's static state; [`ParamStore`] tracks when those change so
//! the owner can call [`MotionKernel::rebuild`](crate::kernel::MotionKernel::rebuild).

use serde::{Deserialize, Serialize};

/// Identifies one adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    ParticleCount,
    Brightness,
    Opacity,
    ParticleSize,
    Speed,
    Noise,
}

impl ParamKind {
    /// All parameters in control-panel order.
    pub const ALL: [ParamKind; 6] = [
        ParamKind::ParticleCount,
        ParamKind::Brightness,
        ParamKind::Opacity,
        ParamKind::ParticleSize,
        ParamKind::Speed,
        ParamKind::Noise,
    ];

    /// Label, bounds and step for this parameter.
    pub fn range(self) -> ParamRange {
        match self {
            ParamKind::ParticleCount => {
                ParamRange::new("Particle Count:", 100.0, 1_000_000.0, 1000.0)
            }
            ParamKind::Brightness => ParamRange::new("Brightness:", 0.0, 1.0, 0.01),
            ParamKind::Opacity => ParamRange::new("Opacity:", 0.0, 1.0, 0.01),
            ParamKind::ParticleSize => ParamRange::new("Particle Size:", 0.001, 0.05, 0.001),
            ParamKind::Speed => ParamRange::new("Speed:", 0.0, 2.0, 0.01),
            ParamKind::Noise => ParamRange::new("Noise:", 0.0, 1.0, 0.01),
        }
    }

    /// Whether a change to this parameter requires a kernel rebuild.
    pub fn requires_rebuild(self) -> bool {
        matches!(self, ParamKind::ParticleCount | ParamKind::Noise)
    }
}

/// Display label, inclusive bounds and UI step of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    const fn new(label: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self { label, min, max, step }
    }

    /// Clamp a value into `[min, max]`.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Number of decimals shown for this parameter: 2 for fractional steps,
    /// 0 otherwise.
    #[inline]
    pub fn decimals(&self) -> usize {
        if self.step < 1.0 {
            2
        } else {
            0
        }
    }

    /// Format a value the way the control panel shows it.
    pub fn format(&self, value: f64) -> String {
        format!("{:.*}", self.decimals(), value)
    }

    /// Parse a submitted text edit.
    ///
    /// Numbers are clamped into range. Anything that does not parse as a
    /// finite number is rejected with `None`, and the caller keeps the old
    /// value.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let value: f64 = text.trim().parse().ok()?;
        value.is_finite().then(|| self.clamp(value))
    }
}

/// Live parameter values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub particle_count: u32,
    pub brightness: f32,
    pub opacity: f32,
    pub particle_size: f32,
    pub speed: f32,
    pub noise: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            particle_count: 100_000,
            brightness: 0.7,
            opacity: 0.7,
            particle_size: 0.001,
            speed: 0.15,
            noise: 0.2,
        }
    }
}

impl Params {
    /// Read a parameter as `f64`.
    pub fn get(&self, kind: ParamKind) -> f64 {
        match kind {
            ParamKind::ParticleCount => self.particle_count as f64,
            ParamKind::Brightness => self.brightness as f64,
            ParamKind::Opacity => self.opacity as f64,
            ParamKind::ParticleSize => self.particle_size as f64,
            ParamKind::Speed => self.speed as f64,
            ParamKind::Noise => self.noise as f64,
        }
    }

    /// Write a parameter, clamping into its range. Particle count is rounded
    /// to the nearest integer.
    pub fn set(&mut self, kind: ParamKind, value: f64) {
        let value = if value.is_nan() {
            kind.range().min
        } else {
            kind.range().clamp(value)
        };
        match kind {
            ParamKind::ParticleCount => self.particle_count = value.round() as u32,
            ParamKind::Brightness => self.brightness = value as f32,
            ParamKind::Opacity => self.opacity = value as f32,
            ParamKind::ParticleSize => self.particle_size = value as f32,
            ParamKind::Speed => self.speed = value as f32,
            ParamKind::Noise => self.noise = value as f32,
        }
    }

    /// Copy with every field clamped into range.
    ///
    /// A zero particle count becomes the minimum count and negative noise
    /// becomes zero.
    pub fn sanitized(&self) -> Self {
        let mut out = *self;
        for kind in ParamKind::ALL {
            out.set(kind, self.get(kind));
        }
        out
    }

    /// Parameters that differ between `self` and `other`.
    pub fn diff(&self, other: &Params) -> Vec<ParamKind> {
        ParamKind::ALL
            .into_iter()
            .filter(|&kind| self.get(kind) != other.get(kind))
            .collect()
    }

    /// Whether moving from `previous` to `self` needs a kernel rebuild.
    pub fn requires_rebuild(&self, previous: &Params) -> bool {
        self.particle_count != previous.particle_count || self.noise != previous.noise
    }
}

/// Current parameters plus the values the kernel was last built with.
#[derive(Debug, Clone)]
pub struct ParamStore {
    current: Params,
    built: Option<(u32, f32)>,
}

impl ParamStore {
    /// Create a store. The first [`take_rebuild`](Self::take_rebuild) always
    /// reports a rebuild.
    pub fn new(params: Params) -> Self {
        Self {
            current: params.sanitized(),
            built: None,
        }
    }

    /// Current values.
    #[inline]
    pub fn params(&self) -> &Params {
        &self.current
    }

    /// Replace all values. Returns the parameters that changed.
    pub fn apply(&mut self, params: Params) -> Vec<ParamKind> {
        let params = params.sanitized();
        let changed = params.diff(&self.current);
        self.current = params;
        changed
    }

    /// Set a single value.
    pub fn set(&mut self, kind: ParamKind, value: f64) {
        self.current.set(kind, value);
    }

    /// Whether the kernel is out of date.
    pub fn needs_rebuild(&self) -> bool {
        self.built != Some((self.current.particle_count, self.current.noise))
    }

    /// If a rebuild is pending, mark it done and return `(count, noise)`.
    pub fn take_rebuild(&mut self) -> Option<(u32, f32)> {
        if !self.needs_rebuild() {
            return None;
        }
        let target = (self.current.particle_count, self.current.noise);
        self.built = Some(target);
        Some(target)
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_ranges() {
        let params = Params::default();
        for kind in ParamKind::ALL {
            let range = kind.range();
            let value = params.get(kind);
            assert!(value >= range.min && value <= range.max, "{:?} out of range", kind);
        }
        assert_eq!(params.sanitized(), params);
    }

    #[test]
    fn test_set_clamps() {
        let mut params = Params::default();
        params.set(ParamKind::Speed, 5.0);
        assert_eq!(params.speed, 2.0);

        params.set(ParamKind::ParticleSize, 0.0);
        assert_eq!(params.particle_size, 0.001);

        params.set(ParamKind::ParticleCount, 2_500_000.0);
        assert_eq!(params.particle_count, 1_000_000);
    }

    #[test]
    fn test_sanitize_bad_count_and_noise() {
        let params = Params {
            particle_count: 0,
            noise: -0.5,
            ..Params::default()
        };
        let clean = params.sanitized();
        assert_eq!(clean.particle_count, 100);
        assert_eq!(clean.noise, 0.0);
    }

    #[test]
    fn test_count_rounds() {
        let mut params = Params::default();
        params.set(ParamKind::ParticleCount, 1234.6);
        assert_eq!(params.particle_count, 1235);
    }

    #[test]
    fn test_format() {
        assert_eq!(ParamKind::ParticleCount.range().format(100_000.0), "100000");
        assert_eq!(ParamKind::Brightness.range().format(0.7), "0.70");
        assert_eq!(ParamKind::ParticleSize.range().format(0.001), "0.00");
    }

    #[test]
    fn test_parse() {
        let range = ParamKind::Speed.range();
        assert_eq!(range.parse(" 1.25 "), Some(1.25));
        assert_eq!(range.parse("9"), Some(2.0));
        assert_eq!(range.parse("-3"), Some(0.0));
        assert_eq!(range.parse("fast"), None);
        assert_eq!(range.parse(""), None);
        assert_eq!(range.parse("NaN"), None);
    }

    #[test]
    fn test_requires_rebuild() {
        let base = Params::default();

        let mut faster = base;
        faster.speed = 1.0;
        faster.opacity = 0.1;
        faster.brightness = 0.2;
        faster.particle_size = 0.02;
        assert!(!faster.requires_rebuild(&base));

        let mut noisier = base;
        noisier.noise = 0.5;
        assert!(noisier.requires_rebuild(&base));

        let mut more = base;
        more.particle_count = 2000;
        assert!(more.requires_rebuild(&base));
    }

    #[test]
    fn test_rebuild_kinds() {
        let rebuild: Vec<_> = ParamKind::ALL
            .into_iter()
            .filter(|k| k.requires_rebuild())
            .collect();
        assert_eq!(rebuild, vec![ParamKind::ParticleCount, ParamKind::Noise]);
    }

    #[test]
    fn test_store_take_rebuild() {
        let mut store = ParamStore::default();
        assert_eq!(store.take_rebuild(), Some((100_000, 0.2)));
        assert_eq!(store.take_rebuild(), None);

        store.set(ParamKind::Speed, 1.0);
        assert!(!store.needs_rebuild());

        store.set(ParamKind::Noise, 0.4);
        assert_eq!(store.take_rebuild(), Some((100_000, 0.4)));
        assert_eq!(store.take_rebuild(), None);
    }

    #[test]
    fn test_store_apply_reports_changes() {
        let mut store = ParamStore::default();
        let mut next = *store.params();
        next.opacity = 0.3;
        next.particle_count = 5000;

        let changed = store.apply(next);
        assert_eq!(changed, vec![ParamKind::ParticleCount, ParamKind::Opacity]);
        assert_eq!(store.params().opacity, 0.3);
    }
}
