//! Decorative emoji particles: catalog, random draws, and the bounded self-expiring field.

/// Horizontal placement range, in percent of the layer width.
pub const LEFT_PERCENT_RANGE: (f64, f64) = (0.0, 100.0);
/// Size scale factor range.
pub const SCALE_RANGE: (f64, f64) = (0.8, 1.6);
/// Animation duration multiplier range.
pub const DURATION_MULTIPLIER_RANGE: (f64, f64) = (0.7, 1.3);
/// Opacity range.
pub const OPACITY_RANGE: (f64, f64) = (0.5, 0.9);
/// Base animation length that the duration multiplier scales.
pub const BASE_ANIMATION_SECONDS: f64 = 6.0;
/// Base glyph size that the scale factor multiplies.
pub const BASE_FONT_SIZE_REM: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Curated set of glyphs drawn from as a unit.
pub struct EmojiGroup {
    /// Stable group name.
    pub name: &'static str,
    /// Glyphs in the group.
    pub glyphs: &'static [&'static str],
}

/// Curated emoji groups. A spawn picks a group uniformly, then a glyph uniformly within it.
pub const EMOJI_GROUPS: &[EmojiGroup] = &[
    EmojiGroup {
        name: "celebration",
        glyphs: &["🎉", "🎊", "✨", "🥳", "🎈"],
    },
    EmojiGroup {
        name: "nature",
        glyphs: &["🌸", "🌼", "🍀", "🌈", "🌻"],
    },
    EmojiGroup {
        name: "space",
        glyphs: &["🚀", "🌟", "⭐", "🪐", "🌙"],
    },
    EmojiGroup {
        name: "food",
        glyphs: &["🍕", "🍩", "🍦", "🍓", "🧁"],
    },
    EmojiGroup {
        name: "hearts",
        glyphs: &["❤️", "💖", "💜", "💙", "💛"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Animation style tag rendered as an `emoji-<tag>` class.
pub enum ParticleAnimation {
    /// Rise straight up.
    Float,
    /// Rise with sideways sway.
    Drift,
    /// Rise while rotating.
    Spin,
    /// Rise in hops.
    Bounce,
}

impl ParticleAnimation {
    /// Every tag, in draw order.
    pub const ALL: [Self; 4] = [Self::Float, Self::Drift, Self::Spin, Self::Bounce];

    /// CSS class selecting the keyframes for this tag.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Float => "emoji-float",
            Self::Drift => "emoji-drift",
            Self::Spin => "emoji-spin",
            Self::Bounce => "emoji-bounce",
        }
    }
}

/// Source of uniform random draws, injectable so tests control particle parameters.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Uniform index in `0..len`. Returns `0` for an empty range.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Uniform value in `[min, max)`.
    fn range(&mut self, (min, max): (f64, f64)) -> f64 {
        min + (max - min) * self.next_f64()
    }
}

impl RandomSource for fastrand::Rng {
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }

    fn next_u32(&mut self) -> u32 {
        self.u32(..)
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.usize(..len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Particle identifier: creation timestamp, a random nonce, and a per-field sequence number.
pub struct ParticleId {
    /// Creation instant in clock milliseconds. Also the basis for age checks.
    pub created_at_ms: u64,
    /// Random component.
    pub nonce: u32,
    /// Position in the field's creation order.
    pub sequence: u64,
}

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{:08x}-{}",
            self.created_at_ms, self.nonce, self.sequence
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One decorative emoji instance.
pub struct Particle {
    /// Unique identifier.
    pub id: ParticleId,
    /// Emoji glyph.
    pub glyph: &'static str,
    /// Animation style tag.
    pub animation: ParticleAnimation,
    /// Horizontal placement, 0..100 percent.
    pub left_percent: f64,
    /// Size scale factor.
    pub scale: f64,
    /// Animation duration multiplier.
    pub duration_multiplier: f64,
    /// Opacity.
    pub opacity: f64,
}

impl Particle {
    /// Milliseconds elapsed between creation and `now_ms`.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.id.created_at_ms)
    }

    /// Inline style positioning and animating this particle.
    pub fn inline_style(&self) -> String {
        format!(
            "left: {:.2}%; font-size: {:.2}rem; animation-duration: {:.2}s; opacity: {:.2};",
            self.left_percent,
            BASE_FONT_SIZE_REM * self.scale,
            BASE_ANIMATION_SECONDS * self.duration_multiplier,
            self.opacity
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Insertion-ordered particle collection plus the spawning switch.
pub struct ParticleField {
    particles: Vec<Particle>,
    enabled: bool,
    next_sequence: u64,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            enabled: true,
            next_sequence: 0,
        }
    }
}

impl ParticleField {
    /// Particles, oldest first.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether no particles are live.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Whether new particles may be spawned.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Builds a particle without inserting it. Returns `None` while spawning is disabled.
    pub fn create_particle(
        &mut self,
        rng: &mut dyn RandomSource,
        now_ms: u64,
    ) -> Option<Particle> {
        if !self.enabled {
            return None;
        }
        let group = &EMOJI_GROUPS[rng.index(EMOJI_GROUPS.len())];
        let glyph = group.glyphs[rng.index(group.glyphs.len())];
        let animation = ParticleAnimation::ALL[rng.index(ParticleAnimation::ALL.len())];
        let left_percent = rng.range(LEFT_PERCENT_RANGE);
        let scale = rng.range(SCALE_RANGE);
        let duration_multiplier = rng.range(DURATION_MULTIPLIER_RANGE);
        let opacity = rng.range(OPACITY_RANGE);
        let id = ParticleId {
            created_at_ms: now_ms,
            nonce: rng.next_u32(),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        Some(Particle {
            id,
            glyph,
            animation,
            left_percent,
            scale,
            duration_multiplier,
            opacity,
        })
    }

    /// Creates and appends one particle, then trims the oldest entries down to `capacity`.
    pub fn spawn_one(
        &mut self,
        rng: &mut dyn RandomSource,
        now_ms: u64,
        capacity: usize,
    ) -> Option<ParticleId> {
        let particle = self.create_particle(rng, now_ms)?;
        let id = particle.id;
        self.particles.push(particle);
        self.enforce_capacity(capacity);
        Some(id)
    }

    /// Drops the oldest particles until at most `capacity` remain.
    pub fn enforce_capacity(&mut self, capacity: usize) {
        if self.particles.len() > capacity {
            let overflow = self.particles.len() - capacity;
            self.particles.drain(..overflow);
        }
    }

    /// Removes the particle with `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: ParticleId) -> bool {
        let before = self.particles.len();
        self.particles.retain(|particle| particle.id != id);
        self.particles.len() != before
    }

    /// Flips the spawning switch and returns the new value. Existing particles are kept.
    pub fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Removes every particle older than `max_age_ms` at `now_ms`. Returns the number removed.
    pub fn sweep_expired(&mut self, now_ms: u64, max_age_ms: u64) -> usize {
        let before = self.particles.len();
        self.particles
            .retain(|particle| particle.age_ms(now_ms) <= max_age_ms);
        before - self.particles.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Tracks the last observed count so bursts fire once per actual value change.
pub struct CountObserver {
    last_seen: Option<u32>,
}

impl CountObserver {
    /// Records `count` and returns whether it differs from the previous observation.
    ///
    /// The first observation only establishes the baseline.
    pub fn observe(&mut self, count: u32) -> bool {
        let changed = self.last_seen.is_some_and(|previous| previous != count);
        self.last_seen = Some(count);
        changed
    }
}
