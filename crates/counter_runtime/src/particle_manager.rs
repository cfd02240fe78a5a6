//! Emoji particle manager: spawning, bursts, ambient spawns, and the age sweep.
//!
//! The manager owns the [`ParticleField`] behind a `RefCell` and every timer callback reaches it
//! through a weak handle, so each tick mutates the latest state rather than a captured copy.
//! Timers are registered on [`EmojiParticleManager::mount`] and all of them are cancelled on
//! [`EmojiParticleManager::unmount`].

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use leptos::logging;
use platform_host::{Clock, DocumentSurface, HostServices, TaskHandle, TaskScheduler};

use crate::{
    config::{resolve_capacity, WidgetConfig, MAX_PARTICLES_PROPERTY},
    host::StateListener,
    particles::{CountObserver, Particle, ParticleField, ParticleId, RandomSource},
};

struct ManagerInner {
    field: RefCell<ParticleField>,
    rng: RefCell<Box<dyn RandomSource>>,
    scheduler: Rc<dyn TaskScheduler>,
    clock: Rc<dyn Clock>,
    surface: Rc<dyn DocumentSurface>,
    config: WidgetConfig,
    listener: StateListener<ParticleField>,
    counts: RefCell<CountObserver>,
    mounted: Cell<bool>,
    ambient: RefCell<Option<TaskHandle>>,
    sweep: RefCell<Option<TaskHandle>>,
    bursts: RefCell<BTreeMap<u64, TaskHandle>>,
    next_burst_task: Cell<u64>,
}

#[derive(Clone)]
/// Shared handle to the particle field and its timers.
pub struct EmojiParticleManager {
    inner: Rc<ManagerInner>,
}

impl EmojiParticleManager {
    /// Creates an enabled, empty manager. No timers run until [`Self::mount`].
    pub fn new(
        services: &HostServices,
        config: WidgetConfig,
        rng: Box<dyn RandomSource>,
        listener: StateListener<ParticleField>,
    ) -> Self {
        Self {
            inner: Rc::new(ManagerInner {
                field: RefCell::new(ParticleField::default()),
                rng: RefCell::new(rng),
                scheduler: services.scheduler.clone(),
                clock: services.clock.clone(),
                surface: services.surface.clone(),
                config,
                listener,
                counts: RefCell::new(CountObserver::default()),
                mounted: Cell::new(false),
                ambient: RefCell::new(None),
                sweep: RefCell::new(None),
                bursts: RefCell::new(BTreeMap::new()),
                next_burst_task: Cell::new(0),
            }),
        }
    }

    fn from_weak(weak: &Weak<ManagerInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Current field snapshot.
    pub fn field(&self) -> ParticleField {
        self.inner.field.borrow().clone()
    }

    /// Whether spawning is enabled.
    pub fn enabled(&self) -> bool {
        self.inner.field.borrow().enabled()
    }

    /// Capacity read from the styling layer at call time, or the configured default.
    pub fn capacity(&self) -> usize {
        resolve_capacity(
            self.inner
                .surface
                .css_custom_property(MAX_PARTICLES_PROPERTY)
                .as_deref(),
            self.inner.config.default_max_particles,
        )
    }

    /// Builds a particle without inserting it. Returns `None` while disabled.
    pub fn create_particle(&self) -> Option<Particle> {
        let now_ms = self.inner.clock.now_ms();
        let mut rng = self.inner.rng.borrow_mut();
        self.inner
            .field
            .borrow_mut()
            .create_particle(rng.as_mut(), now_ms)
    }

    /// Spawns one particle and trims the field to capacity.
    pub fn spawn_one(&self) -> Option<ParticleId> {
        let capacity = self.capacity();
        let now_ms = self.inner.clock.now_ms();
        let (id, snapshot) = {
            let mut rng = self.inner.rng.borrow_mut();
            let mut field = self.inner.field.borrow_mut();
            let id = field.spawn_one(rng.as_mut(), now_ms, capacity)?;
            (id, field.clone())
        };
        self.notify(&snapshot);
        Some(id)
    }

    /// Schedules `count` spawns, 0, 1, 2, ... stagger intervals from now.
    ///
    /// Each spawn checks the enabled flag when it fires.
    pub fn spawn_burst(&self, count: usize) {
        for index in 0..count {
            let task_id = self.inner.next_burst_task.get();
            self.inner.next_burst_task.set(task_id.wrapping_add(1));
            let weak = Rc::downgrade(&self.inner);
            let delay_ms = self.inner.config.burst_stagger_ms.saturating_mul(index as u64);
            let scheduled = self.inner.scheduler.schedule_once(
                delay_ms,
                Box::new(move || {
                    if let Some(manager) = Self::from_weak(&weak) {
                        manager.inner.bursts.borrow_mut().remove(&task_id);
                        manager.spawn_one();
                    }
                }),
            );
            match scheduled {
                Ok(handle) => {
                    self.inner.bursts.borrow_mut().insert(task_id, handle);
                }
                Err(err) => logging::warn!("burst particle timer unavailable: {err}"),
            }
        }
    }

    /// Removes the particle with `id`, if present.
    pub fn remove_particle(&self, id: ParticleId) -> bool {
        let snapshot = {
            let mut field = self.inner.field.borrow_mut();
            if !field.remove(id) {
                return false;
            }
            field.clone()
        };
        self.notify(&snapshot);
        true
    }

    /// Flips spawning on or off and starts or stops the ambient timer to match.
    pub fn toggle_enabled(&self) -> bool {
        let (enabled, snapshot) = {
            let mut field = self.inner.field.borrow_mut();
            let enabled = field.toggle_enabled();
            (enabled, field.clone())
        };
        if self.inner.mounted.get() {
            if enabled {
                self.start_ambient();
            } else {
                self.stop_ambient();
            }
        }
        self.notify(&snapshot);
        enabled
    }

    /// Feeds the latest counter value; a burst fires when it differs from the previous one.
    pub fn observe_count(&self, count: u32) {
        let changed = self.inner.counts.borrow_mut().observe(count);
        if changed && self.enabled() {
            self.spawn_burst(self.inner.config.burst_size);
        }
    }

    /// Removes particles past the maximum age. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let now_ms = self.inner.clock.now_ms();
        let (removed, snapshot) = {
            let mut field = self.inner.field.borrow_mut();
            if field.is_empty() {
                return 0;
            }
            let removed = field.sweep_expired(now_ms, self.inner.config.max_particle_age_ms);
            (removed, field.clone())
        };
        if removed > 0 {
            self.notify(&snapshot);
        }
        removed
    }

    /// Starts the sweep timer and, while enabled, the ambient spawn timer.
    pub fn mount(&self) {
        if self.inner.mounted.replace(true) {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        match self.inner.scheduler.schedule_repeating(
            self.inner.config.sweep_interval_ms,
            Box::new(move || {
                if let Some(manager) = Self::from_weak(&weak) {
                    manager.sweep_expired();
                }
            }),
        ) {
            Ok(handle) => *self.inner.sweep.borrow_mut() = Some(handle),
            Err(err) => logging::warn!("particle sweep timer unavailable: {err}"),
        }
        if self.enabled() {
            self.start_ambient();
        }
    }

    /// Cancels every timer the manager registered. Existing particles are kept.
    pub fn unmount(&self) {
        self.inner.mounted.set(false);
        self.stop_ambient();
        if let Some(handle) = self.inner.sweep.borrow_mut().take() {
            handle.cancel();
        }
        let bursts = std::mem::take(&mut *self.inner.bursts.borrow_mut());
        for (_, handle) in bursts {
            handle.cancel();
        }
    }

    fn start_ambient(&self) {
        self.stop_ambient();
        let weak = Rc::downgrade(&self.inner);
        match self.inner.scheduler.schedule_repeating(
            self.inner.config.ambient_spawn_interval_ms,
            Box::new(move || {
                if let Some(manager) = Self::from_weak(&weak) {
                    manager.ambient_tick();
                }
            }),
        ) {
            Ok(handle) => *self.inner.ambient.borrow_mut() = Some(handle),
            Err(err) => logging::warn!("ambient particle timer unavailable: {err}"),
        }
    }

    fn stop_ambient(&self) {
        if let Some(handle) = self.inner.ambient.borrow_mut().take() {
            handle.cancel();
        }
    }

    fn ambient_tick(&self) {
        if !self.enabled() {
            return;
        }
        let roll = self.inner.rng.borrow_mut().next_f64();
        if roll < self.inner.config.ambient_spawn_probability {
            self.spawn_one();
        }
    }

    fn notify(&self, snapshot: &ParticleField) {
        (self.inner.listener)(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use platform_host::{MemoryHost, ThemePreference};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::particles::tests::ScriptedRandom;

    fn manager_with(
        host: &MemoryHost,
        rng: Box<dyn RandomSource>,
    ) -> (EmojiParticleManager, Rc<Cell<usize>>) {
        let notifications = Rc::new(Cell::new(0));
        let counter = notifications.clone();
        let manager = EmojiParticleManager::new(
            &host.services(),
            WidgetConfig::default(),
            rng,
            Rc::new(move |_: &ParticleField| counter.set(counter.get() + 1)),
        );
        (manager, notifications)
    }

    fn seeded(host: &MemoryHost) -> EmojiParticleManager {
        manager_with(host, Box::new(fastrand::Rng::with_seed(21))).0
    }

    #[test]
    fn thirty_spawns_with_capacity_25_keep_the_newest_25() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let manager = seeded(&host);

        let ids: Vec<ParticleId> = (0..30)
            .map(|_| {
                host.scheduler.advance(1);
                manager.spawn_one().expect("spawn")
            })
            .collect();

        let field = manager.field();
        assert_eq!(field.len(), 25);
        let kept: Vec<ParticleId> = field.particles().iter().map(|p| p.id).collect();
        assert_eq!(kept, ids[5..].to_vec());
    }

    #[test]
    fn styling_layer_capacity_is_read_at_spawn_time() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let manager = seeded(&host);
        host.surface.set_custom_property(MAX_PARTICLES_PROPERTY, "4");
        for _ in 0..10 {
            manager.spawn_one();
        }
        assert_eq!(manager.field().len(), 4);

        host.surface.set_custom_property(MAX_PARTICLES_PROPERTY, "not-a-number");
        assert_eq!(manager.capacity(), 25);
        for _ in 0..10 {
            manager.spawn_one();
        }
        assert_eq!(manager.field().len(), 14);
    }

    #[test]
    fn burst_is_staggered_and_respects_enabled_flag_per_spawn() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let manager = seeded(&host);

        manager.spawn_burst(3);
        host.scheduler.advance(0);
        assert_eq!(manager.field().len(), 1);
        host.scheduler.advance(100);
        assert_eq!(manager.field().len(), 2);

        manager.toggle_enabled();
        host.scheduler.advance(100);
        assert_eq!(manager.field().len(), 2);
        assert_eq!(host.scheduler.pending_tasks(), 0);
    }

    #[test]
    fn ambient_timer_spawns_on_successful_rolls_only() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        // Each tick rolls once; a spawn then consumes seven more draws.
        let draws = vec![0.1, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.9];
        let (manager, _) = manager_with(&host, Box::new(ScriptedRandom::new(draws, 1)));
        manager.mount();

        host.scheduler.advance(1_999);
        assert!(manager.field().is_empty());
        host.scheduler.advance(1);
        assert_eq!(manager.field().len(), 1);
        host.scheduler.advance(2_000);
        assert_eq!(manager.field().len(), 1);
    }

    #[test]
    fn disabling_stops_ambient_timer_and_enabling_restarts_it() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let (manager, _) = manager_with(&host, Box::new(ScriptedRandom::new(vec![0.0], 1)));
        manager.mount();
        assert_eq!(host.scheduler.pending_tasks(), 2);

        assert!(!manager.toggle_enabled());
        assert_eq!(host.scheduler.pending_tasks(), 1);
        host.scheduler.advance(10_000);
        assert!(manager.field().is_empty());

        assert!(manager.toggle_enabled());
        assert_eq!(host.scheduler.pending_tasks(), 2);
        host.scheduler.advance(2_000);
        assert_eq!(manager.field().len(), 1);
    }

    #[test]
    fn sweep_empties_field_once_every_particle_is_older_than_max_age() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let manager = seeded(&host);
        for _ in 0..5 {
            manager.spawn_one();
        }
        manager.toggle_enabled();
        manager.mount();

        host.scheduler.advance(30_001);
        assert_eq!(manager.field().len(), 5);
        host.scheduler.advance(4_999);
        assert!(manager.field().is_empty());
    }

    #[test]
    fn particles_already_past_max_age_are_gone_within_30001ms() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let manager = seeded(&host);
        for _ in 0..3 {
            manager.spawn_one();
        }
        host.scheduler.advance(30_001);
        manager.toggle_enabled();
        manager.mount();

        host.scheduler.advance(30_001);
        assert!(manager.field().is_empty());
    }

    #[test]
    fn sweep_keeps_young_particles() {
        let host = MemoryHost::new(ThemePreference::Dark, 100_000);
        let manager = seeded(&host);
        manager.spawn_one();
        host.scheduler.advance(20_000);
        manager.spawn_one();
        host.scheduler.advance(10_001);

        assert_eq!(manager.sweep_expired(), 1);
        assert_eq!(manager.field().len(), 1);
    }

    #[test]
    fn count_changes_trigger_one_burst_per_actual_change() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let manager = seeded(&host);

        manager.observe_count(0);
        manager.observe_count(0);
        host.scheduler.advance(1_000);
        assert!(manager.field().is_empty());

        manager.observe_count(1);
        host.scheduler.advance(1_000);
        assert_eq!(manager.field().len(), 3);

        manager.toggle_enabled();
        manager.observe_count(2);
        host.scheduler.advance(1_000);
        assert_eq!(manager.field().len(), 3);
    }

    #[test]
    fn huge_burst_stagger_saturates_instead_of_overflowing() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let config = WidgetConfig::from_json_or_default(Some(
            r#"{"burstStaggerMs": 18446744073709551615}"#,
        ));
        assert_eq!(config.burst_stagger_ms, u64::MAX);
        let manager = EmojiParticleManager::new(
            &host.services(),
            config,
            Box::new(fastrand::Rng::with_seed(5)),
            Rc::new(|_: &ParticleField| {}),
        );

        manager.observe_count(0);
        manager.observe_count(1);
        host.scheduler.advance(0);
        assert_eq!(manager.field().len(), 1);
        assert_eq!(host.scheduler.pending_tasks(), 2);
    }

    #[test]
    fn burst_without_timers_spawns_nothing() {
        let manager = EmojiParticleManager::new(
            &HostServices::unavailable(),
            WidgetConfig::default(),
            Box::new(fastrand::Rng::with_seed(5)),
            Rc::new(|_: &ParticleField| {}),
        );
        manager.spawn_burst(3);
        assert!(manager.field().is_empty());
    }

    #[test]
    fn remove_particle_notifies_only_when_something_was_removed() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let (manager, notifications) =
            manager_with(&host, Box::new(fastrand::Rng::with_seed(2)));
        let id = manager.spawn_one().expect("spawn");
        assert_eq!(notifications.get(), 1);

        assert!(manager.remove_particle(id));
        assert!(!manager.remove_particle(id));
        assert_eq!(notifications.get(), 2);
        assert!(manager.field().is_empty());
    }

    #[test]
    fn unmount_cancels_every_timer_and_keeps_particles() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let manager = seeded(&host);
        manager.spawn_one();
        manager.mount();
        manager.spawn_burst(3);
        assert_eq!(host.scheduler.pending_tasks(), 5);

        manager.unmount();
        assert_eq!(host.scheduler.pending_tasks(), 0);
        assert_eq!(manager.field().len(), 1);
    }

    #[test]
    fn create_particle_returns_none_while_disabled() {
        let host = MemoryHost::new(ThemePreference::Dark, 0);
        let manager = seeded(&host);
        assert!(manager.create_particle().is_some());
        assert!(manager.field().is_empty());

        manager.toggle_enabled();
        assert_eq!(manager.create_particle(), None);
    }
}
