//! Counter state, pulse window, and the counter reducer.

/// Intensity rendered while no pulse is active.
pub const BASELINE_INTENSITY: f32 = 1.0;
/// Intensity rendered during a pulse window.
pub const PULSE_INTENSITY: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Transient "just mutated" visual state.
pub struct AnimationPulse {
    /// Whether the pulse window is open.
    pub animating: bool,
    /// Render scale for the count.
    pub intensity: f32,
    /// Incremented on every mutation; only the reset carrying the latest value closes the window.
    pub generation: u64,
}

impl Default for AnimationPulse {
    fn default() -> Self {
        Self {
            animating: false,
            intensity: BASELINE_INTENSITY,
            generation: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Count plus its pulse window.
pub struct CounterState {
    /// Current count. Unsigned, so it can never go below zero.
    pub count: u32,
    /// Pulse window state.
    pub pulse: AnimationPulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Actions accepted by [`reduce_counter`].
pub enum CounterAction {
    /// Add one.
    Increment,
    /// Subtract one, clamped at zero.
    Decrement,
    /// Set to zero.
    Reset,
    /// The pulse reset timer for `generation` fired.
    PulseElapsed {
        /// Generation the timer was scheduled for.
        generation: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_counter`].
pub enum CounterEffect {
    /// Schedule [`CounterAction::PulseElapsed`] after the pulse duration.
    SchedulePulseReset {
        /// Generation to close.
        generation: u64,
    },
}

fn begin_pulse(state: &mut CounterState) -> Vec<CounterEffect> {
    state.pulse.animating = true;
    state.pulse.intensity = PULSE_INTENSITY;
    state.pulse.generation = state.pulse.generation.wrapping_add(1);
    vec![CounterEffect::SchedulePulseReset {
        generation: state.pulse.generation,
    }]
}

/// Applies `action` to `state` and returns the timers to schedule.
///
/// Every mutation opens (or restarts) the pulse window, including a decrement clamped at zero.
pub fn reduce_counter(state: &mut CounterState, action: CounterAction) -> Vec<CounterEffect> {
    match action {
        CounterAction::Increment => {
            state.count = state.count.saturating_add(1);
            begin_pulse(state)
        }
        CounterAction::Decrement => {
            state.count = state.count.saturating_sub(1);
            begin_pulse(state)
        }
        CounterAction::Reset => {
            state.count = 0;
            begin_pulse(state)
        }
        CounterAction::PulseElapsed { generation } => {
            if generation == state.pulse.generation {
                state.pulse.animating = false;
                state.pulse.intensity = BASELINE_INTENSITY;
            }
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn apply(state: &mut CounterState, actions: &[CounterAction]) {
        for action in actions {
            let _ = reduce_counter(state, *action);
        }
    }

    #[test]
    fn decrement_from_zero_never_goes_negative() {
        let mut state = CounterState::default();
        for _ in 0..10 {
            let _ = reduce_counter(&mut state, CounterAction::Decrement);
            assert_eq!(state.count, 0);
        }
    }

    #[test]
    fn increment_then_decrement_restores_prior_value() {
        for start in [0_u32, 1, 7, 250] {
            let mut state = CounterState {
                count: start,
                ..CounterState::default()
            };
            apply(
                &mut state,
                &[CounterAction::Increment, CounterAction::Decrement],
            );
            assert_eq!(state.count, start);
        }
    }

    #[test]
    fn reset_always_yields_zero() {
        for start in [0_u32, 3, u32::MAX] {
            let mut state = CounterState {
                count: start,
                ..CounterState::default()
            };
            let _ = reduce_counter(&mut state, CounterAction::Reset);
            assert_eq!(state.count, 0);
        }
    }

    #[test]
    fn increment_saturates_at_max() {
        let mut state = CounterState {
            count: u32::MAX,
            ..CounterState::default()
        };
        let _ = reduce_counter(&mut state, CounterAction::Increment);
        assert_eq!(state.count, u32::MAX);
    }

    #[test]
    fn mutation_opens_pulse_and_schedules_reset() {
        let mut state = CounterState::default();
        let effects = reduce_counter(&mut state, CounterAction::Increment);

        assert!(state.pulse.animating);
        assert_eq!(state.pulse.intensity, PULSE_INTENSITY);
        assert_eq!(
            effects,
            vec![CounterEffect::SchedulePulseReset { generation: 1 }]
        );

        let effects = reduce_counter(&mut state, CounterAction::PulseElapsed { generation: 1 });
        assert!(effects.is_empty());
        assert!(!state.pulse.animating);
        assert_eq!(state.pulse.intensity, BASELINE_INTENSITY);
    }

    #[test]
    fn stale_pulse_reset_is_ignored_after_a_newer_mutation() {
        let mut state = CounterState::default();
        apply(
            &mut state,
            &[
                CounterAction::Increment,
                CounterAction::Increment,
                CounterAction::PulseElapsed { generation: 1 },
            ],
        );
        assert!(state.pulse.animating);

        let _ = reduce_counter(&mut state, CounterAction::PulseElapsed { generation: 2 });
        assert!(!state.pulse.animating);
        assert_eq!(state.count, 2);
    }

    #[test]
    fn clamped_decrement_still_pulses() {
        let mut state = CounterState::default();
        let effects = reduce_counter(&mut state, CounterAction::Decrement);
        assert_eq!(state.count, 0);
        assert!(state.pulse.animating);
        assert_eq!(effects.len(), 1);
    }
}
