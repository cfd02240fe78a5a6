//! Counter widget UI composition.

use leptos::*;

use crate::particles::Particle;

pub use crate::runtime_context::{use_widget_runtime, WidgetProvider, WidgetRuntimeContext};

fn counter_value_class(animating: bool) -> &'static str {
    if animating {
        "counter-value animate"
    } else {
        "counter-value"
    }
}

fn particle_class(particle: &Particle) -> String {
    format!("emoji-particle {}", particle.animation.css_class())
}

#[component]
fn EmojiLayer() -> impl IntoView {
    let runtime = use_widget_runtime();
    let particles = runtime.particles;

    view! {
        <div class="emoji-layer" aria-hidden="true">
            <For
                each=move || particles.with(|field| field.particles().to_vec())
                key=|particle| particle.id
                let:particle
            >
                <span
                    class=particle_class(&particle)
                    style=particle.inline_style()
                    data-particle-id=particle.id.to_string()
                    on:click=move |_| runtime.remove_particle(particle.id)
                >
                    {particle.glyph}
                </span>
            </For>
        </div>
    }
}

#[component]
/// Counter card with controls, toggles, and the decorative emoji layer.
pub fn CounterWidget() -> impl IntoView {
    let runtime = use_widget_runtime();
    let counter = runtime.counter;
    let particles = runtime.particles;
    let theme = runtime.theme;

    let keydown_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() {
            return;
        }
        if runtime.handle_key(&ev.key()) {
            ev.prevent_default();
        }
    });
    on_cleanup(move || keydown_listener.remove());

    let emojis_enabled = Signal::derive(move || particles.with(|field| field.enabled()));
    let is_dark = Signal::derive(move || theme.get().is_dark());

    view! {
        <div
            class="counter-app"
            data-initialized=move || theme.get().initialized.to_string()
        >
            <EmojiLayer />
            <main class="counter-card">
                <h1 class="counter-title">"Counter"</h1>
                <div class="counter-display" aria-live="polite">
                    <span
                        class=move || counter_value_class(counter.get().pulse.animating)
                        style=move || format!("transform: scale({});", counter.get().pulse.intensity)
                    >
                        {move || counter.get().count}
                    </span>
                </div>
                <div class="counter-controls">
                    <button
                        type="button"
                        class="counter-button"
                        aria-label="Decrement"
                        on:click=move |_| runtime.decrement()
                    >
                        "-"
                    </button>
                    <button
                        type="button"
                        class="counter-button counter-reset"
                        aria-label="Reset"
                        on:click=move |_| runtime.reset()
                    >
                        "Reset"
                    </button>
                    <button
                        type="button"
                        class="counter-button"
                        aria-label="Increment"
                        on:click=move |_| runtime.increment()
                    >
                        "+"
                    </button>
                </div>
                <div class="counter-toggles">
                    <button
                        type="button"
                        class="toggle-button"
                        aria-label="Toggle emojis"
                        aria-pressed=move || emojis_enabled.get().to_string()
                        on:click=move |_| runtime.toggle_emojis()
                    >
                        {move || if emojis_enabled.get() { "Emojis: on" } else { "Emojis: off" }}
                    </button>
                    <button
                        type="button"
                        class="toggle-button"
                        aria-label="Toggle dark theme"
                        aria-pressed=move || is_dark.get().to_string()
                        on:click=move |_| runtime.toggle_theme()
                    >
                        {move || if is_dark.get() { "Dark" } else { "Light" }}
                    </button>
                </div>
                <p class="counter-instructions">
                    "Arrow Up / Arrow Down change the count, R resets, E toggles emojis."
                </p>
            </main>
        </div>
    }
}
