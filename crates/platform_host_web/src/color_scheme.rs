//! `matchMedia("(prefers-color-scheme: dark)")` notifier.

use std::rc::Rc;

use platform_host::{ColorSchemeService, ColorSchemeSubscription};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

/// Media query whose match state is the OS dark-mode preference.
pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

#[derive(Debug, Clone, Copy, Default)]
/// Browser color-scheme notifier backed by a `MediaQueryList`.
pub struct WebColorSchemeService;

#[cfg(target_arch = "wasm32")]
fn dark_scheme_query() -> Result<web_sys::MediaQueryList, String> {
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
    window
        .match_media(DARK_SCHEME_QUERY)
        .map_err(|e| format!("matchMedia failed: {e:?}"))?
        .ok_or_else(|| "matchMedia returned no list".to_string())
}

impl ColorSchemeService for WebColorSchemeService {
    fn prefers_dark(&self) -> Result<bool, String> {
        #[cfg(target_arch = "wasm32")]
        {
            Ok(dark_scheme_query()?.matches())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Err("prefers-color-scheme is only available when compiled for wasm32".to_string())
        }
    }

    fn subscribe(&self, listener: Rc<dyn Fn(bool)>) -> Result<ColorSchemeSubscription, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let query = dark_scheme_query()?;
            let callback = Closure::<dyn Fn(web_sys::MediaQueryListEvent)>::new(
                move |event: web_sys::MediaQueryListEvent| listener(event.matches()),
            );
            query
                .add_event_listener_with_callback("change", callback.as_ref().unchecked_ref())
                .map_err(|e| format!("matchMedia change listener failed: {e:?}"))?;
            Ok(ColorSchemeSubscription::new(move || {
                let _ = query.remove_event_listener_with_callback(
                    "change",
                    callback.as_ref().unchecked_ref(),
                );
                drop(callback);
            }))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = listener;
            Ok(ColorSchemeSubscription::inert())
        }
    }
}
