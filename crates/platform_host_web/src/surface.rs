//! Document root styling surface.

use platform_host::{DocumentSurface, ThemePreference};
#[cfg(target_arch = "wasm32")]
use platform_host::THEME_DATA_ATTRIBUTE;

#[derive(Debug, Clone, Copy, Default)]
/// Browser surface writing theme markers onto `document.documentElement`.
pub struct WebDocumentSurface;

#[cfg(target_arch = "wasm32")]
fn document_root() -> Option<(web_sys::Window, web_sys::Element)> {
    let window = web_sys::window()?;
    let root = window.document()?.document_element()?;
    Some((window, root))
}

impl DocumentSurface for WebDocumentSurface {
    fn apply_theme(&self, theme: ThemePreference) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let (_, root) = document_root().ok_or_else(|| "document root unavailable".to_string())?;
            let markers = theme.root_markers();
            let attribute = match markers.data_theme {
                Some(value) => root.set_attribute(THEME_DATA_ATTRIBUTE, value),
                None => root.remove_attribute(THEME_DATA_ATTRIBUTE),
            };
            attribute.map_err(|e| format!("theme attribute update failed: {e:?}"))?;
            let classes = root.class_list();
            classes
                .remove_1(markers.remove_class)
                .map_err(|e| format!("theme class removal failed: {e:?}"))?;
            classes
                .add_1(markers.add_class)
                .map_err(|e| format!("theme class add failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = theme;
            Ok(())
        }
    }

    fn css_custom_property(&self, name: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let (window, root) = document_root()?;
            let style = window.get_computed_style(&root).ok().flatten()?;
            let value = style.get_property_value(name).ok()?;
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = name;
            None
        }
    }
}

/// Reads an attribute from `<body>`, used by the entry layer for host-page configuration.
pub fn body_attribute(name: &str) -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()?.document()?.body()?.get_attribute(name)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = name;
        None
    }
}
