use counter_runtime::{CounterWidget, WidgetConfig, WidgetProvider, CONFIG_DATA_ATTRIBUTE};
use leptos::*;
use leptos_meta::*;
use platform_host_web::body_attribute;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Counter App" />
        <Meta name="description" content="A counter with keyboard shortcuts, floating emojis, and a light/dark theme." />

        <main class="site-root">
            <CounterEntry />
        </main>
    }
}

#[component]
pub fn CounterEntry() -> impl IntoView {
    let config = WidgetConfig::from_json_or_default(body_attribute(CONFIG_DATA_ATTRIBUTE).as_deref());

    view! {
        <WidgetProvider config=config>
            <CounterWidget />
        </WidgetProvider>
    }
}
