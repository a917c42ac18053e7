use alloc::collections::BTreeMap;
use alloc::string::ToString;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::{
    EventCallback, ObservationBackend, ObservationEvent, ObserveOptions, Rect, SubscriptionToken,
    TrackerError, meets_threshold,
};

type EntriesListener = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct DomWatch {
    observer: IntersectionObserver,
    target: Element,
    // Must outlive the observer's registration.
    _listener: EntriesListener,
}

/// An [`ObservationBackend`] on the platform `IntersectionObserver`.
///
/// Each watch gets its own observer configured with the watch's threshold and root margin, so
/// releasing a watch disconnects exactly one observer.
#[derive(Default)]
pub struct DomBackend {
    watches: BTreeMap<SubscriptionToken, DomWatch>,
    next_token: u64,
}

impl DomBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the current global scope exposes `IntersectionObserver`.
    pub fn is_available() -> bool {
        js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false)
    }

    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }
}

fn event_from_entry(entry: &IntersectionObserverEntry, threshold: f64) -> ObservationEvent {
    let rect = entry.bounding_client_rect();
    let target = entry.target();
    let class_name = target.class_name();
    let target_label = if class_name.is_empty() {
        target.tag_name().to_ascii_lowercase()
    } else {
        class_name
    };
    let ratio = entry.intersection_ratio().clamp(0.0, 1.0);
    ObservationEvent {
        is_intersecting: meets_threshold(entry.is_intersecting(), ratio, threshold),
        intersection_ratio: ratio,
        bounding_rect: Rect::new(rect.x(), rect.y(), rect.width(), rect.height()),
        target_label,
    }
}

impl ObservationBackend for DomBackend {
    type Target = Element;

    fn observe(
        &mut self,
        target: &Element,
        options: &ObserveOptions,
        on_event: EventCallback,
    ) -> Result<SubscriptionToken, TrackerError> {
        if !Self::is_available() {
            return Err(TrackerError::BackendUnavailable);
        }

        let threshold = options.threshold;
        let listener: EntriesListener = Closure::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    on_event(event_from_entry(&entry, threshold));
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin.to_string());

        let observer =
            IntersectionObserver::new_with_options(listener.as_ref().unchecked_ref(), &init)
                .map_err(|_| TrackerError::BackendUnavailable)?;
        observer.observe(target);

        let token = SubscriptionToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.watches.insert(
            token,
            DomWatch {
                observer,
                target: target.clone(),
                _listener: listener,
            },
        );
        Ok(token)
    }

    fn unobserve(&mut self, token: SubscriptionToken) {
        let Some(watch) = self.watches.remove(&token) else {
            return;
        };
        watch.observer.unobserve(&watch.target);
        watch.observer.disconnect();
    }
}

impl Drop for DomBackend {
    fn drop(&mut self) {
        for (_, watch) in core::mem::take(&mut self.watches) {
            watch.observer.disconnect();
        }
    }
}
