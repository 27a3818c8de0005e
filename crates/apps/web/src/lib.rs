//! Browser binding for the `<h3-map>` element.
//!
//! `H3MapElement` wraps one [`widget::H3Map`] per custom element instance.
//! The JS shim in `www/h3-map.js` registers the element and forwards its
//! lifecycle callbacks here.

use std::cell::RefCell;
use std::rc::Rc;

use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CustomEvent, CustomEventInit, HtmlElement};
use widget::attributes::OBSERVED_ATTRIBUTES;
use widget::{
    AttributeError, ErrorClass, FetchError, GeometryFetcher, H3Map, LifecycleEvent, LoadError, Task,
    WorldSource, load_world_geometry,
};

/// DOM event dispatched on the element when world geometry fails to load.
pub const GEOMETRY_ERROR_EVENT: &str = "world-geometry-error";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Fetches JSON with the browser's `fetch`.
#[derive(Debug, Default, Copy, Clone)]
pub struct GlooFetcher;

impl GeometryFetcher for GlooFetcher {
    async fn fetch_json(&self, src: &str) -> Result<Value, FetchError> {
        let resp = Request::get(src)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: src.to_string(),
                message: e.to_string(),
            })?;
        if !resp.ok() {
            return Err(FetchError::Status {
                url: src.to_string(),
                status: resp.status(),
            });
        }
        resp.json::<Value>().await.map_err(|e| FetchError::Decode {
            url: src.to_string(),
            message: e.to_string(),
        })
    }
}

struct Inner {
    map: H3Map,
    host: HtmlElement,
}

#[wasm_bindgen]
pub struct H3MapElement {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl H3MapElement {
    #[wasm_bindgen(constructor)]
    pub fn new(host: HtmlElement) -> H3MapElement {
        H3MapElement {
            inner: Rc::new(RefCell::new(Inner {
                map: H3Map::new(),
                host,
            })),
        }
    }

    #[wasm_bindgen(js_name = observedAttributes)]
    pub fn observed_attributes() -> js_sys::Array {
        OBSERVED_ATTRIBUTES
            .iter()
            .map(|name| JsValue::from_str(name))
            .collect()
    }

    /// `connectedCallback`: first render.
    pub fn connected(&self) {
        render(&self.inner);
    }

    /// `attributeChangedCallback`. Throws `RangeError`/`TypeError` for
    /// invalid values.
    #[wasm_bindgen(js_name = attributeChanged)]
    pub fn attribute_changed(&self, name: String, value: Option<String>) -> Result<(), JsValue> {
        let result = self
            .inner
            .borrow_mut()
            .map
            .attribute_changed(&name, value.as_deref());
        result.map_err(to_js_error)?;
        render(&self.inner);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn projection(&self) -> String {
        self.inner.borrow().map.projection().id().to_string()
    }

    #[wasm_bindgen(setter)]
    pub fn set_projection(&self, id: String) -> Result<(), JsValue> {
        let result = self.inner.borrow_mut().map.set_projection(&id);
        result.map_err(to_js_error)?;
        render(&self.inner);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn areas(&self) -> js_sys::Array {
        self.inner
            .borrow()
            .map
            .areas()
            .iter()
            .map(|area| JsValue::from_str(&area.id))
            .collect()
    }

    /// Accepts any JS value; non-arrays throw `TypeError`.
    #[wasm_bindgen(setter)]
    pub fn set_areas(&self, value: JsValue) -> Result<(), JsValue> {
        let value = js_to_json(&value).ok_or_else(|| to_js_error(AttributeError::NotASequence))?;
        let result = self.inner.borrow_mut().map.set_areas_value(&value);
        result.map_err(to_js_error)?;
        render(&self.inner);
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = worldGeometrySrc)]
    pub fn world_geometry_src(&self) -> String {
        self.inner.borrow().map.world_source().src.clone()
    }

    #[wasm_bindgen(setter, js_name = worldGeometrySrc)]
    pub fn set_world_geometry_src(&self, src: String) {
        self.inner.borrow_mut().map.set_world_geometry_src(&src);
        render(&self.inner);
    }

    #[wasm_bindgen(getter, js_name = worldGeometryColl)]
    pub fn world_geometry_coll(&self) -> String {
        self.inner.borrow().map.world_source().coll.clone()
    }

    #[wasm_bindgen(setter, js_name = worldGeometryColl)]
    pub fn set_world_geometry_coll(&self, coll: String) {
        self.inner.borrow_mut().map.set_world_geometry_coll(&coll);
        render(&self.inner);
    }

    #[wasm_bindgen(getter, js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.inner.borrow().map.is_loading()
    }

    /// Message of the last failed geometry load, if any.
    #[wasm_bindgen(getter, js_name = loadError)]
    pub fn load_error(&self) -> Option<String> {
        self.inner.borrow().map.load_error().map(ToString::to_string)
    }
}

fn to_js_error(err: AttributeError) -> JsValue {
    let message = err.to_string();
    match err.class() {
        ErrorClass::Range => js_sys::RangeError::new(&message).into(),
        ErrorClass::Type => js_sys::TypeError::new(&message).into(),
    }
}

fn js_to_json(value: &JsValue) -> Option<Value> {
    let text = js_sys::JSON::stringify(value)
        .ok()
        .and_then(|text| text.as_string());
    json_from_text(text.as_deref())
}

/// `JSON.stringify` yields nothing for `undefined` and functions.
fn json_from_text(text: Option<&str>) -> Option<Value> {
    serde_json::from_str(text?).ok()
}

/// Tasks due after a paint. A detached host has no size to measure, so the
/// first-paint work waits until the element is connected.
fn paint_tasks(map: &mut H3Map, attached: bool) -> Vec<Task> {
    if attached { map.after_paint() } else { Vec::new() }
}

fn describe_event(frame_index: u64, kind: &LifecycleEvent) -> String {
    format!("h3-map frame {frame_index}: {kind:?}")
}

/// Renders into the host, then runs the after-paint tasks on the next frame.
fn render(inner: &Rc<RefCell<Inner>>) {
    {
        let mut state = inner.borrow_mut();
        let html = state.map.render();
        state.host.set_inner_html(&html);
        for event in state.map.drain_events() {
            web_sys::console::debug_1(&JsValue::from_str(&describe_event(
                event.frame_index,
                &event.kind,
            )));
        }
    }
    let next = inner.clone();
    on_next_frame(move || {
        let tasks = {
            let mut state = next.borrow_mut();
            let attached = state.host.is_connected();
            paint_tasks(&mut state.map, attached)
        };
        for task in tasks {
            run_task(&next, task);
        }
    });
}

fn run_task(inner: &Rc<RefCell<Inner>>, task: Task) {
    match task {
        Task::ProbeViewport => {
            let next = inner.clone();
            on_next_frame(move || probe_viewport(&next));
        }
        Task::LoadWorldGeometry(source) => {
            let next = inner.clone();
            spawn_local(async move {
                let result = load_world_geometry(&GlooFetcher, &source).await;
                apply_world_geometry(&next, &source, result);
            });
        }
    }
}

fn probe_viewport(inner: &Rc<RefCell<Inner>>) {
    let measured = {
        let mut state = inner.borrow_mut();
        let rect = state.host.get_bounding_client_rect();
        state.map.apply_viewport(rect.width(), rect.height())
    };
    if measured {
        render(inner);
    }
}

fn apply_world_geometry(
    inner: &Rc<RefCell<Inner>>,
    source: &WorldSource,
    result: Result<Option<formats::FeatureCollection>, LoadError>,
) {
    let failure = result.as_ref().err().map(ToString::to_string);
    let applied = inner.borrow_mut().map.apply_world_geometry(source, result);
    if !applied {
        return;
    }
    if let Some(message) = failure {
        web_sys::console::error_1(&JsValue::from_str(&format!(
            "h3-map: failed to load world geometry: {message}"
        )));
        // Listeners may touch the element again, so no borrow is held here.
        let host = inner.borrow().host.clone();
        dispatch_error(&host, &message);
    }
    render(inner);
}

fn dispatch_error(host: &HtmlElement, message: &str) {
    let init = CustomEventInit::new();
    init.set_bubbles(true);
    init.set_detail(&JsValue::from_str(message));
    match CustomEvent::new_with_event_init_dict(GEOMETRY_ERROR_EVENT, &init) {
        Ok(event) => {
            let _ = host.dispatch_event(&event);
        }
        Err(err) => web_sys::console::error_1(&err),
    }
}

fn on_next_frame(f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(f);
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        web_sys::console::error_1(&err);
    }
}

#[cfg(test)]
mod tests {
    use super::{describe_event, json_from_text, paint_tasks};
    use widget::{AttributeError, ErrorClass, H3Map, LifecycleEvent, Task, WorldSource};

    fn source() -> WorldSource {
        WorldSource::new("land.json", "land")
    }

    #[test]
    fn detached_host_defers_first_paint_work() {
        let mut map = H3Map::new();
        map.set_world_geometry_src("land.json");
        map.render();
        assert!(paint_tasks(&mut map, false).is_empty());
        assert!(paint_tasks(&mut map, false).is_empty());

        map.render();
        assert_eq!(
            paint_tasks(&mut map, true),
            vec![Task::LoadWorldGeometry(source()), Task::ProbeViewport]
        );
    }

    #[test]
    fn zero_sized_measurement_is_retried_on_next_paint() {
        let mut map = H3Map::new();
        map.set_world_geometry_src("land.json");
        map.render();
        paint_tasks(&mut map, true);
        assert!(!map.apply_viewport(0.0, 0.0));
        map.render();
        assert_eq!(paint_tasks(&mut map, true), vec![Task::ProbeViewport]);
    }

    #[test]
    fn only_json_arrays_reach_area_validation() {
        assert_eq!(json_from_text(None), None);
        assert_eq!(json_from_text(Some("not json")), None);

        let mut map = H3Map::new();
        let object = json_from_text(Some("{\"0\": \"8928308280fffff\"}")).expect("json");
        let err = map.set_areas_value(&object).expect_err("not a sequence");
        assert_eq!(err, AttributeError::NotASequence);
        assert_eq!(err.class(), ErrorClass::Type);

        let array = json_from_text(Some("[\"8928308280fffff\"]")).expect("json");
        map.set_areas_value(&array).expect("valid");
        assert_eq!(map.areas().len(), 1);
    }

    #[test]
    fn events_are_described_with_their_frame() {
        let text = describe_event(2, &LifecycleEvent::AttributeAccepted { name: "areas" });
        assert_eq!(text, "h3-map frame 2: AttributeAccepted { name: \"areas\" }");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::{js_to_json, to_js_error};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_test::*;
    use widget::AttributeError;

    #[wasm_bindgen_test]
    fn attribute_errors_become_range_or_type_errors() {
        let range = to_js_error(AttributeError::UnknownProjection("geoNope".into()));
        assert!(range.is_instance_of::<js_sys::RangeError>());
        let ty = to_js_error(AttributeError::NotASequence);
        assert!(ty.is_instance_of::<js_sys::TypeError>());
    }

    #[wasm_bindgen_test]
    fn non_array_values_convert_to_non_arrays() {
        assert_eq!(js_to_json(&JsValue::UNDEFINED), None);
        assert_eq!(js_to_json(&JsValue::from_f64(3.0)), Some(serde_json::json!(3)));
        let array = js_sys::Array::of1(&JsValue::from_str("8928308280fffff"));
        assert_eq!(
            js_to_json(&array),
            Some(serde_json::json!(["8928308280fffff"]))
        );
    }
}
