//! Chart.js constructor wrapper

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::charts::{ChartSpec, TooltipFormatter, TooltipItem};
use crate::trigger::{ChartLibrary, RenderError};

/// The loaded chart constructor
pub struct JsChartLibrary {
    constructor: Function,
}

impl JsChartLibrary {
    pub fn new(constructor: Function) -> Self {
        Self { constructor }
    }
}

impl ChartLibrary for JsChartLibrary {
    type Surface = HtmlCanvasElement;

    fn construct(&self, canvas: &HtmlCanvasElement, spec: &ChartSpec) -> Result<(), RenderError> {
        let chart = spec.kind.canvas_id();
        let failed = |e: JsValue| RenderError::Construct {
            chart,
            reason: format!("{:?}", e),
        };

        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(RenderError::NoContext(chart))?;

        let config = js_sys::JSON::parse(&spec.to_config().to_string()).map_err(failed)?;
        attach_tooltip(&config, spec.tooltip.clone()).map_err(failed)?;

        let args = js_sys::Array::of2(&ctx, &config);
        Reflect::construct(&self.constructor, &args).map_err(failed)?;
        Ok(())
    }
}

/// Set `options.plugins.tooltip.callbacks.label` to the chart's tooltip formatter
fn attach_tooltip(config: &JsValue, formatter: TooltipFormatter) -> Result<(), JsValue> {
    let options = child(config, "options")?;
    let plugins = child(&options, "plugins")?;
    let tooltip = child(&plugins, "tooltip")?;
    let callbacks = child(&tooltip, "callbacks")?;

    let label = Closure::wrap(Box::new(move |context: JsValue| -> String {
        let label = string_at(&context, &["label"]);
        let dataset_label = string_at(&context, &["dataset", "label"]);
        let axis_id = string_at(&context, &["dataset", "yAxisID"]);
        let value = match formatter {
            TooltipFormatter::Share { .. } => number_at(&context, &["raw"]),
            TooltipFormatter::ValueOrGrowth => number_at(&context, &["parsed", "y"]),
        };
        formatter.label(&TooltipItem {
            label: &label,
            dataset_label: &dataset_label,
            axis_id: &axis_id,
            value,
        })
    }) as Box<dyn FnMut(JsValue) -> String>);

    Reflect::set(&callbacks, &JsValue::from_str("label"), label.as_ref())?;
    // the chart holds the callback for the rest of the page's life
    label.forget();
    Ok(())
}

/// `parent[key]`, created as an empty object when absent
fn child(parent: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    let key = JsValue::from_str(key);
    let existing = Reflect::get(parent, &key)?;
    if existing.is_object() {
        return Ok(existing);
    }
    let created: JsValue = Object::new().into();
    Reflect::set(parent, &key, &created)?;
    Ok(created)
}

fn lookup(root: &JsValue, path: &[&str]) -> JsValue {
    path.iter().fold(root.clone(), |value, key| {
        if value.is_object() {
            Reflect::get(&value, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
        } else {
            JsValue::UNDEFINED
        }
    })
}

fn string_at(root: &JsValue, path: &[&str]) -> String {
    lookup(root, path).as_string().unwrap_or_default()
}

fn number_at(root: &JsValue, path: &[&str]) -> Option<f64> {
    lookup(root, path).as_f64()
}
