//! On-demand chart library loading via dynamic `import()`

use async_trait::async_trait;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::chart_js::JsChartLibrary;
use crate::trigger::{DependencyLoader, LoadError};

#[wasm_bindgen(inline_js = "export function import_module(url) { return import(url); }")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn import_module(url: &str) -> Result<js_sys::Promise, JsValue>;
}

/// Where the chart code lives
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoaderConfig {
    #[serde(default = "default_library_url")]
    pub library_url: String,

    /// Date adapter imported right after the library. Without one the
    /// growth chart uses a category x axis instead of a time scale.
    #[serde(default)]
    pub date_adapter_url: Option<String>,

    /// Imported in order after the library (plugins)
    #[serde(default)]
    pub extra_modules: Vec<String>,
}

fn default_library_url() -> String {
    "/static/js/vendor/chart.min.js".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            library_url: default_library_url(),
            date_adapter_url: None,
            extra_modules: Vec::new(),
        }
    }
}

/// Imports the chart library the first time charts are needed
pub struct ModuleLoader {
    config: LoaderConfig,
}

impl ModuleLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }
}

async fn import(url: &str) -> Result<JsValue, LoadError> {
    let failed = |e: JsValue| LoadError::Import {
        url: url.to_string(),
        reason: describe(&e),
    };
    let promise = import_module(url).map_err(failed)?;
    JsFuture::from(promise).await.map_err(failed)
}

fn describe(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// The module's default export, or the UMD build's `Chart` global
fn find_constructor(module: &JsValue) -> Option<js_sys::Function> {
    let default = js_sys::Reflect::get(module, &JsValue::from_str("default")).ok();
    let global = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Chart")).ok();

    default
        .into_iter()
        .chain(global)
        .find_map(|candidate| candidate.dyn_into::<js_sys::Function>().ok())
}

#[async_trait(?Send)]
impl DependencyLoader for ModuleLoader {
    type Library = JsChartLibrary;

    async fn load(&self) -> Result<JsChartLibrary, LoadError> {
        let module = import(&self.config.library_url).await?;
        let constructor = find_constructor(&module).ok_or_else(|| LoadError::MissingExport {
            url: self.config.library_url.clone(),
        })?;

        let modules = self.config.date_adapter_url.iter();
        for url in modules.chain(&self.config.extra_modules) {
            import(url).await?;
        }

        Ok(JsChartLibrary::new(constructor))
    }

    fn has_date_adapter(&self) -> bool {
        self.config.date_adapter_url.is_some()
    }
}
