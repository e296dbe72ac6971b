use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use folio_motion_core::{
    Config, NullSurface, Rect, RenderError, RenderLoopState, RenderSurface, Viewport,
};
use folio_stage::{SectionSpec, Stage, StageFrame};

#[wasm_bindgen]
pub struct FolioStage {
    core: Stage,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Calls a JS `present(state)` callback once per rendered frame.
/// Returning `false` reports a lost context; throwing reports a surface error.
struct JsSurface {
    f: Function,
}

impl RenderSurface for JsSurface {
    fn present(&mut self, state: &RenderLoopState) -> Result<(), RenderError> {
        let arg = state
            .serialize(&swb::Serializer::json_compatible())
            .map_err(|e| RenderError::Surface(e.to_string()))?;
        match self.f.call1(&JsValue::UNDEFINED, &arg) {
            Ok(val) if val.as_bool() == Some(false) => Err(RenderError::ContextLost),
            Ok(_) => Ok(()),
            Err(err) => Err(RenderError::Surface(
                err.as_string().unwrap_or_else(|| format!("{err:?}")),
            )),
        }
    }
}

fn frame_to_js(frame: &StageFrame) -> Result<JsValue, JsError> {
    frame
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("frame error: {e}")))
}

#[wasm_bindgen]
impl FolioStage {
    /// Create a stage. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new FolioStage({ scrub_lag: 1.0, render: { rate: [0.2, 0.3, 0] } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FolioStage, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(FolioStage {
            core: Stage::new(cfg),
        })
    }

    #[wasm_bindgen(js_name = set_viewport)]
    pub fn set_viewport(&mut self, scroll_y: f32, height: f32) {
        self.core.set_viewport(Viewport { scroll_y, height });
    }

    #[wasm_bindgen(js_name = set_scroll)]
    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.core.set_scroll(scroll_y);
    }

    /// Mount or move a target element (document coordinates, untransformed).
    #[wasm_bindgen(js_name = set_target)]
    pub fn set_target(&mut self, target: &str, top: f32, height: f32) {
        self.core.set_target(target, Rect { top, height });
    }

    #[wasm_bindgen(js_name = remove_target)]
    pub fn remove_target(&mut self, target: &str) -> bool {
        self.core.remove_target(target)
    }

    /// Current rendered state of a target, or undefined when it is not mounted.
    #[wasm_bindgen(js_name = target_state)]
    pub fn target_state(&self, target: &str) -> Result<JsValue, JsError> {
        match self.core.layout().state(target) {
            Some(state) => {
                swb::to_value(&state).map_err(|e| JsError::new(&format!("state error: {e}")))
            }
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Mount a section from a SectionSpec object `{ id, descriptors, groups }`.
    /// Returns the scope id (u32).
    #[wasm_bindgen(js_name = mount_section)]
    pub fn mount_section(&mut self, spec: JsValue) -> Result<u32, JsError> {
        if jsvalue_is_undefined_or_null(&spec) {
            return Err(JsError::new("mount_section: spec is null/undefined"));
        }
        let spec: SectionSpec = swb::from_value(spec)
            .map_err(|e| JsError::new(&format!("mount_section parse error: {e}")))?;
        let id = self
            .core
            .mount_section(spec)
            .map_err(|e| JsError::new(&format!("{e:#}")))?;
        Ok(id.0)
    }

    #[wasm_bindgen(js_name = unmount_section)]
    pub fn unmount_section(&mut self, section: &str) -> bool {
        self.core.unmount_section(section)
    }

    /// Re-activate every mounted section, e.g. after the page re-rendered.
    #[wasm_bindgen(js_name = remount_all)]
    pub fn remount_all(&mut self) -> Result<(), JsError> {
        self.core
            .remount_all()
            .map_err(|e| JsError::new(&format!("{e:#}")))
    }

    #[wasm_bindgen(js_name = start_render_loop)]
    pub fn start_render_loop(&mut self) {
        self.core.start_render_loop();
    }

    #[wasm_bindgen(js_name = stop_render_loop)]
    pub fn stop_render_loop(&mut self) {
        self.core.stop_render_loop();
    }

    #[wasm_bindgen(js_name = is_rendering)]
    pub fn is_rendering(&self) -> bool {
        self.core.is_rendering()
    }

    /// Step by dt (seconds). `present(state)` is called when the render loop advances.
    /// Returns the StageFrame as a plain object.
    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32, present: Option<Function>) -> Result<JsValue, JsError> {
        let frame = match present {
            Some(f) => self.core.step(dt, &mut JsSurface { f }),
            None => self.core.step(dt, &mut NullSurface),
        };
        frame_to_js(&frame)
    }

    /// Step from a `requestAnimationFrame` timestamp (ms).
    #[wasm_bindgen(js_name = step_at)]
    pub fn step_at(
        &mut self,
        timestamp_ms: f64,
        present: Option<Function>,
    ) -> Result<JsValue, JsError> {
        let frame = match present {
            Some(f) => self.core.step_at(timestamp_ms, &mut JsSurface { f }),
            None => self.core.step_at(timestamp_ms, &mut NullSurface),
        };
        frame_to_js(&frame)
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
