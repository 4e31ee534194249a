use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_ik_core::{ChainSolver, IkConfig, SolveOutcome, Vec3};

/// FABRIK chain solver for JS hosts.
///
/// Poses are flat `Float32Array`s, root first: `[x0, y0, z0, x1, y1, z1, ...]`.
#[wasm_bindgen]
pub struct VizijIk {
    core: ChainSolver,
    last_outcome: Option<SolveOutcome>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn parse_config(config: JsValue) -> Result<IkConfig, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(IkConfig::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

/// Split a flat xyz buffer into points.
fn points_from_flat(flat: &[f32], label: &str) -> Result<Vec<Vec3>, String> {
    if flat.len() % 3 != 0 {
        return Err(format!(
            "{label} expects xyz triples, received {} floats",
            flat.len()
        ));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|xyz| Vec3::new(xyz[0], xyz[1], xyz[2]))
        .collect())
}

fn point_from_flat(flat: Option<Vec<f32>>, label: &str) -> Result<Option<Vec3>, String> {
    match flat {
        None => Ok(None),
        Some(v) if v.len() == 3 => Ok(Some(Vec3::new(v[0], v[1], v[2]))),
        Some(v) => Err(format!("{label} expects 3 floats, received {}", v.len())),
    }
}

fn flatten(points: &[Vec3]) -> Vec<f32> {
    points.iter().flat_map(|p| p.to_array()).collect()
}

#[wasm_bindgen]
impl VizijIk {
    /// Create a solver. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new VizijIk({ chain_length: 3, iterations: 16, delta: 0.001 })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijIk, JsError> {
        console_error_panic_hook::set_once();

        let cfg = parse_config(config)?;
        let core = ChainSolver::new(cfg).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(VizijIk {
            core,
            last_outcome: None,
        })
    }

    /// Build chain geometry from a root-first pose of `chain_length + 1` joints.
    #[wasm_bindgen]
    pub fn initialize(&mut self, pose: &[f32]) -> Result<(), JsError> {
        let points = points_from_flat(pose, "initialize").map_err(|e| JsError::new(&e))?;
        self.core
            .initialize(&points)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Replace the config; the chain is rebuilt from the next solved pose.
    #[wasm_bindgen]
    pub fn reconfigure(&mut self, config: JsValue) -> Result<(), JsError> {
        let cfg = parse_config(config)?;
        self.last_outcome = None;
        self.core
            .reconfigure(cfg)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Solve from `pose` toward `target` with an optional `pole`. Returns the
    /// new pose in the same flat layout. A missing target returns `pose` as is.
    #[wasm_bindgen]
    pub fn solve(
        &mut self,
        target: Option<Vec<f32>>,
        pole: Option<Vec<f32>>,
        pose: &[f32],
    ) -> Result<Vec<f32>, JsError> {
        let target = point_from_flat(target, "target").map_err(|e| JsError::new(&e))?;
        let pole = point_from_flat(pole, "pole").map_err(|e| JsError::new(&e))?;
        let points = points_from_flat(pose, "pose").map_err(|e| JsError::new(&e))?;

        let outcome = self
            .core
            .solve(target, pole, &points)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.last_outcome = Some(outcome);
        Ok(flatten(self.core.positions()))
    }

    /// Outcome of the last solve as JSON (`{ status: { kind, ... }, tip_error }`),
    /// or null before the first solve.
    #[wasm_bindgen(js_name = last_outcome)]
    pub fn last_outcome(&self) -> Result<JsValue, JsError> {
        match &self.last_outcome {
            Some(outcome) => {
                swb::to_value(outcome).map_err(|e| JsError::new(&format!("outcome error: {e}")))
            }
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = bone_lengths)]
    pub fn bone_lengths(&self) -> Vec<f32> {
        self.core
            .chain()
            .map(|c| c.bone_lengths().to_vec())
            .unwrap_or_default()
    }

    /// Maximum reach, or 0 before the chain is initialized.
    #[wasm_bindgen(js_name = total_length)]
    pub fn total_length(&self) -> f32 {
        self.core.chain().map_or(0.0, |c| c.total_length())
    }

    /// Bone segments of the working pose as `[sx, sy, sz, ex, ey, ez, ...]`.
    #[wasm_bindgen(js_name = debug_segments)]
    pub fn debug_segments(&self) -> Vec<f32> {
        self.core
            .debug_segments()
            .flat_map(|s| [s.start.to_array(), s.end.to_array()])
            .flatten()
            .collect()
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
