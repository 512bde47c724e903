//! Simulator configuration
//!
//! Gantree: L4_Backend → SimulatorConfig
//!
//! Settings for [`crate::StateSimulator`].

use qdiff_core::{tolerance, QdiffError, QdiffResult, Wire, Wires};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default simulator name
pub const DEFAULT_NAME: &str = "qdiff.state";

/// State simulator settings
/// Gantree: SimulatorConfig // name, wires, sort_wires, check_norm, norm_tolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Simulator name used in logs
    pub name: String,

    /// Fixed device wires; scripts may only touch these
    /// Gantree: wires: Option<Vec<Wire>> // None = script wires
    pub wires: Option<Vec<Wire>>,

    /// Sort script wires when no device wires are fixed
    pub sort_wires: bool,

    /// Reject final states whose norm drifted
    pub check_norm: bool,

    /// Allowed |‖ψ‖² − 1|
    pub norm_tolerance: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            wires: None,
            sort_wires: true,
            check_norm: true,
            norm_tolerance: tolerance::ATOL,
        }
    }
}

impl SimulatorConfig {
    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set explicit device wires
    pub fn with_wires<I, W>(mut self, wires: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Wire>,
    {
        self.wires = Some(wires.into_iter().map(Into::into).collect());
        self
    }

    /// Set device wires `0..num_wires`
    pub fn with_num_wires(mut self, num_wires: usize) -> Self {
        self.wires = Some((0..num_wires).map(Wire::from).collect());
        self
    }

    /// Set script-wire sorting
    pub fn with_sort_wires(mut self, sort: bool) -> Self {
        self.sort_wires = sort;
        self
    }

    /// Enable or disable the final norm check
    pub fn with_check_norm(mut self, check: bool) -> Self {
        self.check_norm = check;
        self
    }

    /// Set norm tolerance
    pub fn with_norm_tolerance(mut self, tol: f64) -> Self {
        self.norm_tolerance = tol;
        self
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Device wires for a script touching `script_wires`
    /// Gantree: device_wires(&self,script_wires) -> Result<Wires>
    pub fn device_wires(&self, script_wires: &Wires) -> QdiffResult<Wires> {
        match &self.wires {
            Some(fixed) => {
                let device = Wires::new(fixed.iter().cloned())?;
                if let Some(missing) = script_wires.iter().find(|w| !device.contains(w)) {
                    return Err(QdiffError::WireNotFound(missing.to_string()));
                }
                Ok(device)
            }
            None if self.sort_wires => Ok(script_wires.sorted()),
            None => Ok(script_wires.clone()),
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    /// Gantree: validate(&self) -> Result
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !self.norm_tolerance.is_finite() || self.norm_tolerance <= 0.0 {
            return Err(format!(
                "norm_tolerance must be positive, got {}",
                self.norm_tolerance
            ));
        }
        if let Some(wires) = &self.wires {
            if let Err(err) = Wires::new(wires.iter().cloned()) {
                return Err(format!("wires: {}", err));
            }
        }
        Ok(())
    }

    /// Validate, mapping failures into [`QdiffError::InvalidConfig`]
    pub fn checked(self) -> QdiffResult<Self> {
        self.validate().map_err(QdiffError::InvalidConfig)?;
        Ok(self)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Parse from JSON
    pub fn from_json(json: &str) -> QdiffResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.checked()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QdiffResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SimulatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SimulatorConfig: {}", self.name)?;
        match &self.wires {
            Some(wires) => writeln!(f, "  Wires: {}", wires.len())?,
            None => writeln!(f, "  Wires: from script (sorted={})", self.sort_wires)?,
        }
        writeln!(
            f,
            "  Norm check: {} (tol={:e})",
            self.check_norm, self.norm_tolerance
        )?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = SimulatorConfig::default();
        assert_eq!(config.name, DEFAULT_NAME);
        assert!(config.wires.is_none());
        assert!(config.sort_wires);
        assert!(config.check_norm);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SimulatorConfig::default()
            .with_name("bench")
            .with_wires(["a", "b"])
            .with_sort_wires(false)
            .with_check_norm(false)
            .with_norm_tolerance(1e-6);
        assert_eq!(config.name, "bench");
        assert_eq!(config.wires.as_ref().map(Vec::len), Some(2));
        assert!(!config.sort_wires);
        assert!(!config.check_norm);
        assert_eq!(config.norm_tolerance, 1e-6);
    }

    #[test]
    fn test_validation() {
        assert!(SimulatorConfig::default().with_name(" ").validate().is_err());
        assert!(SimulatorConfig::default()
            .with_norm_tolerance(0.0)
            .validate()
            .is_err());
        assert!(SimulatorConfig::default()
            .with_norm_tolerance(f64::NAN)
            .validate()
            .is_err());
        assert!(matches!(
            SimulatorConfig::default().with_wires([1usize, 1]).checked(),
            Err(QdiffError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_device_wires() {
        let script = Wires::new([2usize, 0]).unwrap();
        let sorted = SimulatorConfig::default().device_wires(&script).unwrap();
        assert_eq!(sorted, Wires::new([0usize, 2]).unwrap());

        let unsorted = SimulatorConfig::default()
            .with_sort_wires(false)
            .device_wires(&script)
            .unwrap();
        assert_eq!(unsorted, script);

        let fixed = SimulatorConfig::default().with_num_wires(3);
        assert_eq!(fixed.device_wires(&script).unwrap(), Wires::range(3));

        let small = SimulatorConfig::default().with_num_wires(2);
        assert!(matches!(
            small.device_wires(&script),
            Err(QdiffError::WireNotFound(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SimulatorConfig::default().with_wires(["q0", "q1"]);
        let json = config.to_json().unwrap();
        assert_eq!(SimulatorConfig::from_json(&json).unwrap(), config);

        let partial = SimulatorConfig::from_json(r#"{"check_norm": false}"#).unwrap();
        assert!(!partial.check_norm);
        assert_eq!(partial.name, DEFAULT_NAME);

        assert!(SimulatorConfig::from_json(r#"{"norm_tolerance": -1.0}"#).is_err());
    }

    #[test]
    fn test_display() {
        let s = SimulatorConfig::default().to_string();
        assert!(s.contains("SimulatorConfig: qdiff.state"));
        assert!(s.contains("from script"));
    }
}
