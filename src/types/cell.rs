//! Per-cell input state: CellRecord

use serde::{Deserialize, Serialize};

// ============================================================================
// Cell Record
// ============================================================================

/// One active grid cell as seen at the first report step.
///
/// Built once by the grid frame loader and never mutated. Field names on the
/// wire are the simulator keywords.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Zero-based active cell index
    pub index: usize,
    /// Requested initial water saturation
    #[serde(rename = "SWATINIT")]
    pub swatinit: f64,
    /// Realized initial water saturation
    #[serde(rename = "SWAT")]
    pub swat: f64,
    /// Connate water saturation
    #[serde(rename = "SWL")]
    pub swl: f64,
    /// Connate water saturation for capillary pressure only
    #[serde(rename = "SWLPC", default, skip_serializing_if = "Option::is_none")]
    pub swlpc: Option<f64>,
    /// Maximum water saturation
    #[serde(rename = "SWU")]
    pub swu: f64,
    /// Pore volume at reference pressure (rm3)
    #[serde(rename = "PORV")]
    pub porv: f64,
    #[serde(rename = "SATNUM")]
    pub satnum: u32,
    #[serde(rename = "EQLNUM")]
    pub eqlnum: u32,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    /// Cell centre depth (m TVD)
    #[serde(rename = "Z")]
    pub z: f64,
}

impl CellRecord {
    /// Saturation below which the simulator truncates SWATINIT.
    ///
    /// SWLPC takes precedence over SWL when present and the simulator
    /// honours it.
    pub fn truncation_floor(&self, honour_swlpc: bool) -> f64 {
        match self.swlpc {
            Some(swlpc) if honour_swlpc => swlpc,
            _ => self.swl,
        }
    }

    /// Signed water volume discrepancy, positive when the model holds more
    /// water than requested.
    pub fn water_volume_change(&self) -> f64 {
        (self.swat - self.swatinit) * self.porv
    }

    /// Water volume the engineer asked for.
    pub fn requested_water_volume(&self) -> f64 {
        self.swatinit * self.porv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> CellRecord {
        CellRecord {
            index: 0,
            swatinit: 0.3,
            swat: 0.5,
            swl: 0.5,
            swlpc: None,
            swu: 1.0,
            porv: 1000.0,
            satnum: 1,
            eqlnum: 1,
            x: 0.0,
            y: 0.0,
            z: 1005.0,
        }
    }

    #[test]
    fn test_truncation_floor_precedence() {
        let mut c = cell();
        assert_eq!(c.truncation_floor(true), 0.5);
        c.swlpc = Some(0.2);
        assert_eq!(c.truncation_floor(true), 0.2);
        assert_eq!(c.truncation_floor(false), 0.5);
    }

    #[test]
    fn test_water_volume_change_sign() {
        let c = cell();
        assert!((c.water_volume_change() - 200.0).abs() < 1e-9);
        assert!((c.requested_water_volume() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_field_names() {
        let json = serde_json::to_value(cell()).unwrap();
        assert_eq!(json["SWATINIT"], 0.3);
        assert_eq!(json["EQLNUM"], 1);
        assert!(json.get("SWLPC").is_none(), "absent SWLPC is not serialised");
    }
}
