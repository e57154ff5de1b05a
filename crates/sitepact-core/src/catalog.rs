//! # Trade Catalog
//!
//! The fixed catalog of trade categories a service can be created under.
//! One enum, matched exhaustively everywhere — adding a category forces
//! every consumer to handle it at compile time, and there is no
//! out-of-range integer lookup anywhere in the engine.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EscrowError;

/// The trade categories offered on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeCategory {
    /// Garden and landscape maintenance.
    Gardening,
    /// Water supply and drainage work.
    Plumbing,
    /// Electrical installation and repair.
    Electrical,
    /// General construction and structural work.
    Construction,
    /// Interior and exterior painting.
    Painting,
    /// Carpentry and joinery.
    Carpentry,
    /// Roof installation and repair.
    Roofing,
    /// Residential and commercial cleaning.
    Cleaning,
    /// Heating, ventilation, and air conditioning.
    Hvac,
    /// Locks and access hardware.
    Locksmith,
    /// Brick, block, and stone work.
    Masonry,
    /// Floor installation and finishing.
    Flooring,
    /// Household appliance repair.
    ApplianceRepair,
    /// Pest inspection and treatment.
    PestControl,
    /// Metal fabrication and welding.
    Welding,
    /// Glazing and glass repair.
    GlassRepair,
}

impl TradeCategory {
    /// All trade categories as a slice, in catalog order.
    pub fn all() -> &'static [TradeCategory] {
        &[
            Self::Gardening,
            Self::Plumbing,
            Self::Electrical,
            Self::Construction,
            Self::Painting,
            Self::Carpentry,
            Self::Roofing,
            Self::Cleaning,
            Self::Hvac,
            Self::Locksmith,
            Self::Masonry,
            Self::Flooring,
            Self::ApplianceRepair,
            Self::PestControl,
            Self::Welding,
            Self::GlassRepair,
        ]
    }

    /// The canonical string identifier for serialization and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gardening => "gardening",
            Self::Plumbing => "plumbing",
            Self::Electrical => "electrical",
            Self::Construction => "construction",
            Self::Painting => "painting",
            Self::Carpentry => "carpentry",
            Self::Roofing => "roofing",
            Self::Cleaning => "cleaning",
            Self::Hvac => "hvac",
            Self::Locksmith => "locksmith",
            Self::Masonry => "masonry",
            Self::Flooring => "flooring",
            Self::ApplianceRepair => "appliance_repair",
            Self::PestControl => "pest_control",
            Self::Welding => "welding",
            Self::GlassRepair => "glass_repair",
        }
    }
}

impl std::fmt::Display for TradeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeCategory {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TradeCategory::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| EscrowError::UnknownTrade(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_sixteen_trades() {
        assert_eq!(TradeCategory::all().len(), 16);
    }

    #[test]
    fn as_str_roundtrips_through_from_str() {
        for trade in TradeCategory::all() {
            let parsed: TradeCategory = trade.as_str().parse().unwrap();
            assert_eq!(parsed, *trade);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("underwater_basket_weaving".parse::<TradeCategory>().is_err());
        assert!("".parse::<TradeCategory>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", TradeCategory::Hvac), "hvac");
        assert_eq!(
            format!("{}", TradeCategory::ApplianceRepair),
            "appliance_repair"
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&TradeCategory::GlassRepair).unwrap();
        assert_eq!(json, "\"glass_repair\"");
        let parsed: TradeCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TradeCategory::GlassRepair);
    }
}
