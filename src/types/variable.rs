use crate::types::field_set::FieldSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A daily-record field addressed by name.
///
/// Covers both observed variables (correction targets) and derived ones
/// (`Rso`, `Eto`, `Etr`), which are recomputed rather than corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variable {
    TMax,
    TMin,
    TAvg,
    TDew,
    Ea,
    RhMax,
    RhMin,
    RhAvg,
    Rs,
    Rso,
    Ws,
    Precip,
    Eto,
    Etr,
}

impl Variable {
    /// The `FieldSet` flag for this variable.
    pub fn flag(self) -> FieldSet {
        match self {
            Variable::TMax => FieldSet::TMAX,
            Variable::TMin => FieldSet::TMIN,
            Variable::TAvg => FieldSet::TAVG,
            Variable::TDew => FieldSet::TDEW,
            Variable::Ea => FieldSet::EA,
            Variable::RhMax => FieldSet::RHMAX,
            Variable::RhMin => FieldSet::RHMIN,
            Variable::RhAvg => FieldSet::RHAVG,
            Variable::Rs => FieldSet::RS,
            Variable::Rso => FieldSet::RSO,
            Variable::Ws => FieldSet::WS,
            Variable::Precip => FieldSet::PRECIP,
            Variable::Eto => FieldSet::ETO,
            Variable::Etr => FieldSet::ETR,
        }
    }

    /// Variables an operator may select for correction. Derived fields are
    /// recomputed by the session instead.
    pub fn is_correctable(self) -> bool {
        !matches!(self, Variable::Rso | Variable::Eto | Variable::Etr)
    }

    /// Temperature group: edits here invalidate delta-t and the dew-point
    /// depression climatology.
    pub fn is_temperature(self) -> bool {
        matches!(
            self,
            Variable::TMax | Variable::TMin | Variable::TAvg | Variable::TDew
        )
    }

    /// Humidity group: edits here invalidate the vapor-pressure cascade.
    pub fn is_humidity(self) -> bool {
        matches!(
            self,
            Variable::TDew | Variable::Ea | Variable::RhMax | Variable::RhMin | Variable::RhAvg
        )
    }

    pub fn is_radiation(self) -> bool {
        matches!(self, Variable::Rs | Variable::Rso)
    }

    /// Short column code, matching the ingestion layer's naming.
    pub fn code(self) -> &'static str {
        match self {
            Variable::TMax => "tmax",
            Variable::TMin => "tmin",
            Variable::TAvg => "tavg",
            Variable::TDew => "tdew",
            Variable::Ea => "ea",
            Variable::RhMax => "rhmax",
            Variable::RhMin => "rhmin",
            Variable::RhAvg => "rhavg",
            Variable::Rs => "rs",
            Variable::Rso => "rso",
            Variable::Ws => "ws",
            Variable::Precip => "precip",
            Variable::Eto => "eto",
            Variable::Etr => "etr",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
