use crate::types::field_set::FieldSet;
use crate::types::variable::Variable;
use chrono::NaiveDate;

/// One calendar day of station observations and derived quantities.
///
/// Every field is optional; a `None` is a missing observation, never a
/// sentinel value. `filled` marks which of the present fields were derived
/// or statistically imputed rather than observed.
#[derive(Debug, PartialEq, Clone)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub tmax: Option<f64>,   // maximum air temperature (C)
    pub tmin: Option<f64>,   // minimum air temperature (C)
    pub tavg: Option<f64>,   // average air temperature (C)
    pub tdew: Option<f64>,   // dew point temperature (C)
    pub ea: Option<f64>,     // actual vapor pressure (kPa)
    pub rhmax: Option<f64>,  // maximum relative humidity (%)
    pub rhmin: Option<f64>,  // minimum relative humidity (%)
    pub rhavg: Option<f64>,  // average relative humidity (%)
    pub rs: Option<f64>,     // observed solar radiation (W/m2)
    pub rso: Option<f64>,    // clear-sky solar radiation (W/m2)
    pub ws: Option<f64>,     // wind speed (m/s)
    pub precip: Option<f64>, // precipitation (mm)
    pub eto: Option<f64>,    // grass reference ET (mm/day)
    pub etr: Option<f64>,    // alfalfa reference ET (mm/day)
    pub filled: FieldSet,
}

impl DailyRecord {
    /// An all-missing placeholder for `date`, used when reindexing calendar
    /// gaps.
    pub fn empty(date: NaiveDate) -> Self {
        DailyRecord {
            date,
            tmax: None,
            tmin: None,
            tavg: None,
            tdew: None,
            ea: None,
            rhmax: None,
            rhmin: None,
            rhavg: None,
            rs: None,
            rso: None,
            ws: None,
            precip: None,
            eto: None,
            etr: None,
            filled: FieldSet::NONE,
        }
    }

    pub fn get(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::TMax => self.tmax,
            Variable::TMin => self.tmin,
            Variable::TAvg => self.tavg,
            Variable::TDew => self.tdew,
            Variable::Ea => self.ea,
            Variable::RhMax => self.rhmax,
            Variable::RhMin => self.rhmin,
            Variable::RhAvg => self.rhavg,
            Variable::Rs => self.rs,
            Variable::Rso => self.rso,
            Variable::Ws => self.ws,
            Variable::Precip => self.precip,
            Variable::Eto => self.eto,
            Variable::Etr => self.etr,
        }
    }

    /// Writes `value` and updates the fill marker: `filled = true` tags the
    /// value as derived/imputed, `filled = false` clears the tag (observed
    /// or corrected-observed data). A `None` value always clears the tag.
    pub fn set(&mut self, variable: Variable, value: Option<f64>, filled: bool) {
        let slot = match variable {
            Variable::TMax => &mut self.tmax,
            Variable::TMin => &mut self.tmin,
            Variable::TAvg => &mut self.tavg,
            Variable::TDew => &mut self.tdew,
            Variable::Ea => &mut self.ea,
            Variable::RhMax => &mut self.rhmax,
            Variable::RhMin => &mut self.rhmin,
            Variable::RhAvg => &mut self.rhavg,
            Variable::Rs => &mut self.rs,
            Variable::Rso => &mut self.rso,
            Variable::Ws => &mut self.ws,
            Variable::Precip => &mut self.precip,
            Variable::Eto => &mut self.eto,
            Variable::Etr => &mut self.etr,
        };
        *slot = value;
        if filled && value.is_some() {
            self.filled.insert(variable.flag());
        } else {
            self.filled.remove(variable.flag());
        }
    }

    /// Whether the value for `variable` is present and observed (not
    /// derived or imputed).
    pub fn is_observed(&self, variable: Variable) -> bool {
        self.get(variable).is_some() && !self.filled.contains(variable.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    #[test]
    fn set_and_get_roundtrip() {
        let mut rec = DailyRecord::empty(date());
        rec.set(Variable::TMax, Some(31.5), false);
        assert_eq!(rec.get(Variable::TMax), Some(31.5));
        assert!(rec.is_observed(Variable::TMax));
    }

    #[test]
    fn filled_marker_tracks_derivation() {
        let mut rec = DailyRecord::empty(date());
        rec.set(Variable::TDew, Some(12.0), true);
        assert!(rec.filled.contains(FieldSet::TDEW));
        assert!(!rec.is_observed(Variable::TDew));

        // overwriting with an observed value clears the marker
        rec.set(Variable::TDew, Some(11.0), false);
        assert!(!rec.filled.contains(FieldSet::TDEW));
    }

    #[test]
    fn nulling_clears_the_marker() {
        let mut rec = DailyRecord::empty(date());
        rec.set(Variable::Rs, Some(250.0), true);
        rec.set(Variable::Rs, None, true);
        assert_eq!(rec.rs, None);
        assert!(!rec.filled.contains(FieldSet::RS));
    }
}
