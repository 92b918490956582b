use bitflags::bitflags;

bitflags! {
    /// Flags identifying a set of daily-record fields.
    ///
    /// Used in two places: at series level to record which variables the
    /// ingestion layer actually provided, and per day to mark which fields
    /// hold derived or imputed values rather than observations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldSet: u16 {
        const TMAX   = 1 << 0;
        const TMIN   = 1 << 1;
        const TAVG   = 1 << 2;
        const TDEW   = 1 << 3;
        const EA     = 1 << 4;
        const RHMAX  = 1 << 5;
        const RHMIN  = 1 << 6;
        const RHAVG  = 1 << 7;
        const RS     = 1 << 8;
        const RSO    = 1 << 9;
        const WS     = 1 << 10;
        const PRECIP = 1 << 11;
        const ETO    = 1 << 12;
        const ETR    = 1 << 13;

        /// Both relative-humidity extremes.
        const RH_EXTREMES = Self::RHMAX.bits() | Self::RHMIN.bits();

        /// No fields.
        const NONE = 0;
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        FieldSet::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rh_extremes_is_both_flags() {
        let set = FieldSet::RH_EXTREMES;
        assert!(set.contains(FieldSet::RHMAX));
        assert!(set.contains(FieldSet::RHMIN));
        assert!(!set.contains(FieldSet::RHAVG));
    }

    #[test]
    fn default_is_empty() {
        assert!(FieldSet::default().is_empty());
    }
}
