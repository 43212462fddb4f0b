// Lateral barrier on one bank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levee {
    pub enabled: bool,
    pub station: f64,
    pub crest: f64,
}

impl Levee {
    pub fn new(station: f64, crest: f64) -> Self {
        Levee {
            enabled: true,
            station,
            crest,
        }
    }

    pub fn disabled() -> Self {
        Levee {
            enabled: false,
            station: f64::NAN,
            crest: f64::NAN,
        }
    }

    /// True while the levee holds water back at `stage`.
    pub fn is_untopped(&self, stage: f64) -> bool {
        self.enabled && self.station.is_finite() && self.crest.is_finite() && stage < self.crest
    }
}

impl Default for Levee {
    fn default() -> Self {
        Levee::disabled()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Levees {
    pub left: Levee,
    pub right: Levee,
}

/// Narrow `[domain_left, domain_right]` to the stations behind untopped levees.
///
/// Neither edge is moved past the opposite domain edge.
pub fn clip_domain(stage: f64, domain_left: f64, domain_right: f64, levees: &Levees) -> (f64, f64) {
    let mut left = domain_left;
    let mut right = domain_right;

    if levees.left.is_untopped(stage) {
        left = left.max(levees.left.station).min(domain_right);
    }
    if levees.right.is_untopped(stage) {
        right = right.min(levees.right.station).max(domain_left);
    }

    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untopped_levees_narrow_the_domain() {
        let levees = Levees {
            left: Levee::new(20.0, 105.0),
            right: Levee::new(80.0, 104.0),
        };
        assert_eq!(clip_domain(103.0, 0.0, 100.0, &levees), (20.0, 80.0));
        // right levee overtopped at its crest
        assert_eq!(clip_domain(104.0, 0.0, 100.0, &levees), (20.0, 100.0));
        assert_eq!(clip_domain(106.0, 0.0, 100.0, &levees), (0.0, 100.0));
    }

    #[test]
    fn disabled_levee_has_no_effect() {
        let levees = Levees {
            left: Levee {
                enabled: false,
                station: 20.0,
                crest: 105.0,
            },
            right: Levee::disabled(),
        };
        assert_eq!(clip_domain(100.0, 0.0, 100.0, &levees), (0.0, 100.0));
    }

    #[test]
    fn levee_never_crosses_the_opposite_edge() {
        let levees = Levees {
            left: Levee::new(150.0, 10.0),
            right: Levee::new(-50.0, 10.0),
        };
        assert_eq!(clip_domain(5.0, 0.0, 100.0, &levees), (100.0, 0.0));
    }

    #[test]
    fn levee_outside_domain_keeps_domain_edge() {
        let levees = Levees {
            left: Levee::new(-10.0, 10.0),
            right: Levee::disabled(),
        };
        assert_eq!(clip_domain(5.0, 0.0, 100.0, &levees), (0.0, 100.0));
    }
}
