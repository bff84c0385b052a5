use chrono::{DateTime, Utc};

///
/// Where verdict timestamps come from. Tests pin it so evaluated_on is predictable.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeProvider {
    System,
    Fixed(DateTime<Utc>),
}

impl Default for TimeProvider {
    fn default() -> Self {
        TimeProvider::System
    }
}

impl TimeProvider {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            TimeProvider::System       => Utc::now(),
            TimeProvider::Fixed(fixed) => *fixed,
        }
    }

    ///
    /// Pin the clock, or pass None to return to the system clock.
    ///
    pub fn fix(&mut self, fixed: Option<DateTime<Utc>>) {
        *self = fixed.map_or(TimeProvider::System, TimeProvider::Fixed);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_and_released() {
        let pinned = Utc::now() - chrono::Duration::days(365);
        let mut clock = TimeProvider::default();

        clock.fix(Some(pinned));
        assert_eq!(clock.now(), pinned);

        clock.fix(None);
        assert_eq!(clock, TimeProvider::System);
        assert!(clock.now() > pinned);
    }
}
