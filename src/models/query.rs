use crate::error::{Error, Result};

/// Inclusive epoch range, bucket width and the sensors to include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementsQuery {
    pub start_epoch: i64,

    pub end_epoch: i64,

    /// Bucket width in seconds.
    pub resolution: i64,

    pub sensor_ids: Vec<String>,
}

impl MeasurementsQuery {
    pub fn validate(&self) -> Result<()> {
        if self.resolution <= 0 {
            return Err(Error::invalid_argument(format!(
                "invalid resolution: {}, must be greater than 0",
                self.resolution
            )));
        }

        if self.start_epoch > self.end_epoch {
            return Err(Error::invalid_argument(format!(
                "invalid range: from {} is after to {}",
                self.start_epoch, self.end_epoch
            )));
        }

        if self.sensor_ids.is_empty() {
            return Err(Error::invalid_argument("at least one sensor id is required"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventsQuery {
    pub start_epoch: i64,

    pub end_epoch: i64,
}

impl EventsQuery {
    pub fn validate(&self) -> Result<()> {
        if self.start_epoch > self.end_epoch {
            return Err(Error::invalid_argument(format!(
                "invalid range: from {} is after to {}",
                self.start_epoch, self.end_epoch
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start_epoch: i64, end_epoch: i64, resolution: i64) -> MeasurementsQuery {
        MeasurementsQuery {
            start_epoch,
            end_epoch,
            resolution,
            sensor_ids: vec!["bedroom".to_string()],
        }
    }

    #[test]
    fn accepts_single_instant_range() {
        assert!(query(100, 100, 60).validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_resolution() {
        assert!(matches!(
            query(0, 100, 0).validate(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            query(0, 100, -60).validate(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            query(200, 100, 60).validate(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_empty_sensor_ids() {
        let mut q = query(0, 100, 60);
        q.sensor_ids.clear();
        assert!(matches!(q.validate(), Err(Error::InvalidArgument(_))));
    }
}
