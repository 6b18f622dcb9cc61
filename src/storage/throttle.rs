use chrono::{DateTime, Duration, Utc};

/// Rate limiter for durable writes with a pending slot of depth one.
///
/// A payload offered within `interval` of the last completed write is parked
/// instead of written; a newer offer replaces the parked one, so only the
/// latest state is ever written late.
#[derive(Debug, Clone)]
pub struct ThrottledWriter {
    interval: Duration,
    last_write: Option<DateTime<Utc>>,
    pending: Option<String>,
}

impl ThrottledWriter {
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval: Duration::from_std(interval).unwrap_or_else(|_| Duration::zero()),
            last_write: None,
            pending: None,
        }
    }

    /// Returns the payload back when it may be written right now; otherwise
    /// parks it and returns `None`.
    pub fn offer(&mut self, payload: String, now: DateTime<Utc>) -> Option<String> {
        if self.is_open(now) {
            self.pending = None;
            Some(payload)
        } else {
            self.pending = Some(payload);
            None
        }
    }

    /// Takes the parked payload once the interval has elapsed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<String> {
        if self.is_open(now) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Takes the parked payload regardless of timing.
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }

    /// Parks `payload` again after a failed write unless something newer
    /// has been offered meanwhile.
    pub fn requeue(&mut self, payload: String) {
        if self.pending.is_none() {
            self.pending = Some(payload);
        }
    }

    pub fn mark_written(&mut self, at: DateTime<Utc>) {
        self.last_write = Some(at);
    }

    pub fn discard_pending(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.last_write
            .map_or(true, |last| now - last >= self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn first_offer_passes_through() {
        let mut writer = ThrottledWriter::new(std::time::Duration::from_millis(100));
        assert_eq!(writer.offer("a".into(), t0()), Some("a".into()));
        assert!(!writer.has_pending());
    }

    #[test]
    fn rapid_offers_keep_only_the_latest() {
        let mut writer = ThrottledWriter::new(std::time::Duration::from_millis(100));
        writer.mark_written(t0());
        assert_eq!(writer.offer("b".into(), t0() + Duration::milliseconds(10)), None);
        assert_eq!(writer.offer("c".into(), t0() + Duration::milliseconds(20)), None);
        assert_eq!(writer.take_due(t0() + Duration::milliseconds(50)), None);
        assert_eq!(
            writer.take_due(t0() + Duration::milliseconds(100)),
            Some("c".into())
        );
        assert!(!writer.has_pending());
    }

    #[test]
    fn requeue_does_not_clobber_newer_payload() {
        let mut writer = ThrottledWriter::new(std::time::Duration::from_millis(100));
        writer.mark_written(t0());
        writer.offer("new".into(), t0());
        writer.requeue("old".into());
        assert_eq!(writer.take_pending(), Some("new".into()));
        writer.requeue("old".into());
        assert_eq!(writer.take_pending(), Some("old".into()));
    }
}
