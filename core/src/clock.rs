use chrono::{Local, NaiveDateTime};

/// Source of the timestamps stamped onto generated lines.
pub trait Clock {
	fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> NaiveDateTime {
		Local::now().naive_local()
	}
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
	fn now(&self) -> NaiveDateTime {
		self.0
	}
}

impl<C: Clock + ?Sized> Clock for &C {
	fn now(&self) -> NaiveDateTime {
		(**self).now()
	}
}
