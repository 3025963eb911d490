use std::fmt;

fn as_secs(dur: std::time::Duration) -> f64 {
    (dur.as_secs() as f64) * 1.0 + (dur.subsec_nanos() as f64) * 0.000000001
}

pub struct Timer(std::time::SystemTime);

impl Timer {
    pub fn new() -> Timer {
        Timer(std::time::SystemTime::now())
    }

    pub fn since(&self) -> f64 {
        as_secs(self.0.elapsed().unwrap())
    }

    pub fn reset(&mut self) {
        self.0 = std::time::SystemTime::now();
    }
}

pub struct LogTimes {
    pub timer: Timer,
    pub msgs: Vec<(String, f64)>,
    pub longest: usize,
}
impl LogTimes {
    pub fn new() -> LogTimes {
        LogTimes {
            timer: Timer::new(),
            msgs: Vec::new(),
            longest: 6,
        }
    }
    pub fn add(&mut self, msg: &str) {
        self.longest = usize::max(self.longest, msg.len());
        self.msgs.push((String::from(msg), self.timer.since()));
        self.timer.reset();
    }
}
impl fmt::Display for LogTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tot = 0.0;
        for (a, b) in &self.msgs {
            write!(f, "{}:{}{:6.2}s\n", a, " ".repeat(self.longest - a.len()), b)?;
            tot += b;
        }
        write!(f, "TOTAL:{}{:6.2}s", " ".repeat(self.longest - 5), tot)
    }
}

pub struct ThreadTimer(cpu_time::ThreadTime);

impl ThreadTimer {
    pub fn new() -> ThreadTimer {
        ThreadTimer(cpu_time::ThreadTime::now())
    }

    pub fn since(&self) -> f64 {
        as_secs(self.0.elapsed())
    }
}

pub struct Checktime {
    st: Timer,
    lt: Timer,
    thres: f64,
}

impl Checktime {
    pub fn new() -> Checktime {
        Self::with_threshold(2.0)
    }
    pub fn with_threshold(thres: f64) -> Checktime {
        Checktime {
            st: Timer::new(),
            lt: Timer::new(),
            thres: thres,
        }
    }

    pub fn checktime(&mut self) -> Option<f64> {
        let lm = self.lt.since();
        if lm > self.thres {
            self.lt.reset();
            return Some(self.st.since());
        }

        None
    }
    pub fn gettime(&self) -> f64 {
        self.st.since()
    }
}

/// Per-stage timing report returned up a CallFinish chain, with
/// stage-specific extras carried in others.
pub struct Timings<T> {
    pub timings: Vec<(String, f64)>,
    pub others: Vec<(String, T)>,
}

impl<T> Timings<T> {
    pub fn new() -> Timings<T> {
        Timings {
            timings: Vec::new(),
            others: Vec::new(),
        }
    }

    pub fn add(&mut self, name: &str, tm: f64) {
        self.timings.push((String::from(name), tm));
    }

    pub fn add_other(&mut self, name: &str, other: T) {
        self.others.push((String::from(name), other));
    }
}

impl<T> fmt::Display for Timings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timings[")?;
        for (i, (name, tm)) in self.timings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:0.1}s", name, tm)?;
        }
        write!(f, "]")
    }
}

use chrono::NaiveDateTime;

const TIMEFORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn timestamp_string(ts: i64) -> String {
    let dt = NaiveDateTime::from_timestamp(ts, 0);
    dt.format(TIMEFORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_string() {
        assert_eq!(timestamp_string(1577836800), "2020-01-01T00:00:00");
        assert_eq!(timestamp_string(0), "1970-01-01T00:00:00");
    }

    #[test]
    fn test_timings_display() {
        let mut tms = Timings::<()>::new();
        tms.add("scan", 1.5);
        assert_eq!(format!("{}", tms), "Timings[scan: 1.5s]");
    }
}
