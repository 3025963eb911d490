use std::io::{Error, ErrorKind, Result};
use std::sync::mpsc;
use std::thread;

pub trait CallFinish: Sync + Send + 'static {
    type CallType;
    type ReturnType;
    fn call(&mut self, f: Self::CallType);
    fn finish(&mut self) -> Result<Self::ReturnType>;
}

fn call_all<T: Send + 'static, U: Send + 'static>(
    recv: mpsc::Receiver<T>,
    mut cf: Box<impl CallFinish<CallType = T, ReturnType = U>>,
) -> Result<U> {
    for m in recv.iter() {
        cf.call(m);
    }

    cf.finish()
}

/// Runs the wrapped CallFinish on its own thread: call() hands the value
/// over a bounded channel, finish() joins and returns the inner result.
pub struct Callback<T, U> {
    send: Option<mpsc::SyncSender<T>>,
    result: Option<thread::JoinHandle<Result<U>>>,
}

impl<T, U> Callback<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    pub fn new(cf: Box<impl CallFinish<CallType = T, ReturnType = U>>) -> Callback<T, U> {
        let (send, recv) = mpsc::sync_channel(1);

        let result = thread::spawn(move || call_all(recv, cf));

        Callback {
            send: Some(send),
            result: Some(result),
        }
    }
}

impl<T, U> CallFinish for Callback<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    type CallType = T;
    type ReturnType = U;

    fn call(&mut self, t: T) {
        match &self.send {
            Some(s) => {
                s.send(t).expect("failed to send");
            }
            _ => {}
        }
    }

    fn finish(&mut self) -> Result<U> {
        self.send = None;

        let r = std::mem::replace(&mut self.result, None);

        match r {
            Some(r) => match r.join() {
                Ok(p) => p,
                Err(e) => Err(Error::new(
                    ErrorKind::Other,
                    format!("failed to join {:?}", e),
                )),
            },
            None => Err(Error::new(ErrorKind::Other, "already called finish")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Summer {
        total: i64,
    }
    impl CallFinish for Summer {
        type CallType = i64;
        type ReturnType = i64;
        fn call(&mut self, v: i64) {
            self.total += v;
        }
        fn finish(&mut self) -> Result<i64> {
            Ok(self.total)
        }
    }

    #[test]
    fn test_callback_runs_on_thread() {
        let mut cb = Callback::new(Box::new(Summer { total: 0 }));
        for i in 1..=10 {
            cb.call(i);
        }
        assert_eq!(cb.finish().unwrap(), 55);
    }

    #[test]
    fn test_finish_twice_is_error() {
        let mut cb = Callback::new(Box::new(Summer { total: 0 }));
        cb.call(3);
        assert_eq!(cb.finish().unwrap(), 3);
        assert!(cb.finish().is_err());
    }
}
