use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{Level, LevelFilter, Metadata, Record};
use sentry_transport::{Event, SendOutcome, Transport, TransportOptions};

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn test_background_failure_is_logged_not_raised() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Debug);

    // nothing can listen on port 1; the connection is refused in the
    // background after the caller already returned
    let transport = Transport::new();
    transport
        .configure(TransportOptions {
            dsn: "http://public@127.0.0.1:1/1".parse().ok(),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(transport.send(Event::new()).unwrap(), SendOutcome::Sent);

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        {
            let records = LOGGER.records.lock().unwrap();
            if records.iter().any(|(level, message)| {
                *level == Level::Error && message.contains("failed to send envelope")
            }) {
                break;
            }
        }
        assert!(
            Instant::now() < deadline,
            "no error record for the failed send"
        );
        std::thread::sleep(Duration::from_millis(50));
    }
}
