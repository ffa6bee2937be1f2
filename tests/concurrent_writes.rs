// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use plainlog::Error;
use plainlog::Sink;
use plainlog::append::SinkId;
use plainlog::append::Testing;
use plainlog::config::Config;
use plainlog::format::Value;
use plainlog::record::Level;
use rand::Rng;
use rand::distr::Alphanumeric;

const THREADS: usize = 8;
const RECORDS: usize = 200;

#[test]
fn concurrent_records_stay_whole() {
    let sink = Testing::default();
    let logger = Arc::new(
        plainlog::builder()
            .config(Config::default())
            .sink(sink.clone())
            .build(),
    );

    let handles = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            std::thread::Builder::new()
                .name(format!("worker-{t}"))
                .spawn(move || {
                    let mut rng = rand::rng();
                    for r in 0..RECORDS {
                        let len = rng.random_range(1..256);
                        let payload: String = (&mut rng)
                            .sample_iter(Alphanumeric)
                            .take(len)
                            .map(char::from)
                            .collect();
                        logger.info(
                            "bench",
                            "{}:{}:{}:{}",
                            &[
                                Value::from(t),
                                Value::from(r),
                                Value::from(len),
                                Value::from(payload),
                            ],
                        );
                    }
                })
                .unwrap()
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), THREADS * RECORDS);

    let mut seen = HashSet::new();
    for line in lines {
        let (prefix, message) = line.split_once(" - ").unwrap();
        let (thread, _) = prefix
            .strip_prefix("INFO [worker-")
            .and_then(|rest| rest.split_once("] "))
            .unwrap();

        let fields = message.splitn(4, ':').collect::<Vec<_>>();
        assert_eq!(fields.len(), 4, "{line}");
        assert_eq!(fields[0], thread);
        let len: usize = fields[2].parse().unwrap();
        assert_eq!(fields[3].len(), len, "{line}");
        assert!(seen.insert((fields[0].to_string(), fields[1].to_string())));
    }
    assert_eq!(seen.len(), THREADS * RECORDS);
}

/// A sink that writes each record in two halves and notices when writers overlap.
#[derive(Debug, Clone, Default)]
struct SlowSink {
    busy: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Sink for SlowSink {
    fn id(&self) -> SinkId {
        SinkId::Address(Arc::as_ptr(&self.busy) as usize)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        self.buffer.lock().unwrap().extend_from_slice(head);
        std::thread::sleep(Duration::from_micros(50));
        self.buffer.lock().unwrap().extend_from_slice(tail);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.busy.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn levels_sharing_a_sink_share_its_lock() {
    let sink = SlowSink::default();
    let logger = Arc::new(
        plainlog::builder()
            .config(Config::default().show_thread_name(false))
            .sink(sink.clone())
            .route(Level::Warn, sink.clone())
            .route(Level::Error, sink.clone())
            .build(),
    );
    assert!(
        logger
            .routes()
            .sink(Level::Info)
            .ptr_eq(logger.routes().sink(Level::Error))
    );

    let handles = Level::ALL
        .into_iter()
        .map(|level| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    logger.log("slow", level, Some("record {}"), &[Value::from(i)]);
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sink.overlaps.load(Ordering::SeqCst), 0);
    let text = String::from_utf8(sink.buffer.lock().unwrap().clone()).unwrap();
    assert_eq!(text.lines().count(), Level::ALL.len() * 50);
    for line in text.lines() {
        let (_, message) = line.split_once(" slow - ").unwrap();
        assert!(message.starts_with("record "), "{line}");
    }
}
