use std::io;
use std::sync::{Arc, Mutex};

use classdiff_config::MatchingConfig;
use classdiff_engine::diff_classes;
use classdiff_test_utils::{class, method, stmt};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedLogBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedLogBuffer {
    fn as_string(&self) -> String {
        let bytes = self.0.lock().expect("log buffer mutex poisoned");
        String::from_utf8_lossy(&bytes).to_string()
    }
}

struct SharedLogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self.0.lock().expect("log buffer mutex poisoned");
        out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter(self.0.clone())
    }
}

#[test]
fn confirmed_renames_are_logged_at_debug() {
    let before = class("a.Foo")
        .method(method("void bar(int x)").body(vec![stmt("helper();"), stmt("int y = x + 1;")]))
        .build();
    let after = class("a.Foo")
        .method(method("void baz(int x)").body(vec![stmt("helper();"), stmt("int y = x + 1;")]))
        .build();

    let logs = SharedLogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(logs.clone())
        .finish();

    let refactorings = tracing::subscriber::with_default(subscriber, || {
        let diff = diff_classes(&before, &after, &MatchingConfig::default()).unwrap();
        diff.refactorings().len()
    });

    assert_eq!(refactorings, 1);
    let text = logs.as_string();
    assert!(text.contains("operation renamed"), "{text}");
    assert!(text.contains("class=a.Foo"), "{text}");
}

#[test]
fn candidate_rejections_stay_below_debug() {
    let before = class("a.Foo")
        .method(method("void bar()").body(vec![stmt("first();")]))
        .build();
    let after = class("a.Foo")
        .method(method("void qux()").body(vec![stmt("int unrelated = 0;")]))
        .build();

    let logs = SharedLogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(logs.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        diff_classes(&before, &after, &MatchingConfig::default()).unwrap();
    });

    let text = logs.as_string();
    assert!(!text.contains("operation renamed"), "{text}");
    assert!(!text.contains("TRACE"), "{text}");
}
