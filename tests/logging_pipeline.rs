//! End-to-end tests: every entry point lands in the same sinks.

use std::sync::Arc;

use onebot_gateway::capture_println;
use onebot_gateway::logging::{Bootstrap, Format, Level, Sink};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

mod common;
use common::{logging_config, read_log, SharedBuffer};

#[test]
fn test_all_origins_share_one_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let console = SharedBuffer::default();
    let config = logging_config(dir.path(), "DEBUG", false);
    let context = Bootstrap::new(&config)
        .console_writer(console.clone())
        .without_legacy_handler()
        .run()
        .unwrap();

    context.logger().info("direct call");
    let subscriber = Registry::default().with(context.tracing_layer());
    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(target: "gateway::http", "from tracing");
        tracing::trace!("too verbose");
    });
    let stdout = context.capture();
    capture_println!(stdout, "printed\n\nagain");

    let expected = vec![
        "[INFO | tests::logging_pipeline] direct call",
        "[WARNING | gateway::http] from tracing",
        "[INFO | tests::logging_pipeline] printed",
        "[INFO | tests::logging_pipeline] again",
    ];
    for output in [console.contents(), read_log(dir.path(), false)] {
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), expected.len(), "{output}");
        for (line, tail) in lines.iter().zip(&expected) {
            assert!(line.ends_with(tail), "{line:?} should end with {tail:?}");
        }
    }
}

#[test]
fn test_debug_mode_records_everything_in_diagnostic_file() {
    let dir = tempfile::tempdir().unwrap();
    let console = SharedBuffer::default();
    let config = logging_config(dir.path(), "WARNING", true);
    let context = Bootstrap::new(&config)
        .console_writer(console.clone())
        .without_legacy_handler()
        .run()
        .unwrap();

    let line = line!() + 1;
    context.logger().trace("tiny detail");
    context.logger().error("big problem");

    let main = read_log(dir.path(), false);
    assert!(main.contains("Debug mode is enabled"));
    assert!(!main.contains("tiny detail"));
    assert!(main.contains("big problem"));

    let debug = read_log(dir.path(), true);
    assert_eq!(debug.lines().count(), 2);
    assert!(debug.contains(&format!("MOD(logging_pipeline);LINE({line});")));
    assert!(debug.contains("PROC:("));
    assert!(debug.contains("THREAD:("));
    assert!(!debug.contains("Debug mode is enabled"));
}

#[test]
fn test_custom_sink_receives_only_its_levels() {
    let dir = tempfile::tempdir().unwrap();
    let config = logging_config(dir.path(), "TRACE", false);
    let context = Bootstrap::new(&config)
        .console_writer(std::io::sink())
        .without_legacy_handler()
        .run()
        .unwrap();
    let alerts = SharedBuffer::default();
    context.add_sink(Sink::writer("alerts", alerts.clone(), Level::ERROR, Format::Standard));

    context.logger().warning("not yet");
    context.logger().critical("now");
    context.logger().log(Level::from_severity(45), "custom severity");

    assert_eq!(alerts.messages(), vec!["now".to_string(), "custom severity".to_string()]);
    assert!(alerts.contents().contains("[Level 45 | tests::logging_pipeline]"));
}

#[test]
fn test_concurrent_emitters_write_whole_lines() {
    let dir = tempfile::tempdir().unwrap();
    let config = logging_config(dir.path(), "INFO", false);
    let context = Bootstrap::new(&config)
        .console_writer(std::io::sink())
        .without_legacy_handler()
        .run()
        .unwrap();
    let logger = context.logger().clone();
    let capture = Arc::new(context.capture());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let logger = logger.clone();
            let capture = Arc::clone(&capture);
            std::thread::spawn(move || {
                for i in 0..100 {
                    if i % 2 == 0 {
                        logger.info(format!("worker-{worker} record-{i} end"));
                    } else {
                        capture.write(&format!("worker-{worker} record-{i} end\n"));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let contents = read_log(dir.path(), false);
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 400);
    assert!(lines.iter().all(|line| line.starts_with('[') && line.ends_with(" end")));
}
