use studio_logger::{LevelFilter, Logger};

#[test]
fn console_only_init_needs_no_worker_guard() {
    let logger = Logger::builder()
        .name("studio-console")
        .level(LevelFilter::DEBUG)
        .init()
        .expect("console-only init");

    assert!(logger.guard().is_none(), "no file layer, no guard");

    tracing::debug!("console smoke record");
    logger.flush();
}
