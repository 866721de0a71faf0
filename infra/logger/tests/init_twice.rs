use studio_logger::{Logger, LoggerError};

#[test]
fn second_global_init_is_refused() {
    let _keep = Logger::builder().name("studio-primary").init().expect("first init wins");

    let err = Logger::builder().name("studio-usurper").init().expect_err("the global slot is taken");

    assert!(matches!(err, LoggerError::Subscriber { .. }));
}
