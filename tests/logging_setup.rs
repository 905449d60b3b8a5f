use my_package::config::{CoreSettings, Environment};
use my_package::logging::{LogSource, setup_logging};
use std::fs;
use std::path::Path;
use std::time::Duration;

fn write_dev_config(root: &Path) {
    let dir = root.join("config/logger/logging-conf");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(
        dir.join("logging-dev.conf"),
        r#"
        [root]
        level = "info"

        [[handlers]]
        kind = "file"
        directory = "logs"
        prefix = "integration"
        rotation = "never"
        "#,
    )
    .expect("write config");
}

#[test]
fn file_config_installs_and_writes_log_file() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    write_dev_config(root.path());
    let core = CoreSettings {
        environment: Environment::Development,
        root_path: Some(root.path().to_path_buf()),
    };

    let logging = setup_logging(&core);
    assert!(matches!(logging.source(), LogSource::File { .. }));

    tracing::info!("hello from integration test");
    // Third-party targets are forced to warn.
    tracing::info!(target: "reqwest", "suppressed");

    // A second setup must not panic even though a subscriber is installed.
    let again = setup_logging(&core);
    assert!(matches!(again.source(), LogSource::File { .. }));
    drop(again);

    std::thread::sleep(Duration::from_millis(30));
    drop(logging);

    let log_file = fs::read_dir(root.path().join("logs"))?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    assert!(contents.contains("hello from integration test"), "{contents}");
    assert!(!contents.contains("suppressed"), "{contents}");
    Ok(())
}
