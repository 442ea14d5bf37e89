//! Startup configuration arriving after the bundled registry was installed

use kot_params::{Error, NetworkKind, ParamsConfig};

#[test]
fn test_late_data_dir_is_rejected() {
    // Any read of the active profile installs the bundled registry.
    assert_eq!(kot_params::active().kind, NetworkKind::Mainnet);

    let dir = tempfile::tempdir().unwrap();
    let hash = format!("0000{}", "cd".repeat(30));
    std::fs::write(
        dir.path().join("checkpoints_testnet.json"),
        format!(r#"{{"100": "{}"}}"#, hash),
    )
    .unwrap();

    let config = ParamsConfig {
        network: NetworkKind::Testnet,
        data_dir: Some(dir.path().to_path_buf()),
    };
    let err = kot_params::init(&config).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err}");
    assert!(err.to_string().contains("already initialized"));

    // Nothing was selected from the rejected configuration.
    assert_eq!(kot_params::active_kind(), NetworkKind::Mainnet);
    let testnet = kot_params::register_all().get(NetworkKind::Testnet);
    assert_eq!(testnet.max_checkpoint(), 0);

    // Without an override directory the call only selects.
    let config = ParamsConfig {
        network: NetworkKind::Testnet,
        data_dir: None,
    };
    kot_params::init(&config).unwrap();
    assert_eq!(kot_params::active_kind(), NetworkKind::Testnet);
}
