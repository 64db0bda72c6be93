use db_service::SettingsStore;
use integration_tests::MemorySettings;
use shared_lib::structs::Credentials;
use web_service::seed_credentials;

#[tokio::test]
async fn empty_store_takes_environment_values() {
    let store = MemorySettings::new(Credentials::default());

    let seeded = seed_credentials(&store, Some("xkeysib-env".to_string()), Some("9".to_string()))
        .await
        .unwrap();

    assert!(seeded);
    assert_eq!(
        store.get_credentials().await,
        Credentials::new("xkeysib-env", "9")
    );
}

#[tokio::test]
async fn partial_environment_values_are_stored() {
    let store = MemorySettings::new(Credentials::default());

    let seeded = seed_credentials(&store, None, Some("9".to_string()))
        .await
        .unwrap();

    assert!(seeded);
    assert_eq!(store.get_credentials().await, Credentials::new("", "9"));
}

#[tokio::test]
async fn saved_settings_are_never_overwritten() {
    for saved in [
        Credentials::new("xkeysib-saved", "3"),
        Credentials::new("xkeysib-saved", ""),
        Credentials::new("", "3"),
    ] {
        let store = MemorySettings::new(saved.clone());

        let seeded = seed_credentials(&store, Some("xkeysib-env".to_string()), Some("9".to_string()))
            .await
            .unwrap();

        assert!(!seeded);
        assert_eq!(store.get_credentials().await, saved);
    }
}

#[tokio::test]
async fn nothing_is_written_without_environment_values() {
    for (api_key, list_id) in [(None, None), (Some(String::new()), Some(String::new()))] {
        let store = MemorySettings::new(Credentials::default());

        let seeded = seed_credentials(&store, api_key, list_id).await.unwrap();

        assert!(!seeded);
        assert_eq!(store.get_credentials().await, Credentials::default());
    }
}
