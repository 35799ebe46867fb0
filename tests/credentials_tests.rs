use std::{fs, path::PathBuf};

use base64::prelude::*;
use labsend::credentials::{
    Credential, CredentialError, CredentialProvider, EnvCredentialProvider, FileCredentialStore,
    Provider, resolve,
};
use secrecy::ExposeSecret;
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("labsend-credentials-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

#[test]
fn providers_parse_presets_and_custom_servers() {
    assert_eq!("gmail".parse::<Provider>().unwrap(), Provider::Gmail);
    assert_eq!("Outlook".parse::<Provider>().unwrap(), Provider::Outlook);
    assert_eq!(
        "mail.example.com:2525".parse::<Provider>().unwrap(),
        Provider::Custom {
            host: "mail.example.com".to_string(),
            port: 2525,
        }
    );
    assert_eq!("mail.example.com".parse::<Provider>().unwrap().port(), 587);
    assert_eq!(Provider::Gmail.to_string(), "smtp.gmail.com:587");
    assert!(matches!(
        ":2525".parse::<Provider>(),
        Err(CredentialError::UnknownProvider(_))
    ));
    assert!(matches!("  ".parse::<Provider>(), Err(CredentialError::UnknownProvider(_))));
    assert!("mail.example.com:port".parse::<Provider>().is_err());
}

#[test]
fn providers_accept_hosts_without_a_domain() {
    assert_eq!(
        "localhost:1025".parse::<Provider>().unwrap(),
        Provider::Custom {
            host: "localhost".to_string(),
            port: 1025,
        }
    );
    assert_eq!(
        "relay".parse::<Provider>().unwrap(),
        Provider::Custom {
            host: "relay".to_string(),
            port: 587,
        }
    );
}

#[test]
fn file_store_round_trips_and_encodes_the_secret() {
    let root = temp_root();
    let store = FileCredentialStore::new(root.join("nested").join("creds.json"));
    assert!(store.load().unwrap().is_none());

    let credential = Credential::new(Provider::Gmail, "grader@example.com", "app-password");
    store.save(&credential).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(!raw.contains("app-password"));
    assert!(raw.contains(&BASE64_STANDARD.encode("app-password")));
    assert!(raw.contains("smtp.gmail.com"));

    let loaded = store.load().unwrap().expect("stored credential");
    assert_eq!(loaded.provider, Provider::Gmail);
    assert_eq!(loaded.address, "grader@example.com");
    assert_eq!(loaded.secret.expose_secret(), "app-password");

    let _ = fs::remove_dir_all(root);
}

#[cfg(unix)]
#[test]
fn file_store_is_private_to_the_owner() {
    use std::os::unix::fs::PermissionsExt;

    let root = temp_root();
    let store = FileCredentialStore::new(root.join("creds.json"));
    store
        .save(&Credential::new(Provider::Outlook, "a@example.com", "secret"))
        .unwrap();
    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn clear_reports_whether_anything_was_removed() {
    let root = temp_root();
    let store = FileCredentialStore::new(root.join("creds.json"));
    store
        .save(&Credential::new(Provider::Gmail, "a@example.com", "secret"))
        .unwrap();

    assert!(store.clear().unwrap());
    assert!(!store.clear().unwrap());
    assert!(store.load().unwrap().is_none());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn malformed_file_is_an_error() {
    let root = temp_root();
    let path = root.join("creds.json");
    fs::write(&path, "not json").unwrap();
    let store = FileCredentialStore::new(&path);
    assert!(matches!(store.load(), Err(CredentialError::Malformed { .. })));

    fs::write(
        &path,
        r#"{"smtp_server":"smtp.gmail.com","smtp_port":587,"email":"a@example.com","password":"%%%"}"#,
    )
    .unwrap();
    assert!(matches!(store.load(), Err(CredentialError::Decode)));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn resolve_takes_the_first_provider_with_a_credential() {
    let root = temp_root();
    let empty = FileCredentialStore::new(root.join("empty.json"));
    let filled = FileCredentialStore::new(root.join("filled.json"));
    filled
        .save(&Credential::new(
            "smtp.example.com:465".parse().unwrap(),
            "b@example.com",
            "secret",
        ))
        .unwrap();

    let providers: [&dyn CredentialProvider; 2] = [&empty, &filled];
    let found = resolve(&providers).unwrap().expect("credential");
    assert_eq!(found.address, "b@example.com");
    assert_eq!(found.provider.port(), 465);

    let none: [&dyn CredentialProvider; 1] = [&empty];
    assert!(resolve(&none).unwrap().is_none());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn env_provider_is_read_only() {
    let env = EnvCredentialProvider;
    let credential = Credential::new(Provider::Gmail, "a@example.com", "secret");
    assert!(matches!(env.save(&credential), Err(CredentialError::ReadOnly)));
    assert!(matches!(env.clear(), Err(CredentialError::ReadOnly)));
}
