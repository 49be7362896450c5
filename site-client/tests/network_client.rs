// site-client/tests/network_client.rs
// 集成测试 - 真实 site-server (随机端口) + reqwest 客户端

use std::sync::Arc;

use site_client::{
    ClientConfig, ClientError, FileCacheStore, ImageRef, MemoryNotifier, NetworkSettingsClient,
    PageKey, PublicContact, SETTINGS_CACHE_KEY, SettingsAccessor, SettingsEditor,
    SettingsError, SettingsStatus, SiteSettings, CacheStore,
};
use site_server::auth::password::hash_password;
use site_server::auth::{JwtConfig, JwtService};
use site_server::{Config, ServerState, SettingsStore, build_router};
use tempfile::TempDir;

const ADMIN_PASSWORD: &str = "integration-password";

struct TestEnv {
    base_url: String,
    _server_dir: TempDir,
    cache_dir: TempDir,
}

async fn start_server() -> TestEnv {
    let server_dir = TempDir::new().unwrap();

    let mut config = Config::with_overrides(server_dir.path().to_string_lossy(), 0);
    config.jwt = JwtConfig::with_secret("client-integration-secret-32-chars!!");
    config.admin.username = "admin".to_string();
    config.admin.password_hash = Some(hash_password(ADMIN_PASSWORD).unwrap());

    let store = SettingsStore::open(config.database_path()).unwrap();
    let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
    let app = build_router(ServerState::new(config, store, jwt));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestEnv {
        base_url: format!("http://{}", addr),
        _server_dir: server_dir,
        cache_dir: TempDir::new().unwrap(),
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(4, 4);
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn test_fetch_default_and_write_requires_login() {
    let env = start_server().await;
    let client = NetworkSettingsClient::new(&ClientConfig::new(&env.base_url)).unwrap();

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");

    let settings = site_client::SettingsService::get_config(&client).await.unwrap();
    assert_eq!(settings, SiteSettings::default());

    let err = site_client::SettingsService::replace_config(&client, &settings)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { code: 1001, .. }));

    let err = client.login("admin", "nope").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { code: 1002, .. }));
    assert!(client.token().is_none());
}

#[tokio::test]
async fn test_admin_flow_through_accessor() {
    let env = start_server().await;
    let config = ClientConfig::new(&env.base_url).with_cache_dir(env.cache_dir.path());

    // Back office: login, upload, save
    let (admin, admin_client) = site_client::connect(&config).unwrap();
    admin_client.login("admin", ADMIN_PASSWORD).await.unwrap();
    admin.refresh().await.unwrap();
    assert_eq!(admin.status(), SettingsStatus::Ready);

    let upload = admin_client
        .upload_image("hero.png", png_bytes())
        .await
        .unwrap();
    assert!(upload.path.starts_with("/uploads/"));

    let editor = SettingsEditor::new(admin.clone());
    editor.set_phone("+62 811").await.unwrap();
    editor
        .set_hero_image(PageKey::Home, ImageRef::classify(&upload.path))
        .await
        .unwrap();

    // Public visitor with its own cache directory
    let visitor_cache = TempDir::new().unwrap();
    let visitor_client = Arc::new(NetworkSettingsClient::new(&config).unwrap());
    let visitor = SettingsAccessor::new(
        visitor_client,
        FileCacheStore::new(visitor_cache.path()),
    );
    assert_eq!(visitor.status(), SettingsStatus::Uninitialized);
    visitor.refresh().await.unwrap();

    let settings = visitor.current();
    assert_eq!(PublicContact::from(&settings).phone, "+62 811");

    let hero = site_client::consumer::hero_image_url(
        &settings,
        PageKey::Home,
        &config.asset_resolver(),
    );
    assert_eq!(hero, format!("{}{}", env.base_url, upload.path));

    let image = reqwest::get(&hero).await.unwrap();
    assert_eq!(image.status(), reqwest::StatusCode::OK);
    assert_eq!(image.bytes().await.unwrap().as_ref(), png_bytes().as_slice());

    // Visitor cache is now warm: a new accessor starts with real content
    let cached = FileCacheStore::new(visitor_cache.path());
    assert!(cached.load(SETTINGS_CACHE_KEY).unwrap().is_some());
    let warm = SettingsAccessor::new(
        Arc::new(NetworkSettingsClient::new(&config).unwrap()),
        cached,
    );
    assert!(warm.view().from_cache);
    assert_eq!(warm.current(), settings);
}

#[tokio::test]
async fn test_rejected_write_rolls_back() {
    let env = start_server().await;
    let config = ClientConfig::new(&env.base_url).with_cache_dir(env.cache_dir.path());

    let client = Arc::new(NetworkSettingsClient::new(&config).unwrap());
    client.login("admin", ADMIN_PASSWORD).await.unwrap();

    let notifier = Arc::new(MemoryNotifier::new());
    let accessor = SettingsAccessor::with_notifier(
        client.clone(),
        FileCacheStore::new(env.cache_dir.path()),
        notifier.clone(),
    );
    accessor.refresh().await.unwrap();
    let before = accessor.current();

    // Server refuses references it cannot serve
    let mut invalid = before.clone();
    invalid.logo = ImageRef::classify("images/logo.png");
    let err = accessor.update(invalid).await.unwrap_err();

    match err {
        SettingsError::WriteFailed(ClientError::Api { code, .. }) => assert_eq!(code, 4002),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(accessor.current(), before);
    assert_eq!(notifier.error_count(), 1);

    // Expired session behaves the same way
    client.logout();
    let mut changed = before.clone();
    changed.contact.phone = Some("+62 822".into());
    assert!(accessor.update(changed).await.is_err());
    assert_eq!(accessor.current(), before);
}
