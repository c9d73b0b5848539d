use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use sbox_domain::config::AppConfig;
use sbox_server::Server;
use tower::ServiceExt;

async fn server(tmp: &tempfile::TempDir) -> Server {
    let mut cfg = AppConfig::default();
    cfg.storage.static_dir = tmp.path().to_path_buf();
    cfg.upload.max_file_size = 1024;

    Server::builder()
        .config(cfg)
        .port(0)
        .pictures_dir(tmp.path().join("nested").join("pictures"))
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn build_creates_the_storage_root() {
    let tmp = tempfile::tempdir().unwrap();
    let server = server(&tmp).await;

    assert!(tmp.path().join("nested/pictures").is_dir());
    assert_eq!(server.state().config.upload.max_file_size, 1024);
    assert_eq!(server.state().storage.policy().max_file_size, 1024);
}

#[tokio::test]
async fn router_mounts_gallery_and_system_routes() {
    let tmp = tempfile::tempdir().unwrap();
    let server = server(&tmp).await;

    let res = server
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .router()
        .oneshot(Request::builder().uri("/api/images").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let names: Vec<String> =
        serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert!(names.is_empty());

    let res = server
        .router()
        .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_through_the_full_stack() {
    let tmp = tempfile::tempdir().unwrap();
    let server = server(&tmp).await;

    let body = "--b\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sky.webp\"\r\n\r\nRIFF\r\n--b--\r\n";
    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=b")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    assert_eq!(server.router().oneshot(req).await.unwrap().status(), StatusCode::OK);

    let res = server
        .router()
        .oneshot(Request::builder().uri("/pictures/sky.webp").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/webp");
    assert_eq!(to_bytes(res.into_body(), usize::MAX).await.unwrap().as_ref(), b"RIFF");
}
