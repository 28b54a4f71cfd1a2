use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use softlens::imgproc::filter::Kernel2d;
use tokio::sync::Semaphore;

use crate::config::ServeConfig;
use crate::error::ServeError;
use crate::pipeline::{self, BlurSettings};

/// Name of the multipart part holding the uploaded image.
const IMAGE_PART: &str = "image";

/// Largest box kernel a request may ask for.
const MAX_KERNEL_SIZE: usize = 64;

/// Shared state of the request handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServeConfig>,
    permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: ServeConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency));
        Self {
            config: Arc::new(config),
            permits,
        }
    }
}

/// Optional per request overrides of the configured blur.
#[derive(Debug, Default, Deserialize)]
pub struct BlurQuery {
    kernel_size: Option<usize>,
    edge_policy: Option<String>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // the multipart envelope may carry more than the image itself
    let body_limit = state.config.max_file_size.saturating_mul(10);

    Router::new()
        .route("/", get(|| async { "Hello Mobile Developers" }))
        .route("/hello/:name", get(hello))
        .route("/simple", post(simple))
        .route("/raw", post(raw))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn hello(Path(name): Path<String>) -> String {
    format!("Hello: {name}")
}

async fn simple(body: Bytes) -> String {
    format!("Request body: {}", String::from_utf8_lossy(&body))
}

async fn raw() -> &'static [u8] {
    b"Writing to raw!"
}

fn blur_settings(config: &ServeConfig, query: &BlurQuery) -> Result<BlurSettings, ServeError> {
    let kernel = match query.kernel_size {
        Some(size) if size == 0 || size > MAX_KERNEL_SIZE => {
            return Err(ServeError::KernelTooLarge {
                size,
                max: MAX_KERNEL_SIZE,
            })
        }
        Some(size) => Kernel2d::box_blur(size)?,
        None => config.kernel.clone(),
    };

    let edge_policy = match &query.edge_policy {
        Some(edge_policy) => edge_policy.parse()?,
        None => config.edge_policy,
    };

    Ok(BlurSettings {
        kernel,
        edge_policy,
        max_pixels: config.max_pixels,
        jpeg_quality: config.jpeg_quality,
    })
}

/// Run `job` on the blocking pool once a permit is available.
///
/// The permit moves into the job, so it is only released when the job ends,
/// even if the request that started it has been dropped.
async fn run_blocking<F, R>(permits: &Arc<Semaphore>, job: F) -> Result<R, ServeError>
where
    F: FnOnce() -> Result<R, ServeError> + Send + 'static,
    R: Send + 'static,
{
    let permit = permits.clone().acquire_owned().await?;
    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        job()
    })
    .await?
}

async fn upload(
    State(state): State<AppState>,
    Query(query): Query<BlurQuery>,
    mut multipart: Multipart,
) -> Result<Response, ServeError> {
    log::info!("Request received, retrieving image");
    let settings = blur_settings(&state.config, &query)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_PART) {
            continue;
        }
        let file_name = field.file_name().unwrap_or(IMAGE_PART).to_string();
        upload = Some((file_name, field.bytes().await?));
        break;
    }

    let (file_name, bytes) = upload.ok_or(ServeError::MissingImage(IMAGE_PART))?;
    if bytes.len() > state.config.max_file_size {
        return Err(ServeError::FileTooLarge {
            size: bytes.len(),
            max: state.config.max_file_size,
        });
    }
    log::info!("File name = {file_name} ({} bytes)", bytes.len());

    // bound the number of images filtered at once, the filter itself never yields
    let jpeg_data =
        run_blocking(&state.permits, move || pipeline::blur_to_jpeg(&bytes, &settings)).await?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg_data).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use softlens::image::{Image, ImageSize};
    use softlens::imgproc::filter::EdgePolicy;
    use softlens::io::functional::{decode_image, encode_image_jpeg};
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "softlens-test-boundary";

    fn test_config(max_file_size: usize) -> ServeConfig {
        ServeConfig {
            port: 0,
            kernel: Kernel2d::box_blur(3).expect("valid kernel"),
            edge_policy: EdgePolicy::NoOp,
            max_file_size,
            max_pixels: 1_000_000,
            max_concurrency: 2,
            jpeg_quality: 90,
        }
    }

    fn test_router(max_file_size: usize) -> Router {
        router(AppState::new(test_config(max_file_size)))
    }

    fn test_jpeg() -> Vec<u8> {
        let size = ImageSize {
            width: 20,
            height: 12,
        };
        let data = (0..size.width * size.height * 3)
            .map(|i| ((i * 13) % 256) as u8)
            .collect();
        let image = Image::new(size, 3, data).expect("valid image");
        encode_image_jpeg(&image, 95).expect("encodable image")
    }

    fn multipart_request(uri: &str, part_name: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{part_name}\"; filename=\"cat.jpg\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("valid request")
    }

    async fn body_bytes(response: Response) -> Bytes {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body")
    }

    #[tokio::test]
    async fn text_routes() {
        let app = test_router(1_000_000);

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, "Hello Mobile Developers");

        let response = app
            .clone()
            .oneshot(Request::get("/hello/foo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_bytes(response).await, "Hello: foo");

        let response = app
            .clone()
            .oneshot(Request::post("/simple").body(Body::from("ping")).unwrap())
            .await
            .unwrap();
        assert_eq!(body_bytes(response).await, "Request body: ping");

        let response = app
            .oneshot(Request::post("/raw").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_bytes(response).await, "Writing to raw!");
    }

    #[tokio::test]
    async fn upload_returns_blurred_jpeg() {
        let app = test_router(1_000_000);

        let response = app
            .oneshot(multipart_request("/upload", "image", &test_jpeg()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/jpeg"
        );

        let blurred = decode_image(&body_bytes(response).await).expect("jpeg response");
        assert_eq!(
            blurred.size(),
            ImageSize {
                width: 20,
                height: 12
            }
        );
        assert_eq!(blurred.num_channels(), 3);
    }

    #[tokio::test]
    async fn upload_with_query_overrides() {
        let app = test_router(1_000_000);

        let response = app
            .clone()
            .oneshot(multipart_request(
                "/upload?kernel_size=5&edge_policy=clamp",
                "image",
                &test_jpeg(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(multipart_request(
                "/upload?kernel_size=1000",
                "image",
                &test_jpeg(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(multipart_request(
                "/upload?edge_policy=wrap",
                "image",
                &test_jpeg(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_without_image_part() {
        let app = test_router(1_000_000);

        let response = app
            .oneshot(multipart_request("/upload", "file", &test_jpeg()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).expect("json error body");
        assert_eq!(body["error"], "missing multipart part `image`");
    }

    #[tokio::test]
    async fn upload_undecodable_image() {
        let app = test_router(1_000_000);

        let response = app
            .oneshot(multipart_request("/upload", "image", b"not an image at all"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn upload_too_large() {
        let app = test_router(100);

        let response = app
            .oneshot(multipart_request("/upload", "image", &[0u8; 200]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn upload_too_many_pixels() {
        let mut config = test_config(1_000_000);
        config.max_pixels = 100;
        let app = router(AppState::new(config));

        let response = app
            .oneshot(multipart_request("/upload", "image", &test_jpeg()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn cancelled_job_keeps_its_permit() {
        let permits = Arc::new(Semaphore::new(1));
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        // the caller gives up while the job is still blocked
        let job = run_blocking(&permits, move || {
            let _ = release_rx.recv();
            Ok(())
        });
        let res = tokio::time::timeout(Duration::from_millis(50), job).await;
        assert!(res.is_err());
        assert_eq!(permits.available_permits(), 0);

        release_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while permits.available_permits() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("permit released when the job ends");
        assert_eq!(permits.available_permits(), 1);
    }
}
