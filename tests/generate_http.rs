use std::io::Cursor;
use std::sync::mpsc;

use image::{Rgba, RgbaImage};

use roundel::{GenerateOptions, Generator};

fn png_bytes(color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(2, 2, Rgba(color));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Serve `responses` in order, reporting each request's URL and body
/// through the channel.
fn serve(
    server: tiny_http::Server,
    responses: Vec<(u16, Vec<u8>)>,
    seen: mpsc::Sender<(String, String)>,
) {
    for (status, body) in responses {
        let mut request = server.recv().unwrap();
        let mut req_body = String::new();
        use std::io::Read as _;
        request.as_reader().read_to_string(&mut req_body).unwrap();
        seen.send((request.url().to_string(), req_body)).unwrap();

        let response = tiny_http::Response::from_data(body).with_status_code(status);
        request.respond(response).unwrap();
    }
}

#[test]
fn falls_back_to_the_next_model_on_non_success() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let base = format!("http://127.0.0.1:{port}");

    let (tx, rx) = mpsc::channel();
    let handle = std::thread::spawn(move || {
        serve(
            server,
            vec![(500, b"overloaded".to_vec()), (200, png_bytes([9, 9, 9, 255]))],
            tx,
        );
    });

    let generator = Generator::new(
        &base,
        "test-token",
        vec!["acme/primary-xl".to_string(), "acme/fallback".to_string()],
        GenerateOptions::default(),
    )
    .unwrap();

    let img = generator.generate("a teal eagle").unwrap();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(0, 0).0, [9, 9, 9, 255]);

    let (first_url, first_body) = rx.recv().unwrap();
    assert_eq!(first_url, "/acme/primary-xl");
    let payload: serde_json::Value = serde_json::from_str(&first_body).unwrap();
    assert_eq!(payload["inputs"], "a teal eagle");
    assert_eq!(payload["parameters"]["width"], 256);
    assert_eq!(payload["parameters"]["num_inference_steps"], 25);

    let (second_url, second_body) = rx.recv().unwrap();
    assert_eq!(second_url, "/acme/fallback");
    let payload: serde_json::Value = serde_json::from_str(&second_body).unwrap();
    assert_eq!(payload["parameters"]["num_inference_steps"], 20);

    handle.join().unwrap();
}

#[test]
fn exhausted_candidates_surface_a_generation_error() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let base = format!("http://127.0.0.1:{port}");

    let (tx, _rx) = mpsc::channel();
    let handle = std::thread::spawn(move || {
        serve(
            server,
            vec![(503, b"down".to_vec()), (503, b"down".to_vec())],
            tx,
        );
    });

    let generator = Generator::new(
        &base,
        "test-token",
        vec!["acme/a".to_string(), "acme/b".to_string()],
        GenerateOptions::default(),
    )
    .unwrap();

    let err = generator.generate("anything").unwrap_err();
    assert!(matches!(err, roundel::RoundelError::Generate(_)));

    handle.join().unwrap();
}

#[test]
fn success_body_that_is_not_an_image_fails_that_candidate() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let base = format!("http://127.0.0.1:{port}");

    let (tx, _rx) = mpsc::channel();
    let handle = std::thread::spawn(move || {
        serve(
            server,
            vec![
                (200, b"not an image".to_vec()),
                (200, png_bytes([1, 2, 3, 255])),
            ],
            tx,
        );
    });

    let generator = Generator::new(
        &base,
        "test-token",
        vec!["acme/a".to_string(), "acme/b".to_string()],
        GenerateOptions::default(),
    )
    .unwrap();

    let img = generator.generate("anything").unwrap();
    assert_eq!(img.get_pixel(1, 1).0, [1, 2, 3, 255]);
    handle.join().unwrap();
}
