use warp::http::{Method, StatusCode};
use warp::Filter;

use crate::warp_helpers::error_reply;

macro_rules! include_static {
    ($($path:expr),* $(,)?) => {
        &[
            $(($path, include_str!(concat!("../static/", $path)))),*
        ]
    };
}

const INDEX_HTML: &str = include_str!("../static/index.html");

const STATIC_FILES: &[(&str, &str)] = include_static![
    "css/main.css",
    "js/history.js",
    "js/app.js",
];

pub fn content_type_from_path(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        _ => "text/plain",
    }
}

/// Looks up an embedded asset by its request path. The empty path and
/// `index.html` both resolve to the page itself.
pub fn find_static_file(path: &str) -> Option<&'static str> {
    match path {
        "" | "index.html" => Some(INDEX_HTML),
        _ => STATIC_FILES
            .iter()
            .find(|(file_path, _)| *file_path == path)
            .map(|(_, content)| *content),
    }
}

/// Serves the embedded front end. Unknown paths reject as not found whatever
/// the method, so the API routes still get a chance to match; a known asset
/// requested with anything but GET is answered with 405 here.
pub fn build_static_routes(
) -> impl Filter<Extract = (Box<dyn warp::Reply>,), Error = warp::Rejection> + Clone {
    warp::path::full().and(warp::method()).and_then(
        |full_path: warp::path::FullPath, method: Method| async move {
            let path = full_path.as_str().trim_start_matches('/');
            let reply: Box<dyn warp::Reply> = match find_static_file(path) {
                None => return Err(warp::reject::not_found()),
                Some(_) if method != Method::GET => Box::new(error_reply(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "Method not allowed",
                )),
                Some(content) => {
                    let asset = if path.is_empty() { "index.html" } else { path };
                    Box::new(warp::reply::with_header(
                        content,
                        "content-type",
                        content_type_from_path(asset),
                    ))
                }
            };
            Ok::<_, warp::Rejection>(reply)
        },
    )
}
