/// Permissive CORS: any origin, every standard method. warp has no wildcard
/// for request headers, so the list below spells out the common ones.
/// This is a deployment choice for a public demo API, not an access-control boundary.
pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec![
            "User-Agent",
            "Sec-Fetch-Mode",
            "Referer",
            "Origin",
            "Access-Control-Request-Method",
            "Access-Control-Request-Headers",
            "Content-Type",
            "Authorization",
            "Accept",
            "Accept-Language",
            "Content-Language",
            "Content-Length",
            "X-Requested-With",
            "Cache-Control",
            "Pragma",
            "If-None-Match",
            "If-Modified-Since",
        ])
        .allow_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"])
}
