use actix_web::HttpRequest;

/// Extract the client's IP address.
///
/// When the proxy is trusted, the right-most `X-Forwarded-For` hop is used: it is the
/// one the proxy appended, while earlier hops come from the client.
pub fn get_client_ip(req: &HttpRequest, trust_x_forwarded_for: bool) -> String {
    if trust_x_forwarded_for {
        let forwarded = req
            .headers()
            .get_all("x-forwarded-for")
            .filter_map(|value| value.to_str().ok())
            .last()
            .and_then(|value| value.rsplit(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
