//! Client address for the request log.
//!
//! Proxy headers first (`X-Forwarded-For` leftmost entry, then `X-Real-IP`),
//! falling back to the socket peer when the server was started with
//! `into_make_service_with_connect_info`.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::Request;

const FORWARDED_HEADERS: [&str; 2] = ["x-forwarded-for", "x-real-ip"];

pub fn client_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    FORWARDED_HEADERS
        .iter()
        .find_map(|name| {
            req.headers()
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        })
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_forwarded_entry() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn forwarded_for_wins_over_real_ip() {
        let req = Request::builder()
            .header("x-real-ip", "192.0.2.1")
            .header("x-forwarded-for", "203.0.113.7")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn skips_garbage_and_uses_real_ip() {
        let req = Request::builder()
            .header("x-forwarded-for", "unknown")
            .header("x-real-ip", "2001:db8::1")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn falls_back_to_peer_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("127.0.0.1:4000".parse::<SocketAddr>().unwrap()));
        assert_eq!(client_ip(&req), Some("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn none_without_any_source() {
        let req = Request::builder().body(()).unwrap();
        assert!(client_ip(&req).is_none());
    }
}
