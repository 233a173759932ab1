use std::net::IpAddr;

use axum::http::HeaderMap;
use ipnet::IpNet;

/// Who sent a submission, as far as the request tells.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientInfo {
    pub ip: IpAddr,
    pub user_agent: String,
}

/// Extract client metadata from request headers.
pub fn extract(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> ClientInfo {
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    ClientInfo {
        ip: client_ip(headers, peer_addr, trusted_proxies),
        user_agent,
    }
}

/// Resolve the client address used for rate limiting and the in-flight guard.
pub fn client_ip(
    headers: &HeaderMap,
    peer_addr: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> IpAddr {
    let peer = peer_addr.unwrap_or(IpAddr::from([127, 0, 0, 1]));

    // Only trust X-Forwarded-For if the direct connection is from a trusted proxy
    if !trusted_proxies.is_empty() && trusted_proxies.iter().any(|net| net.contains(&peer)) {
        if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            // Take the first (leftmost) IP that isn't a trusted proxy
            for ip_str in xff.split(',').map(|s| s.trim()) {
                if let Ok(ip) = ip_str.parse::<IpAddr>() {
                    if !trusted_proxies.iter().any(|net| net.contains(&ip)) {
                        return ip;
                    }
                }
            }
        }
    }

    peer
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn xff(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn ignores_forwarded_header_without_trusted_proxies() {
        let peer: IpAddr = "10.0.0.5".parse().unwrap();
        let ip = client_ip(&xff("203.0.113.9"), Some(peer), &[]);
        assert_eq!(ip, peer);
    }

    #[test]
    fn trusts_forwarded_header_from_proxy() {
        let proxies = vec!["10.0.0.0/8".parse().unwrap()];
        let peer: IpAddr = "10.0.0.5".parse().unwrap();
        let ip = client_ip(&xff("203.0.113.9, 10.0.0.7"), Some(peer), &proxies);
        assert_eq!(ip, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn untrusted_peer_cannot_spoof() {
        let proxies = vec!["10.0.0.0/8".parse().unwrap()];
        let peer: IpAddr = "198.51.100.1".parse().unwrap();
        let ip = client_ip(&xff("203.0.113.9"), Some(peer), &proxies);
        assert_eq!(ip, peer);
    }
}
