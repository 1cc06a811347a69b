//! 点击事件里的客户端地址
//!
//! 只有连接对端是可信代理时才采信 `X-Forwarded-For` / `X-Real-IP`。
//! 未配置可信代理时，私有地址和回环地址的对端被当作反向代理。

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::warn;

/// 单个 IP 或 CIDR 网段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProxyRange {
    network: IpAddr,
    prefix: u8,
}

impl ProxyRange {
    fn parse(entry: &str) -> Option<Self> {
        let (addr, prefix) = match entry.trim().split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (entry.trim(), None),
        };
        let network: IpAddr = addr.parse().ok()?;
        let width = if network.is_ipv4() { 32 } else { 128 };
        let prefix = match prefix {
            Some(p) => p.parse::<u8>().ok().filter(|p| *p <= width)?,
            None => width,
        };
        Some(Self { network, prefix })
    }

    fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                same_prefix(u32::from(net).into(), u32::from(ip).into(), self.prefix, 32)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                same_prefix(u128::from(net), u128::from(ip), self.prefix, 128)
            }
            _ => false,
        }
    }
}

/// 比较 `width` 位整数的高 `prefix` 位
fn same_prefix(a: u128, b: u128, prefix: u8, width: u32) -> bool {
    let shift = width - u32::from(prefix);
    shift >= width || (a >> shift) == (b >> shift)
}

fn is_private_or_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        // ::1、fc00::/7（ULA）、fe80::/10（link-local）
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback() || first & 0xfe00 == 0xfc00 || first & 0xffc0 == 0xfe80
        }
    }
}

/// 转发头里的原始客户端：X-Forwarded-For 的第一项，其次 X-Real-IP
fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    header("x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .or_else(|| header("x-real-ip"))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
}

/// 启动时解析好的可信代理列表
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies {
    ranges: Vec<ProxyRange>,
}

impl TrustedProxies {
    /// 无法解析的条目记录告警后忽略
    pub fn parse(entries: &[String]) -> Self {
        let ranges = entries
            .iter()
            .filter_map(|entry| {
                let range = ProxyRange::parse(entry);
                if range.is_none() {
                    warn!("Ignoring invalid trusted proxy entry: {:?}", entry);
                }
                range
            })
            .collect();
        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// 对端的转发头是否可信
    fn trusts(&self, peer: IpAddr) -> bool {
        if self.is_empty() {
            is_private_or_loopback(peer)
        } else {
            self.ranges.iter().any(|range| range.contains(peer))
        }
    }

    pub fn client_ip(&self, peer: Option<IpAddr>, headers: &HeaderMap) -> Option<String> {
        let peer = peer?;
        if self.trusts(peer)
            && let Some(client) = forwarded_client(headers)
        {
            return Some(client);
        }
        Some(peer.to_string())
    }
}

pub fn extract_client_ip(req: &HttpRequest, proxies: &TrustedProxies) -> Option<String> {
    proxies.client_ip(req.peer_addr().map(|addr| addr.ip()), req.headers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    fn proxies(entries: &[&str]) -> TrustedProxies {
        TrustedProxies::parse(&entries.iter().map(|e| e.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_range_parsing() {
        assert!(ProxyRange::parse("10.0.0.0/8").is_some());
        assert!(ProxyRange::parse("2001:db8::/32").is_some());
        assert_eq!(ProxyRange::parse("192.168.1.5").map(|r| r.prefix), Some(32));
        assert!(ProxyRange::parse("10.0.0.0/33").is_none());
        assert!(ProxyRange::parse("not-an-ip").is_none());
    }

    #[test]
    fn test_range_membership() {
        let v4 = ProxyRange::parse("172.16.0.0/12").unwrap();
        assert!(v4.contains(ip("172.31.255.1")));
        assert!(!v4.contains(ip("172.32.0.1")));
        assert!(!v4.contains(ip("::1")));

        let everything = ProxyRange::parse("0.0.0.0/0").unwrap();
        assert!(everything.contains(ip("8.8.8.8")));

        let v6 = ProxyRange::parse("fd00::/8").unwrap();
        assert!(v6.contains(ip("fd12::1")));
        assert!(!v6.contains(ip("fe80::1")));
    }

    #[test]
    fn test_invalid_entries_are_dropped() {
        let list = proxies(&["bogus", "10.1.2.3"]);
        assert!(!list.is_empty());
        assert!(list.trusts(ip("10.1.2.3")));
        assert!(!list.trusts(ip("10.1.2.4")));
    }

    #[test]
    fn test_explicit_proxy_uses_forwarded_header() {
        let list = proxies(&["10.0.0.0/8"]);
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.2")]);
        assert_eq!(
            list.client_ip(Some(ip("10.0.0.2")), &h).as_deref(),
            Some("203.0.113.7")
        );
        // 不在列表里的对端不能伪造来源
        assert_eq!(
            list.client_ip(Some(ip("198.51.100.1")), &h).as_deref(),
            Some("198.51.100.1")
        );
    }

    #[test]
    fn test_private_peer_auto_detected_without_config() {
        let list = TrustedProxies::default();
        let h = headers(&[("x-real-ip", "203.0.113.9")]);
        assert_eq!(
            list.client_ip(Some(ip("127.0.0.1")), &h).as_deref(),
            Some("203.0.113.9")
        );
        assert_eq!(
            list.client_ip(Some(ip("8.8.8.8")), &h).as_deref(),
            Some("8.8.8.8")
        );
    }

    #[test]
    fn test_missing_header_falls_back_to_peer() {
        let list = TrustedProxies::default();
        assert_eq!(
            list.client_ip(Some(ip("192.168.0.10")), &HeaderMap::new()).as_deref(),
            Some("192.168.0.10")
        );
        assert_eq!(list.client_ip(None, &HeaderMap::new()), None);
    }

    #[test]
    fn test_private_ranges() {
        for private in ["10.0.0.1", "192.168.1.1", "127.0.0.1", "::1", "fc00::1", "fe80::1"] {
            assert!(is_private_or_loopback(ip(private)), "{}", private);
        }
        for public in ["8.8.8.8", "2001:4860:4860::8888"] {
            assert!(!is_private_or_loopback(ip(public)), "{}", public);
        }
    }
}
